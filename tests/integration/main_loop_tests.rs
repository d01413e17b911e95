//! End-to-end tests of `ClockApp::run_iteration` against recording mocks.
//!
//! Signals are raised by hand where a test only cares about one of them;
//! tests that depend on elapsed time drive a real `TickSource` at 1 kHz so
//! every tick is one millisecond of uptime.

use heapless::String;

use wclock::app::ClockApp;
use wclock::app::ports::RenderFlags;
use wclock::config::ClockConfig;
use wclock::overlay::{Overlay, OverlayKind};
use wclock::protocol::dispatcher::bulk_message;
use wclock::scheduler::calendar::ClockTime;
use wclock::scheduler::{SchedulerState, TickSource};
use wclock::signals::Signal;
use wclock::window::TimeWindow;

use crate::mock_hw::{DisplayCall, MockHw, MockLink, QuietInputs, ir_code};

// ── Harness ──────────────────────────────────────────────────

fn test_config() -> ClockConfig {
    ClockConfig {
        tick_hz: 1_000,
        ack_poll_limit: 8,
        ..ClockConfig::default()
    }
}

struct Rig {
    sched: SchedulerState,
    ticks: TickSource,
    hw: MockHw,
    app: ClockApp,
}

impl Rig {
    fn new() -> Self {
        Self::with(test_config(), MockHw::default())
    }

    fn with(cfg: ClockConfig, mut hw: MockHw) -> Self {
        let sched = SchedulerState::new(ClockTime::default());
        let ticks = TickSource::new(cfg.tick_hz);
        let mut app = ClockApp::new(cfg);
        app.boot(&sched, &mut hw.devices());
        Self { sched, ticks, hw, app }
    }

    fn step(&mut self) {
        self.app.run_iteration(&self.sched, &mut self.hw.devices());
    }

    /// Set the clock to `t` and deliver the minute signal.
    fn minute(&mut self, t: ClockTime) {
        self.sched.set_time(t);
        self.sched.signals.raise(Signal::Minute);
        self.step();
    }

    /// Queue inbound lines and let the loop read them.
    fn receive(&mut self, lines: &[&str]) {
        for line in lines {
            self.hw.link.feed(line);
        }
        self.sched.signals.raise(Signal::LinkTick);
        self.step();
    }

    /// Run the tick source for `ms` milliseconds, servicing the loop every
    /// 100 ms so no millisecond counter saturates.
    fn advance_ms(&mut self, ms: u32) {
        for i in 1..=ms {
            self.ticks.on_tick(&self.sched, &mut QuietInputs);
            if i % 100 == 0 {
                self.step();
            }
        }
        self.step();
    }
}

fn window(direction: bool, from: u8, to: u8, hour: u16, minute: u16) -> TimeWindow {
    TimeWindow {
        active: true,
        direction,
        from,
        to,
        minutes: hour * 60 + minute,
    }
}

fn overlay(kind: OverlayKind, text: &str) -> Overlay {
    Overlay {
        kind,
        interval: 1,
        active: true,
        text: String::try_from(text).unwrap(),
        ..Overlay::default()
    }
}

fn bulk_len() -> usize {
    let state = wclock::app::ClockState::default();
    let now = ClockTime::default();
    (0..).take_while(|&n| bulk_message(&state, &now, n).is_some()).count()
}

// 2025-01-01 is a Wednesday.
fn jan(day: u8, hour: u8, minute: u8) -> ClockTime {
    ClockTime::new(2025, 1, day, hour, minute, 0)
}

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn boot_takes_rtc_time_and_renders_full_frame() {
    let rig = Rig::new();

    assert_eq!(rig.sched.now(), jan(1, 12, 0));
    assert_eq!(rig.hw.display.renders(), vec![(12, 0, RenderFlags::All)]);
    assert_eq!(rig.hw.display.last_brightness(), Some(8));
    assert_eq!(rig.hw.audio.volume, Some(15));
    assert_eq!(rig.hw.light.starts, 1);
}

#[test]
fn boot_restores_persisted_settings() {
    let mut first = Rig::new();
    first.receive(&["N03000B"]);
    assert_eq!(first.app.state().settings.brightness, 11);

    let mut hw = MockHw::default();
    hw.store = std::mem::take(&mut first.hw.store);
    let second = Rig::with(test_config(), hw);
    assert_eq!(second.app.state().settings.brightness, 11);
    assert_eq!(second.hw.display.last_brightness(), Some(11));
}

#[test]
fn boot_without_rtc_keeps_scheduler_time() {
    let mut hw = MockHw::default();
    hw.rtc.up = false;
    let rig = Rig::with(test_config(), hw);
    assert_eq!(rig.sched.now(), ClockTime::default());
}

// ── Minute handling ──────────────────────────────────────────

#[test]
fn full_redraw_only_on_the_hour() {
    let mut rig = Rig::new();
    rig.hw.display.calls.clear();

    rig.minute(jan(1, 9, 5));
    rig.minute(jan(1, 10, 0));

    assert_eq!(
        rig.hw.display.renders(),
        vec![(9, 5, RenderFlags::MinutesOnly), (10, 0, RenderFlags::All)]
    );
}

#[test]
fn night_windows_switch_display_off_and_on() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.night[0] = window(false, 0, 6, 22, 0);
    rig.app.state_mut().windows.night[1] = window(true, 0, 6, 6, 0);
    rig.hw.display.calls.clear();

    rig.minute(jan(1, 22, 0));
    assert!(!rig.app.state().settings.display_power);
    assert_eq!(
        rig.hw.display.renders(),
        vec![(22, 0, RenderFlags::All), (22, 0, RenderFlags::PowerOff)]
    );

    rig.hw.display.calls.clear();
    rig.minute(jan(1, 22, 1));
    assert!(rig.hw.display.renders().is_empty(), "no redraw while off");

    rig.minute(jan(2, 6, 0));
    assert!(rig.app.state().settings.display_power);
    assert_eq!(rig.hw.display.renders(), vec![(6, 0, RenderFlags::PowerOn)]);
}

#[test]
fn night_window_power_change_survives_a_reboot() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.night[0] = window(false, 0, 6, 22, 0);
    rig.minute(jan(1, 22, 0));
    assert!(!rig.app.state().settings.display_power);

    let mut hw = MockHw::default();
    hw.store = std::mem::take(&mut rig.hw.store);
    let next = Rig::with(test_config(), hw);
    assert!(!next.app.state().settings.display_power);
}

#[test]
fn off_window_does_nothing_when_already_off() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.night[0] = window(false, 0, 6, 22, 0);
    rig.app.state_mut().settings.display_power = false;
    rig.hw.display.calls.clear();

    rig.minute(jan(1, 22, 0));

    assert!(!rig.app.state().settings.display_power);
    assert!(rig.hw.display.renders().is_empty());
}

#[test]
fn night_window_respects_weekday_range() {
    let mut rig = Rig::new();
    // Monday to Friday only.
    rig.app.state_mut().windows.night[0] = window(false, 1, 5, 23, 0);

    rig.minute(jan(4, 23, 0)); // Saturday
    assert!(rig.app.state().settings.display_power);

    rig.minute(jan(6, 23, 0)); // Monday
    assert!(!rig.app.state().settings.display_power);
}

#[test]
fn ambient_window_switches_ambient_light() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.ambient_night[0] = window(true, 0, 6, 18, 0);
    rig.hw.display.calls.clear();

    rig.minute(jan(1, 18, 0));

    assert!(rig.app.state().settings.ambient_power);
    assert!(rig.hw.display.calls.contains(&DisplayCall::AmbientPower(true)));
}

#[test]
fn hourly_brightness_applies_on_the_hour() {
    let mut rig = Rig::new();
    rig.app.state_mut().hourly_brightness[7] = 3;

    rig.minute(jan(1, 6, 59));
    assert_eq!(rig.app.applied_brightness(), 8);

    rig.minute(jan(1, 7, 0));
    assert_eq!(rig.app.applied_brightness(), 3);
    assert_eq!(rig.hw.display.last_brightness(), Some(3));
}

#[test]
fn hourly_brightness_ignored_with_auto_brightness() {
    let mut rig = Rig::new();
    rig.app.state_mut().hourly_brightness[7] = 3;
    rig.app.state_mut().settings.auto_brightness = true;

    rig.minute(jan(1, 7, 0));

    assert_eq!(rig.app.applied_brightness(), 8);
}

// ── Audio ────────────────────────────────────────────────────

#[test]
fn alarm_plays_its_slot_track_on_matching_days() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.alarms[2] = window(false, 1, 5, 6, 30);

    rig.minute(jan(4, 6, 30)); // Saturday
    assert!(rig.hw.audio.played.is_empty());

    rig.minute(jan(1, 6, 30)); // Wednesday
    assert_eq!(rig.hw.audio.played, vec![(1, 3)]);
}

#[test]
fn alarm_fires_when_clock_is_set_to_its_full_minute() {
    let mut rig = Rig::new();
    rig.app.state_mut().windows.alarms[0] = window(false, 0, 6, 12, 5);
    rig.sched.set_time(ClockTime::new(2025, 1, 1, 12, 4, 58));
    rig.advance_ms(1_500);

    rig.receive(&["T0020250101120500"]);
    rig.advance_ms(3_000);

    assert_eq!(rig.sched.now().minute, 5);
    assert_eq!(rig.hw.audio.played, vec![(1, 1)]);
}

#[test]
fn bell_is_silent_inside_silence_window() {
    let mut rig = Rig::new();
    let s = &mut rig.app.state_mut().settings;
    s.bell = true;
    s.silence.from = 22 * 60;
    s.silence.to = 6 * 60;

    rig.minute(jan(1, 23, 0));
    assert!(rig.hw.audio.played.is_empty());

    rig.minute(jan(2, 19, 0));
    assert_eq!(rig.hw.audio.played, vec![(2, 7)]);
}

#[test]
fn speech_queues_hour_then_minute() {
    let mut rig = Rig::new();
    rig.app.state_mut().settings.speech_interval = 15;

    rig.minute(jan(1, 8, 15));
    assert_eq!(rig.hw.audio.played, vec![(3, 9)]);
    assert_eq!(rig.app.queued_audio(), 1);

    rig.hw.audio.finished = true;
    rig.step();
    assert_eq!(rig.hw.audio.played, vec![(3, 9), (4, 16)]);
    assert_eq!(rig.app.queued_audio(), 0);
}

#[test]
fn stop_audio_call_clears_the_queue() {
    let mut rig = Rig::new();
    rig.app.state_mut().settings.speech_interval = 15;
    rig.minute(jan(1, 8, 15));
    assert_eq!(rig.app.queued_audio(), 1);

    rig.receive(&["R09"]);

    assert_eq!(rig.app.queued_audio(), 0);
    assert_eq!(rig.hw.audio.stops, 1);
}

// ── Companion protocol ───────────────────────────────────────

#[test]
fn inbound_brightness_is_applied_persisted_and_flushed_later() {
    let mut rig = Rig::new();

    rig.receive(&["N03000C"]);
    assert_eq!(rig.app.state().settings.brightness, 12);
    assert_eq!(rig.hw.display.last_brightness(), Some(12));
    assert_eq!(rig.hw.store.flushes, 0);

    rig.advance_ms(1_000);
    assert_eq!(rig.hw.store.flushes, 0, "flush waits for the delay");

    rig.advance_ms(1_100);
    assert_eq!(rig.hw.store.flushes, 1);
}

#[test]
fn out_of_range_value_is_clamped() {
    let mut rig = Rig::new();
    rig.receive(&["N030063"]);
    assert_eq!(rig.app.state().settings.brightness, 15);
}

#[test]
fn any_valid_line_marks_companion_up() {
    let mut rig = Rig::new();
    rig.receive(&["garbage"]);
    assert!(!rig.app.state().companion.up);

    rig.receive(&["S00v2.1"]);
    assert!(rig.app.state().companion.up);
    assert_eq!(rig.app.state().companion.version.as_str(), "v2.1");
}

#[test]
fn companion_coming_online_requests_time_and_full_state() {
    let mut hw = MockHw::default();
    hw.link = MockLink::acking();
    let mut rig = Rig::with(test_config(), hw);
    rig.app.state_mut().time_server = String::try_from("pool.ntp.org").unwrap();

    rig.receive(&["S00v2.1", "S0110.0.0.2"]);
    assert!(rig.app.state().companion.is_online());
    assert!(rig.hw.link.sent.is_empty());

    rig.step();

    let sent = &rig.hw.link.sent;
    assert_eq!(sent[0], "R04pool.ntp.org");
    assert_eq!(sent[1], "N000001");
    assert_eq!(sent.len(), 1 + bulk_len());
    assert!(rig.app.awaiting_net_time());
    assert!(rig.app.state().companion.up);
}

#[test]
fn address_change_triggers_another_full_send() {
    let mut hw = MockHw::default();
    hw.link = MockLink::acking();
    let mut rig = Rig::with(test_config(), hw);
    rig.receive(&["S0110.0.0.2"]);
    rig.step();
    let first = rig.hw.link.sent.len();

    rig.receive(&["S0110.0.0.9"]);
    rig.step();

    assert_eq!(rig.hw.link.sent.len(), first + bulk_len());
}

#[test]
fn missing_acknowledgement_marks_companion_down() {
    let mut rig = Rig::new();

    rig.receive(&["R05"]);

    assert_eq!(rig.hw.link.sent, vec!["N000001".to_owned()]);
    assert!(!rig.app.state().companion.up);
}

#[test]
fn network_time_reply_sets_clock_and_rtc() {
    let mut rig = Rig::new();
    let t = ClockTime::new(2025, 7, 4, 9, 30, 0);

    rig.receive(&["T0020250704093000"]);

    assert_eq!(rig.sched.now(), t);
    assert_eq!(rig.hw.rtc.writes.last(), Some(&t));
    assert!(!rig.app.awaiting_net_time());
}

#[test]
fn temperature_reading_is_pushed_to_companion() {
    let mut rig = Rig::new();
    rig.receive(&["S00v2.1"]);

    rig.sched.signals.raise(Signal::TemperatureStart);
    rig.step();
    rig.sched.signals.raise(Signal::TemperatureRead);
    rig.step();

    assert_eq!(rig.app.state().readings.temperature, 215);
    assert_eq!(rig.hw.link.sent_with_prefix("N0D"), vec!["N0D00D7"]);
}

#[test]
fn rtc_temperature_is_stored_without_companion() {
    let mut rig = Rig::new();

    rig.sched.signals.raise(Signal::RtcTemperature);
    rig.step();

    assert_eq!(rig.app.state().readings.rtc_temperature, 21);
    assert!(rig.hw.link.sent.is_empty());
}

#[test]
fn game_input_reaches_display() {
    let mut rig = Rig::new();
    rig.receive(&["G0207"]);
    assert!(rig.hw.display.calls.contains(&DisplayCall::Game { id: 2, value: 7 }));
}

// ── Overlays ─────────────────────────────────────────────────

#[test]
fn ticker_overlay_is_latched_then_rendered() {
    let mut rig = Rig::new();
    rig.app.state_mut().overlays[0] = overlay(OverlayKind::Ticker, "hello");
    rig.sched.set_time(ClockTime::new(2025, 1, 1, 12, 5, 30));

    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    assert!(!rig.hw.display.calls.contains(&DisplayCall::Ticker("hello".into())));

    rig.step();
    assert!(rig.hw.display.calls.contains(&DisplayCall::Ticker("hello".into())));
}

#[test]
fn auto_brightness_holds_for_overlay_duration() {
    let mut rig = Rig::new();
    rig.app.state_mut().settings.auto_brightness = true;
    rig.app.state_mut().overlays[0] = Overlay {
        duration: 20,
        ..overlay(OverlayKind::Ticker, "hello")
    };
    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();
    assert!(rig.app.overlay_showing());

    rig.hw.light.value = 4_095;
    rig.hw.display.calls.clear();
    for _ in 0..3 {
        rig.sched.signals.raise(Signal::SensorSample);
        rig.step();
    }
    assert_eq!(rig.hw.display.last_brightness(), None);

    rig.advance_ms(20_100);
    assert!(!rig.app.overlay_showing());
    assert_eq!(rig.hw.display.last_brightness(), Some(15));
}

#[test]
fn next_overlay_waits_until_current_one_ends() {
    let mut rig = Rig::new();
    rig.app.state_mut().overlays[0] = Overlay {
        duration: 40,
        ..overlay(OverlayKind::Ticker, "first")
    };
    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();
    rig.hw.display.calls.clear();

    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();

    assert!(!rig.hw.display.calls.iter().any(|c| matches!(c, DisplayCall::Ticker(_))));
}

#[test]
fn no_overlay_while_display_is_off() {
    let mut rig = Rig::new();
    rig.app.state_mut().overlays[0] = overlay(OverlayKind::Date, "");
    rig.app.state_mut().settings.display_power = false;

    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();

    assert!(!rig.hw.display.calls.iter().any(|c| matches!(c, DisplayCall::Date(_))));
}

#[test]
fn overlay_waits_for_network_time_reply() {
    let mut hw = MockHw::default();
    hw.link = MockLink::acking();
    let mut rig = Rig::with(test_config(), hw);
    rig.receive(&["S0110.0.0.2"]);
    rig.step();
    assert!(rig.app.awaiting_net_time());

    rig.app.state_mut().overlays[0] = overlay(OverlayKind::Ticker, "news");
    rig.sched.set_time(ClockTime::new(2025, 1, 1, 12, 5, 30));
    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();
    assert!(!rig.hw.display.calls.contains(&DisplayCall::Ticker("news".into())));

    rig.receive(&["T0020250101120630"]);
    assert!(!rig.app.awaiting_net_time());
    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();
    assert!(rig.hw.display.calls.contains(&DisplayCall::Ticker("news".into())));
}

#[test]
fn icon_overlay_asks_companion() {
    let mut rig = Rig::new();
    rig.receive(&["S00v2.1"]);
    // Link-up time request, then its reply.
    rig.step();
    rig.receive(&["T0020250101120530"]);
    rig.app.state_mut().overlays[4] = overlay(OverlayKind::Icon, "sun");

    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();

    assert_eq!(rig.hw.link.sent_with_prefix("R0A"), vec!["R0Asun"]);
}

#[test]
fn audio_overlay_enqueues_its_cue() {
    let mut rig = Rig::new();
    rig.app.state_mut().overlays[0] = overlay(OverlayKind::Audio, "5/12");

    rig.sched.signals.raise(Signal::HalfMinute);
    rig.step();
    rig.step();

    assert_eq!(rig.hw.audio.played, vec![(5, 12)]);
}

// ── Remote control and button ────────────────────────────────

#[test]
fn learned_remote_codes_drive_commands() {
    let mut rig = Rig::new();

    rig.receive(&["R08"]);
    assert!(rig.app.is_learning_ir());

    for n in 0..12 {
        rig.hw.ir.codes.push_back(ir_code(0x10 + n));
        rig.step();
    }
    assert!(!rig.app.is_learning_ir());
    assert_eq!(rig.app.state().ir_codes[2], Some(ir_code(0x12)));

    // BrightnessUp
    rig.hw.ir.codes.push_back(ir_code(0x12));
    rig.step();
    assert_eq!(rig.app.state().settings.brightness, 9);
    assert_eq!(rig.hw.display.last_brightness(), Some(9));
}

#[test]
fn remote_minute_adjust_writes_rtc() {
    let mut rig = Rig::new();
    rig.app.state_mut().ir_codes[8] = Some(ir_code(0x42));
    rig.hw.display.calls.clear();

    rig.hw.ir.codes.push_back(ir_code(0x42));
    rig.step();

    let t = rig.sched.now();
    assert_eq!((t.hour, t.minute, t.second), (12, 1, 0));
    assert_eq!(rig.hw.rtc.writes.last(), Some(&t));
    assert_eq!(rig.hw.display.renders(), vec![(12, 1, RenderFlags::NoAnimation)]);
}

#[test]
fn unknown_remote_code_is_ignored() {
    let mut rig = Rig::new();
    let before = rig.app.state().settings;

    rig.hw.ir.codes.push_back(ir_code(0x99));
    rig.step();

    assert_eq!(rig.app.state().settings, before);
}

#[test]
fn short_press_toggles_display() {
    let mut rig = Rig::new();
    rig.hw.display.calls.clear();

    rig.hw.button.pressed = true;
    rig.step();
    rig.advance_ms(60);
    rig.hw.button.pressed = false;
    rig.step();

    assert!(!rig.app.state().settings.display_power);
    assert_eq!(rig.hw.display.renders().last(), Some(&(12, 0, RenderFlags::PowerOff)));
}

#[test]
fn bounce_shorter_than_debounce_is_ignored() {
    let mut rig = Rig::new();

    rig.hw.button.pressed = true;
    rig.step();
    rig.advance_ms(10);
    rig.hw.button.pressed = false;
    rig.step();

    assert!(rig.app.state().settings.display_power);
}

#[test]
fn long_press_starts_ir_learning() {
    let cfg = ClockConfig {
        long_press_ms: 500,
        ..test_config()
    };
    let mut rig = Rig::with(cfg, MockHw::default());

    rig.hw.button.pressed = true;
    rig.step();
    rig.advance_ms(600);
    assert!(rig.app.is_learning_ir());

    rig.hw.button.pressed = false;
    rig.step();
    assert!(rig.app.state().settings.display_power, "release after long press is swallowed");
}

// ── Tick-driven signals ──────────────────────────────────────

#[test]
fn tick_source_drives_minute_render() {
    let mut rig = Rig::new();
    rig.sched.set_time(ClockTime::new(2025, 1, 1, 12, 0, 58));
    rig.hw.display.calls.clear();

    rig.advance_ms(2_000);

    assert_eq!(rig.sched.now().minute, 1);
    assert!(rig.hw.display.renders().contains(&(12, 1, RenderFlags::MinutesOnly)));
}
