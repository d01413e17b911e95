//! Clock application service: the foreground dispatch loop.
//!
//! [`ClockApp`] owns the clock state and every loop-side helper.  Each
//! [`run_iteration`](ClockApp::run_iteration) consumes pending signals in a
//! fixed priority order and talks to hardware only through [`Devices`].
//!
//! ```text
//!  SchedulerState (signals, clock) ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!                                      │        ClockApp          │ ──▶ AudioPort
//!  LinkPort ◀──▶ Dispatcher ◀────────▶ │ windows · overlays · IR  │ ──▶ RtcPort
//!                                      └──────────────────────────┘ ──▶ ConfigStore
//! ```

use heapless::String;
use log::{debug, info, warn};

use crate::config::ClockConfig;
use crate::drivers::audio_queue::{AudioQueue, Track, speech};
use crate::drivers::brightness::BrightnessFilter;
use crate::drivers::button::{ButtonEvent, Debouncer};
use crate::drivers::ir::{self, IrCommand, IrLearner, LearnStep};
use crate::overlay::{OverlayArbiter, OverlayKind, parse_audio_cue};
use crate::protocol::vars::{MAX_DISPLAY_MODE, RTC_TEMPERATURE_ID, TEMPERATURE_ID};
use crate::protocol::{Action, Dispatcher, Message, RemoteCall};
use crate::scheduler::SchedulerState;
use crate::scheduler::broadcast::decode_frame;
use crate::scheduler::calendar::ClockTime;
use crate::signals::{Counter, Signal};
use crate::store::{self, Persist};
use crate::window::{alarm_index, night_window_index};

use super::ports::{ConfigStore, Devices, DisplayPort, LinkPort, RenderFlags, RtcPort};
use super::state::{ClockState, MAX_BRIGHTNESS, TEXT_LEN};

/// A network-time request without reply is abandoned after this long.
const NET_TIME_REPLY_TIMEOUT_MS: u32 = 60_000;

/// Periodic network-time requests.
#[derive(Debug, Default)]
struct NetTimeSchedule {
    minutes_since_request: u16,
    /// Uptime of the outstanding request.
    awaiting_since_ms: Option<u32>,
}

// ───────────────────────────────────────────────────────────────
// ClockApp
// ───────────────────────────────────────────────────────────────

pub struct ClockApp {
    cfg: ClockConfig,
    state: ClockState,
    dispatcher: Dispatcher,
    arbiter: OverlayArbiter,
    button: Debouncer,
    light_filter: BrightnessFilter,
    learner: IrLearner,
    audio: AudioQueue,
    /// Minute whose audio actions are still to be queued.
    audio_minute: Option<ClockTime>,
    /// Level currently on the display (manual, hourly or automatic).
    applied_brightness: u8,
    /// Uptime at which the overlay on the display ends.
    overlay_until_ms: Option<u32>,
    flush_due_in_ms: Option<u32>,
    net_time: NetTimeSchedule,
    companion_was_up: bool,
    companion_was_online: bool,
    last_ip: String<TEXT_LEN>,
    /// Uptime snapshot of the current iteration.
    now_ms: u32,
}

impl ClockApp {
    pub fn new(cfg: ClockConfig) -> Self {
        let state = ClockState::default();
        Self {
            dispatcher: Dispatcher::new(cfg.ack_poll_limit),
            arbiter: OverlayArbiter::new(),
            button: Debouncer::from_config(&cfg),
            light_filter: BrightnessFilter::new(cfg.brightness_filter_shift),
            learner: IrLearner::new(),
            audio: AudioQueue::new(),
            audio_minute: None,
            applied_brightness: state.settings.brightness,
            overlay_until_ms: None,
            flush_due_in_ms: None,
            net_time: NetTimeSchedule::default(),
            companion_was_up: false,
            companion_was_online: false,
            last_ip: String::new(),
            now_ms: 0,
            state,
            cfg,
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ClockState {
        &mut self.state
    }

    pub const fn applied_brightness(&self) -> u8 {
        self.applied_brightness
    }

    pub const fn is_learning_ir(&self) -> bool {
        self.learner.is_learning()
    }

    pub fn queued_audio(&self) -> usize {
        self.audio.len()
    }

    pub const fn awaiting_net_time(&self) -> bool {
        self.net_time.awaiting_since_ms.is_some()
    }

    /// Whether an overlay is still within its display duration.
    pub fn overlay_showing(&self) -> bool {
        self.overlay_until_ms
            .is_some_and(|until| (until.wrapping_sub(self.now_ms) as i32) > 0)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the persisted state, take the time from the RTC and bring the
    /// peripherals in line with the settings.
    pub fn boot(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        match store::load(dev.store, &mut self.state) {
            Ok(report) if report.defaults_written => info!("app: config store initialised with defaults"),
            Ok(_) => {}
            Err(e) => warn!("app: config store unavailable ({e}), running on defaults"),
        }

        if dev.rtc.is_up() {
            match dev.rtc.get_time() {
                Ok(t) => {
                    sched.set_time(t);
                    info!("app: clock set from RTC: {}", fmt_time(&t));
                }
                Err(e) => warn!("app: RTC read failed: {e}"),
            }
        } else {
            debug!("app: no RTC, clock starts at {}", fmt_time(&sched.now()));
        }

        self.sync_scheduler(sched);
        self.applied_brightness = self.state.settings.brightness;
        dev.display.set_brightness(self.applied_brightness);
        dev.display.set_ambient_power(self.state.settings.ambient_power);
        if dev.audio.is_up() {
            dev.audio.set_volume(self.state.settings.volume);
        }
        if dev.light.is_up() {
            dev.light.start_conversion();
        }
        self.render_time(&sched.now(), dev.display, RenderFlags::All);
        info!("app: started");
    }

    // ── Per-iteration dispatch ────────────────────────────────

    /// Service every pending signal once, in priority order.
    pub fn run_iteration(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        self.now_ms = sched.uptime_ms();

        // 1. Button
        self.service_button(sched, dev);
        // 2. Deferred store flush
        self.service_store(sched, dev.store);
        // 3. Automatic brightness
        self.service_light(sched, dev);
        // 4. Companion up / online edges
        self.service_companion(dev.link);
        // 5. Inbound protocol, then a pending bulk send
        self.service_link(sched, dev);
        // 6. Time sources
        self.service_time_sources(sched, dev);
        // 7. Minute, animation and ambient ticks
        self.service_display(sched, dev);
        // 8. Overlays
        self.service_overlay(sched, dev);
        // 9. Temperature pipeline
        self.service_temperature(sched, dev);
        // 10. Remote control
        self.service_remote(sched, dev);
        // 11. Audio
        self.service_audio(dev);
    }

    fn service_button(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        let pressed = dev.button.is_pressed();
        match self.button.update(pressed, self.now_ms) {
            Some(ButtonEvent::ShortPress) => {
                self.state.settings.display_power = !self.state.settings.display_power;
                info!("app: button, display {}", on_off(self.state.settings.display_power));
                self.show_power(&sched.now(), dev.display);
                self.persist(dev.store, Persist::Settings);
            }
            Some(ButtonEvent::LongPress) => self.learner.start(),
            None => {}
        }
    }

    fn service_store(&mut self, sched: &SchedulerState, store: &mut dyn ConfigStore) {
        let elapsed = u32::from(sched.signals.drain(Counter::StoreTick));
        let Some(left) = self.flush_due_in_ms else { return };
        let left = left.saturating_sub(elapsed);
        if left > 0 {
            self.flush_due_in_ms = Some(left);
            return;
        }
        self.flush_due_in_ms = None;
        match store.flush() {
            Ok(()) => debug!("store: flushed"),
            Err(e) => warn!("store: flush failed: {e}"),
        }
    }

    fn service_light(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if !sched.signals.take(Signal::SensorSample) {
            return;
        }
        let overlay = self.arbiter.is_latched() || self.overlay_showing();
        if dev.display.is_animating() || overlay || !dev.light.is_up() {
            return;
        }
        if let Some(raw) = dev.light.poll_value() {
            let level = self.light_filter.update(raw);
            if self.state.settings.auto_brightness && level != self.applied_brightness {
                debug!("app: auto brightness {} -> {level}", self.applied_brightness);
                self.applied_brightness = level;
                dev.display.set_brightness(level);
            }
        }
        dev.light.start_conversion();
    }

    fn service_companion(&mut self, link: &mut dyn LinkPort) {
        let up = self.state.companion.up;
        if up && !self.companion_was_up {
            info!("app: companion up, requesting network time");
            self.request_net_time(link);
        }
        let online = self.state.companion.is_online();
        let ip_changed = online && self.state.companion.ip != self.last_ip;
        if (online && !self.companion_was_online) || ip_changed {
            info!("app: companion online at {}, scheduling full state send", self.state.companion.ip);
            self.dispatcher.request_send_all();
        }
        self.companion_was_up = up;
        self.companion_was_online = online;
        if online {
            self.last_ip.clone_from(&self.state.companion.ip);
        }
    }

    fn service_link(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if sched.signals.take(Signal::LinkTick) {
            self.dispatcher.poll_inbound(&mut self.state, dev.link, dev.store);
        }
        while let Some(action) = self.dispatcher.next_action() {
            self.perform(action, sched, dev);
        }
        if self.dispatcher.take_send_all_request() {
            if self.state.companion.up {
                let now = sched.now();
                if let Err(e) = self.dispatcher.send_all(&mut self.state, &now, dev.link, dev.store) {
                    warn!("app: full state send failed: {e}");
                }
            } else {
                debug!("app: companion down, full state send dropped");
            }
        }
        if self.dispatcher.take_store_dirty() {
            self.schedule_flush();
        }
    }

    fn service_time_sources(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if let Some(since) = self.net_time.awaiting_since_ms {
            if self.now_ms.wrapping_sub(since) >= NET_TIME_REPLY_TIMEOUT_MS {
                warn!("app: no network time reply");
                self.net_time.awaiting_since_ms = None;
            }
        }
        if let Some(t) = self.dispatcher.take_net_time() {
            self.net_time.awaiting_since_ms = None;
            info!("app: clock set from network: {}", fmt_time(&t));
            set_clock(sched, dev.rtc, t, true);
        }
        if sched.signals.take(Signal::ClockResync) && dev.rtc.is_up() {
            match dev.rtc.get_time() {
                Ok(t) => {
                    debug!("app: clock resync from RTC: {}", fmt_time(&t));
                    set_clock(sched, dev.rtc, t, false);
                }
                Err(e) => warn!("app: RTC read failed: {e}"),
            }
        }
        if sched.signals.take(Signal::BroadcastFrame) {
            match decode_frame(sched.broadcast_frame()) {
                Some(t) => {
                    info!("app: clock set from broadcast: {}", fmt_time(&t));
                    set_clock(sched, dev.rtc, t, true);
                }
                None => warn!("app: broadcast frame rejected"),
            }
        }
    }

    fn service_display(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if sched.signals.take(Signal::Minute) {
            let now = sched.now();
            self.on_minute(&now, dev);
        }
        if sched.signals.take(Signal::Animation) && self.state.settings.display_power {
            dev.display.render_animation_tick();
        }
        if sched.signals.take(Signal::AmbientStep) && self.state.settings.ambient_power {
            dev.display.ambient_step(sched.ambient_position());
        }
    }

    fn on_minute(&mut self, now: &ClockTime, dev: &mut Devices<'_>) {
        let flags = if now.minute == 0 { RenderFlags::All } else { RenderFlags::MinutesOnly };
        self.render_time(now, dev.display, flags);

        let minute = now.minute_of_day();
        let settings = &mut self.state.settings;
        if let Some(slot) = night_window_index(&self.state.windows.night, now.weekday, minute, settings.display_power) {
            settings.display_power = !settings.display_power;
            info!("app: night window {slot}, display {}", on_off(settings.display_power));
            self.show_power(now, dev.display);
            self.persist(dev.store, Persist::Settings);
        }
        let settings = &mut self.state.settings;
        if let Some(slot) =
            night_window_index(&self.state.windows.ambient_night, now.weekday, minute, settings.ambient_power)
        {
            settings.ambient_power = !settings.ambient_power;
            info!("app: ambient window {slot}, ambient {}", on_off(settings.ambient_power));
            dev.display.set_ambient_power(settings.ambient_power);
            self.persist(dev.store, Persist::Settings);
        }

        if now.minute == 0 && !self.state.settings.auto_brightness {
            let level = self.state.hourly_brightness[usize::from(now.hour)];
            if level != 0 && level != self.applied_brightness {
                info!("app: hourly brightness {level}");
                self.applied_brightness = level;
                dev.display.set_brightness(level);
            }
        }

        let interval = self.state.settings.net_time_interval;
        self.net_time.minutes_since_request = self.net_time.minutes_since_request.saturating_add(1);
        if interval > 0
            && self.net_time.minutes_since_request >= interval
            && self.net_time.awaiting_since_ms.is_none()
            && self.state.companion.is_online()
        {
            self.request_net_time(dev.link);
        }

        self.audio_minute = Some(*now);
    }

    fn service_overlay(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if let Some(index) = self.arbiter.take_latched() {
            self.render_overlay(index, &sched.now(), dev);
        }
        if !self.overlay_showing() {
            self.overlay_until_ms = None;
        }
        if !sched.signals.take(Signal::HalfMinute) {
            return;
        }
        let now = sched.now();
        if !self.state.settings.display_power {
            return;
        }
        if self.overlay_until_ms.is_some() {
            debug!("overlay: previous overlay still showing");
            return;
        }
        if self.net_time_guard(&now) {
            debug!("overlay: skipped, network time request pending");
            return;
        }
        if let Some(index) = self.arbiter.arbitrate(&mut self.state.overlays, &now) {
            info!("overlay: {index} selected ({:?})", self.state.overlays[index].kind);
        }
    }

    fn render_overlay(&mut self, index: usize, now: &ClockTime, dev: &mut Devices<'_>) {
        let Some(o) = self.state.overlays.get(index) else { return };
        if !matches!(o.kind, OverlayKind::Unused | OverlayKind::Audio) && o.duration > 0 {
            self.overlay_until_ms = Some(self.now_ms.wrapping_add(u32::from(o.duration) * 1_000));
        }
        let remote = match o.kind {
            OverlayKind::Unused => None,
            OverlayKind::Icon => Some(RemoteCall::GetIcon),
            OverlayKind::Weather => Some(RemoteCall::GetWeather),
            OverlayKind::Ticker => {
                dev.display.show_ticker(&o.text);
                None
            }
            OverlayKind::Date => {
                dev.display.show_date(now);
                None
            }
            OverlayKind::Audio => {
                match parse_audio_cue(&o.text) {
                    Some(_) if self.state.settings.silence.is_silent(now.minute_of_day()) => {
                        debug!("overlay: audio cue {index} inside silence window");
                    }
                    Some((folder, track)) => {
                        self.audio.enqueue(Track::new(folder, track));
                    }
                    None => warn!("overlay: bad audio cue {:?} in {index}", o.text),
                }
                None
            }
        };
        let Some(call) = remote else { return };
        if !self.state.companion.up {
            debug!("overlay: companion down, {call:?} skipped");
            return;
        }
        if let Err(e) = self.dispatcher.send(dev.link, &Message::call_with(call, &o.text)) {
            warn!("overlay: {call:?} request failed: {e}");
        }
    }

    /// No overlay while a network-time reply is awaited or the next
    /// request is due within the guard time.
    fn net_time_guard(&self, now: &ClockTime) -> bool {
        if self.net_time.awaiting_since_ms.is_some() {
            return true;
        }
        let interval = self.state.settings.net_time_interval;
        if interval == 0 || !self.state.companion.is_online() {
            return false;
        }
        let minutes_left = interval
            .saturating_sub(self.net_time.minutes_since_request)
            .max(1);
        let secs_left = u32::from(minutes_left) * 60 - u32::from(now.second.min(59));
        secs_left <= self.cfg.net_time_guard_secs
    }

    fn service_temperature(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        if sched.signals.take(Signal::TemperatureStart) && dev.probe.is_up() {
            dev.probe.start_conversion();
        }
        if sched.signals.take(Signal::TemperatureRead) && dev.probe.is_up() {
            if let Some(value) = dev.probe.poll_value() {
                self.state.readings.temperature = value;
                self.push_reading(TEMPERATURE_ID, value, dev.link);
            }
        }
        if sched.signals.take(Signal::RtcTemperature) && dev.rtc.is_up() {
            match dev.rtc.temperature_index() {
                Ok(index) => {
                    let value = u16::from(index);
                    self.state.readings.rtc_temperature = value;
                    self.push_reading(RTC_TEMPERATURE_ID, value, dev.link);
                }
                Err(e) => debug!("app: RTC temperature unavailable: {e}"),
            }
        }
    }

    fn push_reading(&mut self, id: u8, value: u16, link: &mut dyn LinkPort) {
        if !self.state.companion.up {
            return;
        }
        if let Err(e) = self.dispatcher.send(link, &Message::Numeric { id, value }) {
            warn!("app: reading {id} not sent: {e}");
        }
    }

    fn service_remote(&mut self, sched: &SchedulerState, dev: &mut Devices<'_>) {
        let Some(code) = dev.ir.poll() else { return };
        if self.learner.is_learning() {
            if self.learner.learn(&mut self.state.ir_codes, code) == LearnStep::Done {
                info!("ir: learning complete");
                self.persist(dev.store, Persist::IrCodes);
            }
            return;
        }
        match ir::lookup(&self.state.ir_codes, code) {
            Some(cmd) => {
                info!("ir: {cmd:?}");
                self.execute(cmd, sched, dev);
            }
            None => debug!("ir: unknown code {code:?}"),
        }
    }

    fn execute(&mut self, cmd: IrCommand, sched: &SchedulerState, dev: &mut Devices<'_>) {
        let settings = &mut self.state.settings;
        match cmd {
            IrCommand::PowerToggle => {
                settings.display_power = !settings.display_power;
                self.show_power(&sched.now(), dev.display);
                self.persist(dev.store, Persist::Settings);
            }
            IrCommand::AmbientToggle => {
                settings.ambient_power = !settings.ambient_power;
                dev.display.set_ambient_power(settings.ambient_power);
                self.persist(dev.store, Persist::Settings);
            }
            IrCommand::BrightnessUp | IrCommand::BrightnessDown => {
                settings.brightness = if cmd == IrCommand::BrightnessUp {
                    settings.brightness.saturating_add(1).min(MAX_BRIGHTNESS)
                } else {
                    settings.brightness.saturating_sub(1).max(1)
                };
                self.persist(dev.store, Persist::Settings);
                self.apply_brightness(dev.display);
            }
            IrCommand::NextMode | IrCommand::PrevMode => {
                let modes = MAX_DISPLAY_MODE as u8 + 1;
                let m = settings.display_mode % modes;
                settings.display_mode = if cmd == IrCommand::NextMode {
                    (m + 1) % modes
                } else {
                    (m + modes - 1) % modes
                };
                self.persist(dev.store, Persist::Settings);
                self.render_time(&sched.now(), dev.display, RenderFlags::NoAnimation);
            }
            IrCommand::HourUp | IrCommand::HourDown | IrCommand::MinuteUp | IrCommand::MinuteDown => {
                let t = sched.update_time(|mut t| {
                    match cmd {
                        IrCommand::HourUp => t.hour = (t.hour + 1) % 24,
                        IrCommand::HourDown => t.hour = (t.hour + 23) % 24,
                        IrCommand::MinuteUp => t.minute = (t.minute + 1) % 60,
                        _ => t.minute = (t.minute + 59) % 60,
                    }
                    t.second = 0;
                    t
                });
                info!("app: clock adjusted to {}", fmt_time(&t));
                if dev.rtc.is_up() {
                    if let Err(e) = dev.rtc.set_time(&t) {
                        warn!("app: RTC write failed: {e}");
                    }
                }
                self.render_time(&t, dev.display, RenderFlags::NoAnimation);
            }
            IrCommand::AutoBrightnessToggle => {
                settings.auto_brightness = !settings.auto_brightness;
                self.persist(dev.store, Persist::Settings);
                self.apply_brightness(dev.display);
            }
            IrCommand::StopAudio => self.audio.stop(dev.audio),
        }
    }

    fn service_audio(&mut self, dev: &mut Devices<'_>) {
        if let Some(now) = self.audio_minute.take() {
            let minute = now.minute_of_day();
            let alarm = alarm_index(&self.state.windows.alarms, now.weekday, minute);
            if alarm > 0 {
                info!("app: alarm {alarm}");
                self.audio.enqueue(Track::alarm(alarm));
            }
            let s = &self.state.settings;
            if !s.silence.is_silent(minute) {
                if now.minute == 0 && s.bell {
                    self.audio.enqueue(Track::bell(now.hour));
                }
                if s.speech_interval > 0 && now.minute % s.speech_interval == 0 {
                    for t in speech(now.hour, now.minute) {
                        self.audio.enqueue(t);
                    }
                }
            }
        }
        self.audio.service(dev.audio);
    }

    // ── Actions ───────────────────────────────────────────────

    fn perform(&mut self, action: Action, sched: &SchedulerState, dev: &mut Devices<'_>) {
        match action {
            Action::DisplayPower => self.show_power(&sched.now(), dev.display),
            Action::AmbientPower => dev.display.set_ambient_power(self.state.settings.ambient_power),
            Action::Redraw => self.render_time(&sched.now(), dev.display, RenderFlags::NoAnimation),
            Action::Brightness => self.apply_brightness(dev.display),
            Action::Volume => {
                if dev.audio.is_up() {
                    dev.audio.set_volume(self.state.settings.volume);
                }
            }
            Action::SchedulerSync => self.sync_scheduler(sched),
            Action::OverlayDates => self.arbiter.invalidate_ranges(),
            Action::RequestNetTime => self.request_net_time(dev.link),
            Action::DisplayTest => dev.display.test_pattern(),
            Action::LearnIr => self.learner.start(),
            Action::StopAudio => self.audio.stop(dev.audio),
            Action::Game { id, value } => dev.display.game_input(id, value),
            Action::SendAll => self.dispatcher.request_send_all(),
            Action::NetTime(t) => set_clock(sched, dev.rtc, t, true),
        }
    }

    fn request_net_time(&mut self, link: &mut dyn LinkPort) {
        if !self.state.companion.up {
            debug!("app: companion down, network time not requested");
            return;
        }
        let msg = Message::call_with(RemoteCall::GetNetTime, &self.state.time_server);
        match self.dispatcher.send(link, &msg) {
            Ok(()) => {
                self.net_time.minutes_since_request = 0;
                self.net_time.awaiting_since_ms = Some(self.now_ms);
            }
            Err(e) => warn!("app: network time request failed: {e}"),
        }
    }

    fn apply_brightness(&mut self, display: &mut dyn DisplayPort) {
        if self.state.settings.auto_brightness {
            return;
        }
        self.applied_brightness = self.state.settings.brightness;
        display.set_brightness(self.applied_brightness);
    }

    fn sync_scheduler(&self, sched: &SchedulerState) {
        sched.set_ambient_leds(self.state.settings.ambient_leds);
        sched.set_broadcast_enabled(self.state.settings.broadcast_enabled);
    }

    fn render_time(&self, now: &ClockTime, display: &mut dyn DisplayPort, flags: RenderFlags) {
        if self.state.settings.display_power {
            display.render(now.hour, now.minute, flags);
        }
    }

    fn show_power(&self, now: &ClockTime, display: &mut dyn DisplayPort) {
        let flags = if self.state.settings.display_power {
            RenderFlags::PowerOn
        } else {
            RenderFlags::PowerOff
        };
        display.render(now.hour, now.minute, flags);
    }

    fn persist(&mut self, store: &mut dyn ConfigStore, what: Persist) {
        if !store.is_up() {
            debug!("store: down, {what:?} not persisted");
            return;
        }
        match store::write_through(store, &self.state, what) {
            Ok(()) => self.schedule_flush(),
            Err(e) => warn!("store: write of {what:?} failed: {e}"),
        }
    }

    fn schedule_flush(&mut self) {
        self.flush_due_in_ms = Some(self.cfg.flush_delay_ms);
    }
}

fn set_clock(sched: &SchedulerState, rtc: &mut dyn RtcPort, t: ClockTime, write_rtc: bool) {
    sched.set_time(t);
    if write_rtc && rtc.is_up() {
        if let Err(e) = rtc.set_time(&t) {
            warn!("app: RTC write failed: {e}");
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn fmt_time(t: &ClockTime) -> String<24> {
    use core::fmt::Write as _;
    let mut s = String::new();
    let _ = write!(
        s,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        t.year, t.month, t.day, t.hour, t.minute, t.second
    );
    s
}
