//! Dispatcher tests: inbound lines against a real state and store image.

use wclock::adapters::cached_store::CachedStore;
use wclock::adapters::mem_store::MemStore;
use wclock::app::ClockState;
use wclock::app::ports::ConfigStore;
use wclock::protocol::{Dispatcher, Message, encode};
use wclock::store;
use wclock::window::{TimeWindow, WindowKind};

use crate::mock_hw::MockLink;

fn booted_store() -> MemStore {
    let mut mem = MemStore::new();
    let mut state = ClockState::default();
    store::load(&mut mem, &mut state).unwrap();
    mem
}

fn reload(mem: &mut MemStore) -> ClockState {
    let mut state = ClockState::default();
    let report = store::load(mem, &mut state).unwrap();
    assert!(!report.defaults_written);
    state
}

struct Link {
    dispatcher: Dispatcher,
    state: ClockState,
    link: MockLink,
    mem: MemStore,
}

impl Link {
    fn new() -> Self {
        Self {
            dispatcher: Dispatcher::new(4),
            state: ClockState::default(),
            link: MockLink::default(),
            mem: booted_store(),
        }
    }

    fn feed(&mut self, lines: &[&str]) -> usize {
        for line in lines {
            self.link.feed(line);
        }
        self.poll()
    }

    fn poll(&mut self) -> usize {
        self.dispatcher.poll_inbound(&mut self.state, &mut self.link, &mut self.mem)
    }
}

#[test]
fn unknown_tag_does_not_mark_link_up() {
    let mut l = Link::new();
    assert_eq!(l.feed(&["X0100"]), 1);
    assert!(!l.state.companion.up);
}

#[test]
fn line_split_across_polls_is_reassembled() {
    let mut l = Link::new();
    l.link.inbound.extend(b"N0300".iter());
    assert_eq!(l.poll(), 0);
    l.link.inbound.extend(b"0A\r\n".iter());
    assert_eq!(l.poll(), 1);
    assert_eq!(l.state.settings.brightness, 10);
}

#[test]
fn overlong_line_is_dropped_and_next_line_survives() {
    let mut l = Link::new();
    let long = format!("S02{}", "x".repeat(200));
    l.feed(&[&long, "N050003"]);
    assert!(l.state.time_server.is_empty());
    assert_eq!(l.state.settings.volume, 3);
}

#[test]
fn settings_survive_a_reload() {
    let mut l = Link::new();
    l.feed(&["N050007", "N060001", "S02pool.ntp.org"]);
    assert!(l.dispatcher.take_store_dirty());

    let state = reload(&mut l.mem);
    assert_eq!(state.settings.volume, 7);
    assert!(state.settings.bell);
    assert_eq!(state.time_server.as_str(), "pool.ntp.org");
}

#[test]
fn companion_strings_are_not_persisted() {
    let mut l = Link::new();
    l.feed(&["S0110.0.0.2"]);
    assert!(!l.dispatcher.take_store_dirty());
    assert_eq!(l.state.companion.ip.as_str(), "10.0.0.2");
    assert!(reload(&mut l.mem).companion.ip.is_empty());
}

#[test]
fn window_row_is_sanitized_and_persisted() {
    let mut l = Link::new();
    let row = TimeWindow {
        active: true,
        direction: true,
        from: 9,
        to: 2,
        minutes: 7 * 60,
    };
    let line = encode(&Message::WindowRow {
        table: WindowKind::Alarm,
        slot: 5,
        window: row,
    })
    .unwrap();
    l.feed(&[&line]);

    let expected = TimeWindow { from: 0, ..row };
    assert_eq!(l.state.windows.alarms[5], expected);
    assert_eq!(reload(&mut l.mem).windows.alarms[5], expected);
}

#[test]
fn overlay_fields_wait_for_save_all() {
    let mut l = Link::new();
    l.feed(&["OT0302", "OX03breaking news", "OI0305"]);
    assert!(!l.dispatcher.take_store_dirty());

    l.feed(&["OA0301"]);
    assert!(l.dispatcher.take_store_dirty());
    // Only the flag reached the store; the slot is still unused there.
    assert!(!reload(&mut l.mem).overlays[3].active);

    l.feed(&["R06"]);
    let state = reload(&mut l.mem);
    assert!(state.overlays[3].active);
    assert_eq!(state.overlays[3].interval, 5);
    assert_eq!(state.overlays[3].text.as_str(), "breaking news");
}

#[test]
fn save_all_call_writes_the_whole_state() {
    let mut l = Link::new();
    l.state.colors[2].red = 0x40;
    l.state.hourly_brightness[9] = 4;

    l.feed(&["R06"]);

    let state = reload(&mut l.mem);
    assert_eq!(state.colors[2].red, 0x40);
    assert_eq!(state.hourly_brightness[9], 4);
}

#[test]
fn unknown_overlay_kind_is_stored_as_unused() {
    let mut l = Link::new();
    l.feed(&["OT0302", "OT03FF", "OA0301", "R06"]);
    let state = reload(&mut l.mem);
    assert_eq!(state.overlays[3].kind, wclock::overlay::OverlayKind::Unused);
    // An unused slot never loads as active.
    assert!(!state.overlays[3].active);
}

#[test]
fn overlong_time_server_is_truncated_and_persisted() {
    let mut l = Link::new();
    let long = format!("S02{}", "t".repeat(40));
    l.feed(&[&long]);
    assert!(l.dispatcher.take_store_dirty());
    assert_eq!(reload(&mut l.mem).time_server.as_str(), "t".repeat(32));
}

#[test]
fn cached_store_writes_back_on_flush() {
    let mut cached = CachedStore::new(MemStore::new()).unwrap();
    let mut state = ClockState::default();
    store::load(&mut cached, &mut state).unwrap();
    let mut dispatcher = Dispatcher::new(4);
    let mut link = MockLink::default();

    link.feed("N050009");
    dispatcher.poll_inbound(&mut state, &mut link, &mut cached);
    assert!(cached.is_dirty());
    cached.flush().unwrap();

    let mut mem = cached.into_inner();
    assert_eq!(reload(&mut mem).settings.volume, 9);
}

#[test]
fn store_down_still_applies_changes() {
    let mut l = Link::new();
    l.mem.set_up(false);
    l.feed(&["N030004"]);
    assert_eq!(l.state.settings.brightness, 4);
    assert!(!l.dispatcher.take_store_dirty());
}

#[test]
fn inbound_lines_are_handled_while_awaiting_ack() {
    let mut l = Link::new();
    l.link.feed("N030005");
    l.link.feed("OK");

    l.dispatcher
        .send_acked(&Message::Numeric { id: 5, value: 1 }, &mut l.state, &mut l.link, &mut l.mem)
        .unwrap();

    assert_eq!(l.link.sent, vec!["N050001".to_owned()]);
    assert_eq!(l.state.settings.brightness, 5);
}

#[test]
fn send_all_reports_line_count() {
    let mut l = Link::new();
    l.link.auto_ack = true;
    let now = wclock::scheduler::calendar::ClockTime::new(2025, 3, 9, 14, 0, 0);

    let n = l.dispatcher.send_all(&mut l.state, &now, &mut l.link, &mut l.mem).unwrap();

    assert_eq!(n, l.link.sent.len());
    assert!(l.link.sent.contains(&"T0020250309140000".to_owned()));
    assert!(!l.dispatcher.is_sending());
}
