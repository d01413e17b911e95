//! Property and fuzz-style tests for robustness of core data structures.
//!
//! Runs on host only: the calendar, window matching, signal bus and line
//! codec are exercised with generated inputs.

#![cfg(not(target_os = "none"))]

use heapless::String;
use proptest::prelude::*;

use wclock::app::state::{AnimParam, AnimTable, ColorChannel};
use wclock::overlay::MonthDay;
use wclock::protocol::codec::{LINE_CAP, LineAssembler};
use wclock::protocol::{Message, OverlayField, decode, encode};
use wclock::scheduler::calendar::{ClockTime, advance_calendar, days_in_month, weekday_of};
use wclock::signals::{Counter, Signal, SignalBus};
use wclock::window::{SilenceWindow, TimeWindow, WindowKind, weekday_in_range};

// ── Strategies ───────────────────────────────────────────────

fn clock_time() -> impl Strategy<Value = ClockTime> {
    (2000u16..2100, 1u8..=12)
        .prop_flat_map(|(y, m)| (Just(y), Just(m), 1..=days_in_month(y, m), 0u8..24, 0u8..60, 0u8..60))
        .prop_map(|(y, mo, d, h, mi, s)| ClockTime::new(y, mo, d, h, mi, s))
}

fn text<const N: usize>(max: usize) -> impl Strategy<Value = String<N>> {
    proptest::string::string_regex(&format!("[ -~]{{0,{max}}}"))
        .expect("valid regex")
        .prop_map(|s| String::try_from(s.as_str()).expect("fits"))
}

fn time_window() -> impl Strategy<Value = TimeWindow> {
    (any::<bool>(), any::<bool>(), 0u8..=6, 0u8..=6, any::<u16>()).prop_map(
        |(active, direction, from, to, minutes)| TimeWindow {
            active,
            direction,
            from,
            to,
            minutes,
        },
    )
}

fn overlay_field() -> impl Strategy<Value = OverlayField> {
    prop_oneof![
        any::<u8>().prop_map(OverlayField::Kind),
        any::<u8>().prop_map(OverlayField::Interval),
        any::<u8>().prop_map(OverlayField::Duration),
        any::<u8>().prop_map(OverlayField::DateCode),
        any::<u8>().prop_map(OverlayField::Days),
        (any::<u8>(), any::<u8>()).prop_map(|(m, d)| OverlayField::DateStart(MonthDay::new(m, d))),
        text(32).prop_map(OverlayField::Text),
        any::<bool>().prop_map(OverlayField::Active),
    ]
}

fn scalar_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        Just(Message::Ack),
        (any::<u8>(), text(40)).prop_map(|(id, args)| Message::RemoteCall { id, args }),
        (any::<u8>(), any::<u16>()).prop_map(|(id, value)| Message::Numeric { id, value }),
        (any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(id, element, value)| Message::NumericElement { id, element, value }),
        (any::<u8>(), text(40)).prop_map(|(id, value)| Message::Text { id, value }),
        (any::<u8>(), clock_time()).prop_map(|(id, time)| Message::Timestamp { id, time }),
    ]
}

fn table_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        (any::<u8>(), proptest::sample::select(ColorChannel::ALL.to_vec()), any::<u8>())
            .prop_map(|(index, channel, value)| Message::DisplayColor { index, channel, value }),
        (
            proptest::sample::select(AnimTable::ALL.to_vec()),
            any::<u8>(),
            proptest::sample::select(AnimParam::ALL.to_vec()),
            any::<u8>(),
        )
            .prop_map(|(table, index, param, value)| Message::AnimParam {
                table,
                index,
                param,
                value,
            }),
        (any::<u8>(), overlay_field()).prop_map(|(index, field)| Message::Overlay { index, field }),
        (proptest::sample::select(WindowKind::ALL.to_vec()), any::<u8>(), time_window())
            .prop_map(|(table, slot, window)| Message::WindowRow { table, slot, window }),
        (any::<u8>(), any::<u8>()).prop_map(|(id, value)| Message::Game { id, value }),
    ]
}

fn message() -> impl Strategy<Value = Message> {
    prop_oneof![scalar_message(), table_message()]
}

// ── Calendar ─────────────────────────────────────────────────

proptest! {
    /// Every second keeps the date valid and the weekday in step with it.
    #[test]
    fn advance_keeps_calendar_consistent(t in clock_time()) {
        let next = advance_calendar(t);
        prop_assert!(next.is_valid(), "{next:?}");
        prop_assert_eq!(next.weekday, weekday_of(next.year, next.month, next.day));
    }

    /// The last second of a day rolls over to midnight of the next day.
    #[test]
    fn day_rollover_lands_on_midnight(t in clock_time()) {
        let last = ClockTime::new(t.year, t.month, t.day, 23, 59, 59);
        let next = advance_calendar(last);
        prop_assert_eq!((next.hour, next.minute, next.second), (0, 0, 0));
        prop_assert_eq!(next.weekday, (last.weekday + 1) % 7);
        if t.day < days_in_month(t.year, t.month) {
            prop_assert_eq!((next.month, next.day), (t.month, t.day + 1));
        } else {
            prop_assert_eq!(next.day, 1);
        }
    }
}

// ── Windows ──────────────────────────────────────────────────

#[test]
fn weekday_range_matches_reference_for_every_combination() {
    for from in 0..7u8 {
        for to in 0..7u8 {
            for wday in 0..7u8 {
                let expected = if from <= to {
                    from <= wday && wday <= to
                } else {
                    wday >= from || wday <= to
                };
                assert_eq!(weekday_in_range(from, to, wday), expected, "{from}..{to} @ {wday}");
            }
        }
    }
}

proptest! {
    /// Sanitized rows are always in range, and sanitizing twice changes nothing.
    #[test]
    fn sanitize_is_total_and_idempotent(
        active in any::<bool>(),
        from in any::<u8>(),
        to in any::<u8>(),
        minutes in any::<u16>(),
    ) {
        let mut w = TimeWindow { active, direction: false, from, to, minutes };
        w.sanitize();
        prop_assert!(w.from <= 6 && w.to <= 6 && w.minutes < 1440);
        prop_assert!(!w.sanitize());
    }

    /// An empty silence window never silences anything.
    #[test]
    fn empty_silence_window_is_never_silent(at in 0u16..1440, minute in 0u16..1440) {
        let s = SilenceWindow { from: at, to: at };
        prop_assert!(!s.is_silent(minute));
    }
}

// ── Signals ──────────────────────────────────────────────────

proptest! {
    /// Raising a signal any number of times is consumed by one take.
    #[test]
    fn raise_is_idempotent(n in 1usize..20) {
        let bus = SignalBus::new();
        for _ in 0..n {
            bus.raise(Signal::Minute);
        }
        prop_assert_eq!(bus.pending_count(), 1);
        prop_assert!(bus.take(Signal::Minute));
        prop_assert!(!bus.take(Signal::Minute));
    }

    /// Tick counters saturate instead of wrapping.
    #[test]
    fn counter_saturates(n in 0u32..700) {
        let bus = SignalBus::new();
        for _ in 0..n {
            bus.bump(Counter::StoreTick);
        }
        prop_assert_eq!(u32::from(bus.drain(Counter::StoreTick)), n.min(255));
        prop_assert_eq!(bus.drain(Counter::StoreTick), 0);
    }
}

// ── Line codec ───────────────────────────────────────────────

proptest! {
    /// Every message survives an encode/decode cycle.
    #[test]
    fn message_round_trips(msg in message()) {
        let line = encode(&msg).expect("encodable");
        prop_assert!(line.len() <= LINE_CAP);
        prop_assert_eq!(decode(&line), Ok(msg));
    }

    /// Arbitrary text never panics the decoder.
    #[test]
    fn decode_never_panics(line in "\\PC{0,160}") {
        let _ = decode(&line);
    }

    /// Arbitrary bytes never yield a line longer than the cap.
    #[test]
    fn assembler_bounds_lines(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut asm = LineAssembler::new();
        for b in bytes {
            if let Some(Ok(line)) = asm.push(b) {
                prop_assert!(!line.is_empty() && line.len() <= LINE_CAP);
                prop_assert!(!line.contains('\n'));
            }
        }
    }
}
