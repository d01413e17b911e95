//! Temporal window matching for night mode and alarms.
//!
//! A window is a `(weekday range, minute-of-day)` rule.  Night windows also
//! carry a direction ("switch on" / "switch off") and only fire when they
//! would actually change the current power state.

use serde::{Deserialize, Serialize};

use crate::scheduler::calendar::{MINUTES_PER_DAY, SATURDAY};

/// Slots per window table.
pub const WINDOW_SLOTS: usize = 8;

/// Which of the three window tables a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Display night mode.
    Night,
    /// Ambient light night mode.
    AmbientNight,
    /// Alarms; slot index + 1 is the audio track.
    Alarm,
}

impl WindowKind {
    pub const ALL: [Self; 3] = [Self::Night, Self::AmbientNight, Self::Alarm];
}

/// One configured window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub active: bool,
    /// `true` switches power on, `false` switches it off. Unused for alarms.
    pub direction: bool,
    /// First weekday, 0 = Sunday.
    pub from: u8,
    /// Last weekday, inclusive.
    pub to: u8,
    /// Minute of day, 0..=1439.
    pub minutes: u16,
}

impl TimeWindow {
    /// Whether the window matches `wday` at `minute` (ignores direction).
    pub fn matches(&self, wday: u8, minute: u16) -> bool {
        self.active && self.minutes == minute && weekday_in_range(self.from, self.to, wday)
    }

    /// Correct out-of-range fields in place. Returns `true` if anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;
        if self.minutes >= MINUTES_PER_DAY {
            self.active = false;
            self.minutes = 0;
            changed = true;
        }
        if self.from > SATURDAY {
            self.from = 0;
            changed = true;
        }
        if self.to > SATURDAY {
            self.to = SATURDAY;
            changed = true;
        }
        changed
    }
}

/// A fixed table of window slots.
pub type WindowTable = [TimeWindow; WINDOW_SLOTS];

/// Weekday range test with wraparound over the week boundary.
///
/// * `from == to`: exactly that day.
/// * `from < to`: `from..=to`.
/// * `from > to`: every day except the gap strictly between `to` and `from`.
pub fn weekday_in_range(from: u8, to: u8, wday: u8) -> bool {
    match from.cmp(&to) {
        core::cmp::Ordering::Equal => wday == from,
        core::cmp::Ordering::Less => from <= wday && wday <= to,
        core::cmp::Ordering::Greater => !(to < wday && wday < from),
    }
}

/// Index of the first night window that fires, if any.
///
/// A window fires when it matches and `direction XOR power_on` holds: an
/// "on" window only while power is off, an "off" window only while on.
pub fn night_window_index(table: &WindowTable, wday: u8, minute: u16, power_on: bool) -> Option<usize> {
    table
        .iter()
        .position(|w| w.matches(wday, minute) && (w.direction ^ power_on))
}

/// Whether any night window fires; the caller toggles power.
pub fn night_window_fires(table: &WindowTable, wday: u8, minute: u16, power_on: bool) -> bool {
    night_window_index(table, wday, minute, power_on).is_some()
}

/// 1-based index of the first matching alarm, 0 when none matches.
pub fn alarm_index(table: &WindowTable, wday: u8, minute: u16) -> u8 {
    table
        .iter()
        .position(|w| w.matches(wday, minute))
        .map_or(0, |i| i as u8 + 1)
}

/// Sanitize every row; returns `true` if the table needs rewriting.
pub fn sanitize_table(table: &mut WindowTable) -> bool {
    table.iter_mut().fold(false, |acc, w| w.sanitize() | acc)
}

/// Minute-of-day interval during which audio cues stay silent.
///
/// Wraps around midnight when `from > to`; `from == to` disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SilenceWindow {
    pub from: u16,
    pub to: u16,
}

impl SilenceWindow {
    /// Check if the given minute of day is silent.
    pub fn is_silent(&self, minute: u16) -> bool {
        if self.from <= self.to {
            // e.g. 13:00..15:00
            minute >= self.from && minute < self.to
        } else {
            // e.g. 22:00..07:00 (wraps around midnight)
            minute >= self.from || minute < self.to
        }
    }
}
