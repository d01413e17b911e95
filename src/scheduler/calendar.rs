//! Calendar arithmetic for the tick handler and the main loop.
//!
//! Everything here is pure and `const`-friendly so the 1 Hz path of the
//! interrupt handler can call [`advance_calendar`] without touching any
//! shared state, and the tests can drive it outside interrupt context.

use serde::{Deserialize, Serialize};

/// Weekday numbering used throughout the firmware (0 = Sunday).
pub const SUNDAY: u8 = 0;
pub const SATURDAY: u8 = 6;

/// Minutes in a day; valid minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Wall-clock date and time as kept by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=6, 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    /// Build a time, deriving the weekday from the date.
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            weekday: weekday_of(year, month, day),
            hour,
            minute,
            second,
        }
    }

    /// Minute of the day, `0..1440`.
    pub const fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Range-check every field, including day against the month length.
    pub const fn is_valid(&self) -> bool {
        self.month >= 1
            && self.month <= 12
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.weekday <= SATURDAY
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

impl Default for ClockTime {
    fn default() -> Self {
        Self::new(2024, 1, 1, 0, 0, 0)
    }
}

/// Gregorian leap-year rule.
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` (1..=12) of `year`; 0 for an invalid month.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 0 || month > 12 {
        return 0;
    }
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    }
}

/// Day of week for a Gregorian date (Sakamoto's method), 0 = Sunday.
pub const fn weekday_of(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    if month == 0 || month > 12 {
        return SUNDAY;
    }
    let y = (if month < 3 { year.saturating_sub(1) } else { year }) as u32;
    let total = y + y / 4 - y / 100 + y / 400 + OFFSETS[(month - 1) as usize] as u32 + day as u32;
    (total % 7) as u8
}

/// Advance `t` by one second with full calendar rollover.
///
/// Called once per second from the tick handler. Second → minute → hour →
/// day/weekday → month → year, with leap-year correction for February.
pub const fn advance_calendar(t: ClockTime) -> ClockTime {
    let mut next = t;
    next.second += 1;
    if next.second < 60 {
        return next;
    }
    next.second = 0;
    next.minute += 1;
    if next.minute < 60 {
        return next;
    }
    next.minute = 0;
    next.hour += 1;
    if next.hour < 24 {
        return next;
    }
    next.hour = 0;
    next.weekday = (next.weekday + 1) % 7;
    next.day += 1;
    if next.day <= days_in_month(next.year, next.month) {
        return next;
    }
    next.day = 1;
    next.month += 1;
    if next.month <= 12 {
        return next;
    }
    next.month = 1;
    next.year += 1;
    next
}
