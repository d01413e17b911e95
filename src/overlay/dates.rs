//! Date codes: fixed holidays and movable feasts an overlay can be tied to.

use log::warn;

use super::{MonthDay, Overlay};
use crate::scheduler::calendar::{SUNDAY, days_in_month, is_leap_year, weekday_of};

/// How an overlay's start date is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DateCode {
    None = 0,
    /// The configured `date_start`.
    Fixed = 1,
    NewYear = 2,
    Valentine = 3,
    Halloween = 4,
    ChristmasEve = 5,
    NewYearsEve = 6,
    Easter = 7,
    GoodFriday = 8,
    EasterMonday = 9,
    Ascension = 10,
    Pentecost = 11,
    WhitMonday = 12,
    CorpusChristi = 13,
    CarnivalMonday = 14,
    AshWednesday = 15,
    /// Second Sunday of May.
    MothersDay = 16,
    /// Fourth Sunday before Christmas.
    FirstAdvent = 17,
}

impl DateCode {
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::None,
            1 => Self::Fixed,
            2 => Self::NewYear,
            3 => Self::Valentine,
            4 => Self::Halloween,
            5 => Self::ChristmasEve,
            6 => Self::NewYearsEve,
            7 => Self::Easter,
            8 => Self::GoodFriday,
            9 => Self::EasterMonday,
            10 => Self::Ascension,
            11 => Self::Pentecost,
            12 => Self::WhitMonday,
            13 => Self::CorpusChristi,
            14 => Self::CarnivalMonday,
            15 => Self::AshWednesday,
            16 => Self::MothersDay,
            17 => Self::FirstAdvent,
            _ => return None,
        })
    }

    /// Offset in days from Easter Sunday for the movable feasts.
    const fn easter_offset(self) -> Option<i32> {
        match self {
            Self::Easter => Some(0),
            Self::GoodFriday => Some(-2),
            Self::EasterMonday => Some(1),
            Self::Ascension => Some(39),
            Self::Pentecost => Some(49),
            Self::WhitMonday => Some(50),
            Self::CorpusChristi => Some(60),
            Self::CarnivalMonday => Some(-48),
            Self::AshWednesday => Some(-46),
            _ => None,
        }
    }
}

/// Easter Sunday (anonymous Gregorian computus).
pub fn easter_sunday(year: u16) -> MonthDay {
    let y = i32::from(year);
    let a = y % 19;
    let b = y / 100;
    let c = y % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;
    MonthDay::new((n / 31) as u8, (n % 31 + 1) as u8)
}

fn days_in_year(year: i32) -> i32 {
    if is_leap_year(year as u16) { 366 } else { 365 }
}

fn day_of_year(year: u16, md: MonthDay) -> i32 {
    (1..md.month)
        .map(|m| i32::from(days_in_month(year, m)))
        .sum::<i32>()
        + i32::from(md.day)
}

/// `md` moved by `delta` days, crossing month and year boundaries.
pub fn add_days(year: u16, md: MonthDay, delta: i32) -> MonthDay {
    let mut y = i32::from(year);
    let mut doy = day_of_year(year, md) + delta;
    while doy < 1 {
        y -= 1;
        doy += days_in_year(y);
    }
    while doy > days_in_year(y) {
        doy -= days_in_year(y);
        y += 1;
    }
    let mut month = 1;
    loop {
        let len = i32::from(days_in_month(y as u16, month));
        if doy <= len || month == 12 {
            return MonthDay::new(month, doy as u8);
        }
        doy -= len;
        month += 1;
    }
}

fn nth_sunday(year: u16, month: u8, n: u8) -> MonthDay {
    let first = weekday_of(year, month, 1);
    let first_sunday = 1 + (7 - first) % 7;
    MonthDay::new(month, first_sunday + 7 * (n - 1))
}

fn first_advent(year: u16) -> MonthDay {
    let christmas = MonthDay::new(12, 25);
    let wd = weekday_of(year, 12, 25);
    // Last Sunday strictly before Christmas, then three more weeks back.
    let back = if wd == SUNDAY { 7 } else { i32::from(wd) };
    add_days(year, christmas, -back - 21)
}

/// Start date for `code` in `year`; `None` when the overlay has no range.
pub fn resolve(code: u8, year: u16, fixed: MonthDay) -> Option<MonthDay> {
    let Some(code) = DateCode::from_u8(code) else {
        warn!("overlay: unknown date code {code}");
        return None;
    };
    if let Some(offset) = code.easter_offset() {
        return Some(add_days(year, easter_sunday(year), offset));
    }
    match code {
        DateCode::None => None,
        DateCode::Fixed => (!fixed.is_none()).then_some(fixed),
        DateCode::NewYear => Some(MonthDay::new(1, 1)),
        DateCode::Valentine => Some(MonthDay::new(2, 14)),
        DateCode::Halloween => Some(MonthDay::new(10, 31)),
        DateCode::ChristmasEve => Some(MonthDay::new(12, 24)),
        DateCode::NewYearsEve => Some(MonthDay::new(12, 31)),
        DateCode::MothersDay => Some(nth_sunday(year, 5, 2)),
        DateCode::FirstAdvent => Some(first_advent(year)),
        _ => None,
    }
}

/// Recompute `date_start`/`date_end` of one overlay for `year`.
/// The range spans `days` days (0 counts as 1).
pub fn refresh_range(overlay: &mut Overlay, year: u16) {
    match resolve(overlay.date_code, year, overlay.date_start) {
        Some(start) => {
            let span = i32::from(overlay.days.max(1)) - 1;
            overlay.date_start = start;
            overlay.date_end = add_days(year, start, span);
        }
        None => {
            overlay.date_start = MonthDay::NONE;
            overlay.date_end = MonthDay::NONE;
        }
    }
}
