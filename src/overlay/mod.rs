//! Transient display overlays and their arbitration.
//!
//! An overlay (icon, ticker, weather, date, audio cue) temporarily replaces
//! or accompanies the clock face.  Up to [`OVERLAY_SLOTS`] are configured;
//! once per half minute the [`arbiter`] picks at most one to show next.

pub mod arbiter;
pub mod dates;

use heapless::String;

pub use arbiter::OverlayArbiter;

pub const OVERLAY_SLOTS: usize = 32;
pub const OVERLAY_TEXT_LEN: usize = 32;

/// What an overlay shows. Rendering is a kind-keyed side effect of the
/// main loop; arbitration only looks at timing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OverlayKind {
    #[default]
    Unused = 0,
    /// Icon fetched by the companion (`text` names it).
    Icon = 1,
    /// Scrolling text.
    Ticker = 2,
    /// Weather query via the companion.
    Weather = 3,
    /// Today's date.
    Date = 4,
    /// Audio cue, `text` is `"<folder>/<track>"`.
    Audio = 5,
}

impl OverlayKind {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Unused),
            1 => Some(Self::Icon),
            2 => Some(Self::Ticker),
            3 => Some(Self::Weather),
            4 => Some(Self::Date),
            5 => Some(Self::Audio),
            _ => None,
        }
    }
}

/// A day of the year. `month == 0` means "no date".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u8,
    pub day: u8,
}

impl MonthDay {
    pub const NONE: Self = Self { month: 0, day: 0 };

    pub const fn new(month: u8, day: u8) -> Self {
        Self { month, day }
    }

    pub const fn is_none(&self) -> bool {
        self.month == 0
    }

    /// Sortable key, monotonic within a year.
    pub const fn ordinal(&self) -> u16 {
        self.month as u16 * 32 + self.day as u16
    }
}

/// One configured overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub kind: OverlayKind,
    /// Minutes divisor; 0 never fires.
    pub interval: u8,
    /// Display time in seconds.
    pub duration: u8,
    /// See [`dates::DateCode`].
    pub date_code: u8,
    pub date_start: MonthDay,
    /// Derived from `date_start` and `days`; not persisted.
    pub date_end: MonthDay,
    pub days: u8,
    pub text: String<OVERLAY_TEXT_LEN>,
    pub active: bool,
}

impl Overlay {
    /// Whether the overlay is restricted to a date range.
    pub const fn has_date_range(&self) -> bool {
        !self.date_start.is_none()
    }

    /// Whether `today` falls into the date range (always true without one).
    /// Ranges ending before they start wrap over the year end.
    pub fn date_matches(&self, today: MonthDay) -> bool {
        if !self.has_date_range() {
            return true;
        }
        let (start, end, t) = (
            self.date_start.ordinal(),
            self.date_end.ordinal(),
            today.ordinal(),
        );
        if start <= end {
            start <= t && t <= end
        } else {
            t >= start || t <= end
        }
    }
}

/// Parse an audio overlay's `"<folder>/<track>"` text.
pub fn parse_audio_cue(text: &str) -> Option<(u8, u8)> {
    let (folder, track) = text.split_once('/')?;
    Some((folder.trim().parse().ok()?, track.trim().parse().ok()?))
}
