//! Half-minute overlay selection.
//!
//! ```text
//!  HalfMinute ──▶ refresh ranges (year changed?) ──▶ select ──▶ latch
//!                                                               │
//!  next loop iteration ◀── render by kind ◀── take_latched ◀────┘
//! ```
//!
//! Selection: among active overlays whose interval divides the current
//! minute and whose date range contains today, the largest interval wins.
//! On a tie a dated overlay beats an undated one; otherwise the lowest
//! index keeps its place.

use log::debug;

use super::dates::refresh_range;
use super::{MonthDay, Overlay, OverlayKind};
use crate::scheduler::calendar::ClockTime;

/// Index of the overlay to show at `now`, if any.
pub fn select_overlay(overlays: &[Overlay], now: &ClockTime) -> Option<usize> {
    let today = MonthDay::new(now.month, now.day);
    let mut best: Option<(usize, &Overlay)> = None;

    for (i, o) in overlays.iter().enumerate() {
        if !o.active || o.kind == OverlayKind::Unused || o.interval == 0 {
            continue;
        }
        if now.minute % o.interval != 0 || !o.date_matches(today) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, b)) => {
                o.interval > b.interval
                    || (o.interval == b.interval && o.has_date_range() && !b.has_date_range())
            }
        };
        if better {
            best = Some((i, o));
        }
    }
    best.map(|(i, _)| i)
}

/// Owns the latch and the year the date ranges were last computed for.
#[derive(Debug, Default)]
pub struct OverlayArbiter {
    latched: Option<usize>,
    ranges_year: Option<u16>,
}

impl OverlayArbiter {
    pub const fn new() -> Self {
        Self {
            latched: None,
            ranges_year: None,
        }
    }

    /// Run one arbitration and latch the winner for the next iteration.
    pub fn arbitrate(&mut self, overlays: &mut [Overlay], now: &ClockTime) -> Option<usize> {
        if self.ranges_year != Some(now.year) {
            for o in overlays.iter_mut() {
                refresh_range(o, now.year);
            }
            self.ranges_year = Some(now.year);
            debug!("overlay: date ranges recomputed for {}", now.year);
        }
        self.latched = select_overlay(overlays, now);
        self.latched
    }

    /// Consume the latched winner.
    pub fn take_latched(&mut self) -> Option<usize> {
        self.latched.take()
    }

    pub const fn is_latched(&self) -> bool {
        self.latched.is_some()
    }

    /// Force a range recomputation, e.g. after a date field changed.
    pub fn invalidate_ranges(&mut self) {
        self.ranges_year = None;
    }
}
