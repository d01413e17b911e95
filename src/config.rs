//! Boot-time configuration parameters.
//!
//! Tunables that are fixed for a given build or simulator run.  User
//! settings (brightness, windows, overlays, ...) live in the persisted
//! configuration store instead, see [`crate::store`].

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::scheduler::calendar::ClockTime;

/// Core firmware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    // --- Tick source ---
    /// Interrupt frequency F in Hz.
    pub tick_hz: u32,

    // --- Protocol ---
    /// Inbound polls to wait for `OK` before declaring the link down.
    pub ack_poll_limit: u32,
    /// No overlay is selected this many seconds before a net-time request.
    pub net_time_guard_secs: u32,

    // --- Brightness ---
    /// EMA weight as a right shift (new = old + (sample - old) >> shift).
    pub brightness_filter_shift: u8,

    // --- Store ---
    /// Delay between the last write-through and the store flush.
    pub flush_delay_ms: u32,

    // --- Button ---
    /// Stable press time before a change is accepted.
    pub debounce_ms: u32,
    /// Hold time that turns a press into a long press.
    pub long_press_ms: u32,

    // --- Simulator ---
    /// Clock value before any time source has been applied.
    pub start_time: Option<ClockTime>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_hz: 10_000,

            ack_poll_limit: 2_000,
            net_time_guard_secs: 30,

            brightness_filter_shift: 3,

            flush_delay_ms: 2_000,

            debounce_ms: 50,
            long_press_ms: 3_000,

            start_time: None,
        }
    }
}

impl ClockConfig {
    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tick_hz < 1_000 {
            return Err(Error::Config("tick_hz must be at least 1000"));
        }
        if self.tick_hz % 1_000 != 0 {
            return Err(Error::Config("tick_hz must be a multiple of 1000"));
        }
        if self.ack_poll_limit == 0 {
            return Err(Error::Config("ack_poll_limit must be non-zero"));
        }
        if self.brightness_filter_shift > 7 {
            return Err(Error::Config("brightness_filter_shift must be <= 7"));
        }
        if self.debounce_ms >= self.long_press_ms {
            return Err(Error::Config("long_press_ms must exceed debounce_ms"));
        }
        if let Some(t) = self.start_time {
            if !t.is_valid() {
                return Err(Error::Config("start_time is not a valid date"));
            }
        }
        Ok(())
    }
}
