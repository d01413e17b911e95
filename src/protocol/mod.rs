//! Companion-processor command protocol.
//!
//! ```text
//!  link bytes ─▶ LineAssembler ─▶ decode (ROUTES) ─▶ apply ─▶ ClockState
//!                                                     │
//!                               Persist ─▶ write-through ─▶ ConfigStore
//!                               Action  ─▶ queue ─▶ ClockApp (devices)
//! ```

pub mod codec;
pub mod dispatcher;
pub mod message;
pub mod vars;

pub use codec::{decode, encode};
pub use dispatcher::{Dispatcher, apply};
pub use message::{Message, OverlayField, RemoteCall};

use crate::scheduler::calendar::ClockTime;

/// Device-side effect of an applied message, carried out by the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Display power changed; render `PowerOn`/`PowerOff`.
    DisplayPower,
    AmbientPower,
    /// Mode, color or animation changed; redraw the current time.
    Redraw,
    Brightness,
    Volume,
    /// Ambient LED count or broadcast enable changed.
    SchedulerSync,
    /// Date fields of an overlay changed; recompute ranges.
    OverlayDates,
    RequestNetTime,
    DisplayTest,
    LearnIr,
    StopAudio,
    Game { id: u8, value: u8 },
    /// Handled by the dispatcher itself.
    SendAll,
    /// Handled by the dispatcher itself.
    NetTime(ClockTime),
}
