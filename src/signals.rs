//! Interrupt-to-loop signal bus.
//!
//! Signals are raised by the tick handler and consumed by the main loop,
//! which checks them once per iteration in a fixed priority order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Tick ISR    │────▶│  Signal Bus  │────▶│  Main Loop   │
//! │ (producer)  │     │  (atomics)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Each flag is level-triggered with at-most-one-pending semantics: raising
//! a flag that is already raised leaves it raised, so a slow loop never
//! accumulates a backlog.  Counters saturate instead of wrapping.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Boolean signals, in the order the main loop services them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Signal {
    // ── Sampling ──────────────────────────────────────────
    /// Quarter-second sensor sampling tick.
    SensorSample = 0,
    /// Slow protocol tick (1/100 s).
    LinkTick = 1,

    // ── Time sources ──────────────────────────────────────
    /// Second 45: re-read the hardware real-time clock.
    ClockResync = 2,
    /// A complete time-broadcast frame is waiting in the scheduler state.
    BroadcastFrame = 3,

    // ── Display ───────────────────────────────────────────
    /// Seconds rolled over to 0.
    Minute = 4,
    /// Animation frame tick (1/64 s).
    Animation = 5,
    /// Ambient light sweep advanced one position.
    AmbientStep = 6,
    /// Seconds reached 30: run the overlay arbiter.
    HalfMinute = 7,

    // ── Temperature ───────────────────────────────────────
    /// Second 49: read the RTC temperature index.
    RtcTemperature = 8,
    /// Second 50: start a probe conversion.
    TemperatureStart = 9,
    /// Second 51: read the probe result.
    TemperatureRead = 10,
}

impl Signal {
    pub const ALL: [Self; SIGNAL_COUNT] = [
        Self::SensorSample,
        Self::LinkTick,
        Self::ClockResync,
        Self::BroadcastFrame,
        Self::Minute,
        Self::Animation,
        Self::AmbientStep,
        Self::HalfMinute,
        Self::RtcTemperature,
        Self::TemperatureStart,
        Self::TemperatureRead,
    ];
}

/// Saturating counters raised by the tick handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Counter {
    /// Milliseconds elapsed for configuration-store timing.
    StoreTick = 0,
}

const SIGNAL_COUNT: usize = 11;
const COUNTER_COUNT: usize = 1;

/// Single-writer (tick handler) / single-reader (main loop) flags.
pub struct SignalBus {
    flags: [AtomicBool; SIGNAL_COUNT],
    counters: [AtomicU8; COUNTER_COUNT],
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub const fn new() -> Self {
        Self {
            flags: [const { AtomicBool::new(false) }; SIGNAL_COUNT],
            counters: [const { AtomicU8::new(0) }; COUNTER_COUNT],
        }
    }

    /// Raise a signal. Safe to call from interrupt context.
    pub fn raise(&self, signal: Signal) {
        self.flags[signal as usize].store(true, Ordering::Release);
    }

    /// Consume a signal: returns whether it was pending and clears it.
    /// Main loop only.
    pub fn take(&self, signal: Signal) -> bool {
        self.flags[signal as usize].swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming.
    pub fn is_pending(&self, signal: Signal) -> bool {
        self.flags[signal as usize].load(Ordering::Acquire)
    }

    /// Increment a counter, saturating at `u8::MAX`. Interrupt context.
    pub fn bump(&self, counter: Counter) {
        // Saturated counters stay at u8::MAX until drained.
        let _ = self.counters[counter as usize].fetch_update(
            Ordering::AcqRel,
            Ordering::Relaxed,
            |v| v.checked_add(1),
        );
    }

    /// Read and reset a counter. Main loop only.
    pub fn drain(&self, counter: Counter) -> u8 {
        self.counters[counter as usize].swap(0, Ordering::AcqRel)
    }

    /// Number of signals currently pending.
    pub fn pending_count(&self) -> usize {
        self.flags
            .iter()
            .filter(|f| f.load(Ordering::Relaxed))
            .count()
    }
}
