//! Tick scheduler: the interrupt-side half of the firmware.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    TickSource (F Hz ISR)                     │
//! │                                                              │
//! │  ¼ s ──▶ SensorSample     1/64 s ──▶ Animation               │
//! │  1/100 s ──▶ LinkTick + broadcast sampler                    │
//! │  1/1000 s ──▶ StoreTick counter + uptime                     │
//! │  1 s ──▶ advance_calendar ──▶ marks 30/45/49/50/51, Minute   │
//! │  ambient sweep ──▶ AmbientStep                               │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │  SchedulerState (atomics)
//!                                 ▼
//!                            Main loop
//! ```

pub mod broadcast;
pub mod calendar;
pub mod divider;
pub mod tick;

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use critical_section::Mutex;

use crate::signals::SignalBus;
use calendar::ClockTime;

pub use tick::{TickInputs, TickSource};

/// Everything shared between the tick handler and the main loop.
///
/// Each field has exactly one writer: signals, uptime, the broadcast frame
/// and the ambient position are written by the tick handler; the loop
/// writes the ambient LED count and the broadcast enable.  The clock is
/// the only two-writer field and lives behind a critical section.
pub struct SchedulerState {
    pub signals: SignalBus,
    uptime_ms: AtomicU32,
    clock: Mutex<Cell<ClockTime>>,
    broadcast_frame: AtomicU64,
    broadcast_enabled: AtomicBool,
    ambient_position: AtomicU8,
    ambient_leds: AtomicU8,
}

impl SchedulerState {
    pub const fn new(start: ClockTime) -> Self {
        Self {
            signals: SignalBus::new(),
            uptime_ms: AtomicU32::new(0),
            clock: Mutex::new(Cell::new(start)),
            broadcast_frame: AtomicU64::new(0),
            broadcast_enabled: AtomicBool::new(false),
            ambient_position: AtomicU8::new(0),
            ambient_leds: AtomicU8::new(0),
        }
    }

    /// Current wall-clock time.
    pub fn now(&self) -> ClockTime {
        critical_section::with(|cs| self.clock.borrow(cs).get())
    }

    /// Replace the wall-clock time (network reply, RTC read, broadcast,
    /// manual adjustment).
    pub fn set_time(&self, t: ClockTime) {
        critical_section::with(|cs| self.clock.borrow(cs).set(t));
    }

    /// Read-modify-write of the clock inside one critical section.
    pub(crate) fn update_time(&self, f: impl FnOnce(ClockTime) -> ClockTime) -> ClockTime {
        critical_section::with(|cs| {
            let cell = self.clock.borrow(cs);
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }

    /// Free-running millisecond counter (wraps after ~49 days).
    pub fn uptime_ms(&self) -> u32 {
        self.uptime_ms.load(Ordering::Acquire)
    }

    pub(crate) fn advance_uptime(&self) {
        self.uptime_ms.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn publish_broadcast_frame(&self, bits: u64) {
        self.broadcast_frame.store(bits, Ordering::Release);
    }

    /// Last complete broadcast frame (valid after `BroadcastFrame`).
    pub fn broadcast_frame(&self) -> u64 {
        self.broadcast_frame.load(Ordering::Acquire)
    }

    pub fn set_broadcast_enabled(&self, enabled: bool) {
        self.broadcast_enabled.store(enabled, Ordering::Release);
    }

    pub fn broadcast_enabled(&self) -> bool {
        self.broadcast_enabled.load(Ordering::Acquire)
    }

    /// Number of ambient LEDs the sweep spreads over a minute (0 = off).
    pub fn set_ambient_leds(&self, leds: u8) {
        self.ambient_leds.store(leds, Ordering::Release);
    }

    pub fn ambient_leds(&self) -> u8 {
        self.ambient_leds.load(Ordering::Acquire)
    }

    pub fn ambient_position(&self) -> u8 {
        self.ambient_position.load(Ordering::Acquire)
    }

    pub(crate) fn set_ambient_position(&self, pos: u8) {
        self.ambient_position.store(pos, Ordering::Release);
    }
}
