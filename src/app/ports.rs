//! Port traits: the hexagonal boundary between the clock core and its
//! peripherals.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ClockApp (domain)
//! ```
//!
//! Every optional peripheral reports `is_up()`; the main loop skips a
//! peripheral that is down and retries on its next natural trigger.  Ports
//! are consumed as `&mut dyn Trait` through [`Devices`] so the loop never
//! touches hardware directly.

use core::fmt;

use crate::scheduler::calendar::ClockTime;

// ───────────────────────────────────────────────────────────────
// Configuration store
// ───────────────────────────────────────────────────────────────

/// Byte-addressed non-volatile store (EEPROM image or cached flash).
///
/// Writes are not transactional; recovery from a torn multi-field update
/// is by range validation at load time.
pub trait ConfigStore {
    fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), StorageError>;

    fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), StorageError>;

    /// Push buffered writes to the medium. A no-op for byte-addressable
    /// EEPROM.
    fn flush(&mut self) -> Result<(), StorageError>;

    fn is_up(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Real-time clock
// ───────────────────────────────────────────────────────────────

pub trait RtcPort {
    fn is_up(&self) -> bool;

    fn get_time(&mut self) -> Result<ClockTime, DeviceError>;

    fn set_time(&mut self, t: &ClockTime) -> Result<(), DeviceError>;

    /// Die temperature register of the RTC (signed whole degrees).
    fn temperature_index(&mut self) -> Result<u8, DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Two-phase sensors (light sensor, temperature probe)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    fn is_up(&self) -> bool;

    /// Begin a measurement; the result is collected by a later
    /// [`poll_value`](Self::poll_value).
    fn start_conversion(&mut self);

    /// `Some(raw)` once the conversion has completed.
    fn poll_value(&mut self) -> Option<u16>;
}

// ───────────────────────────────────────────────────────────────
// Audio playback module
// ───────────────────────────────────────────────────────────────

/// Packet framing of the module is the adapter's business.
pub trait AudioPort {
    fn is_up(&self) -> bool;

    fn play_folder(&mut self, folder: u8, track: u8) -> Result<(), DeviceError>;

    fn set_volume(&mut self, volume: u8);

    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// `true` once after each track has finished playing.
    fn poll_finished(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Infrared receiver
// ───────────────────────────────────────────────────────────────

/// A decoded remote-control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrCode {
    pub protocol: u8,
    pub address: u16,
    pub command: u16,
}

pub trait IrPort {
    /// Next decoded frame, if the decoder produced one since the last poll.
    fn poll(&mut self) -> Option<IrCode>;
}

// ───────────────────────────────────────────────────────────────
// Display renderer
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFlags {
    /// Full redraw, used on the hour.
    All,
    MinutesOnly,
    /// Immediate redraw after a manual adjustment.
    NoAnimation,
    PowerOn,
    PowerOff,
}

pub trait DisplayPort {
    fn render(&mut self, hour: u8, minute: u8, flags: RenderFlags);

    fn render_animation_tick(&mut self);

    /// 1..=15
    fn set_brightness(&mut self, level: u8);

    fn is_animating(&self) -> bool;

    fn show_ticker(&mut self, text: &str);

    fn show_date(&mut self, date: &ClockTime);

    fn ambient_step(&mut self, position: u8);

    fn set_ambient_power(&mut self, on: bool);

    fn game_input(&mut self, id: u8, value: u8);

    fn test_pattern(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Companion link and button
// ───────────────────────────────────────────────────────────────

/// Serial link to the companion network processor.
pub trait LinkPort {
    /// Next received byte, non-blocking.
    fn read_byte(&mut self) -> Option<u8>;

    /// Send one line; the adapter appends the newline.
    fn write_line(&mut self, line: &str) -> Result<(), LinkError>;
}

pub trait ButtonPort {
    /// Raw (undebounced) level.
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Device bundle handed to the main loop
// ───────────────────────────────────────────────────────────────

/// All peripherals for one loop iteration.
pub struct Devices<'a> {
    pub store: &'a mut dyn ConfigStore,
    pub rtc: &'a mut dyn RtcPort,
    pub light: &'a mut dyn SensorPort,
    pub probe: &'a mut dyn SensorPort,
    pub audio: &'a mut dyn AudioPort,
    pub ir: &'a mut dyn IrPort,
    pub display: &'a mut dyn DisplayPort,
    pub link: &'a mut dyn LinkPort,
    pub button: &'a mut dyn ButtonPort,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Offset + length runs past the end of the store.
    OutOfBounds,
    /// The medium did not respond.
    NotReady,
    /// Generic I/O error from the backend.
    Io,
}

/// Errors from [`LinkPort`] operations and acknowledged sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    WriteFailed,
    /// No `OK` within the poll limit.
    AckTimeout,
    /// A bulk send is already running.
    Busy,
}

/// Errors from optional peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    NotPresent,
    Bus,
    /// Device returned data that failed validation.
    InvalidData,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "access out of bounds"),
            Self::NotReady => write!(f, "store not ready"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write failed"),
            Self::AckTimeout => write!(f, "acknowledgement timeout"),
            Self::Busy => write!(f, "bulk send in progress"),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "device not present"),
            Self::Bus => write!(f, "bus error"),
            Self::InvalidData => write!(f, "invalid data"),
        }
    }
}
