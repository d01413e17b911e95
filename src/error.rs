//! Unified error types for the clock firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! main loop's error handling uniform.  All variants are `Copy` so they can
//! be returned from port adapters and logged without allocation.

use core::fmt;

pub use crate::app::ports::{DeviceError, LinkError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The configuration store failed a read or write.
    Storage(StorageError),
    /// The companion link could not send or timed out.
    Link(LinkError),
    /// An inbound or outbound protocol line was malformed.
    Protocol(ProtocolError),
    /// An optional peripheral is absent or failed this cycle.
    Device(DeviceError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Reasons a protocol line is rejected.  Never fatal: the line is logged
/// and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Blank line.
    Empty,
    /// First character(s) match no route.
    UnknownTag,
    /// Index is not two hex digits.
    BadIndex,
    /// Payload has the wrong length or non-hex characters.
    BadPayload,
    /// Index addresses a slot that does not exist.
    IndexOutOfRange,
    /// Line exceeded the assembler buffer.
    LineTooLong,
    /// Outbound line does not fit the encode buffer.
    Encode,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownTag => write!(f, "unknown tag"),
            Self::BadIndex => write!(f, "bad index"),
            Self::BadPayload => write!(f, "bad payload"),
            Self::IndexOutOfRange => write!(f, "index out of range"),
            Self::LineTooLong => write!(f, "line too long"),
            Self::Encode => write!(f, "encode overflow"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
