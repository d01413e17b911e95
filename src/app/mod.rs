//! Application core: clock state, the foreground loop and its ports.
//!
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod ports;
pub mod service;
pub mod state;

pub use service::ClockApp;
pub use state::ClockState;
