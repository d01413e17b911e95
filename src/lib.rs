//! Word clock firmware core.
//!
//! A single periodic interrupt ([`scheduler::TickSource`]) keeps the
//! calendar and raises signals; one foreground loop ([`app::ClockApp`])
//! consumes them and drives the peripherals through the port traits in
//! [`app::ports`].  Everything here runs on the host as well, with the
//! adapters in [`adapters`] standing in for hardware.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod overlay;
pub mod protocol;
pub mod scheduler;
pub mod signals;
pub mod store;
pub mod window;

pub use error::{Error, Result};
