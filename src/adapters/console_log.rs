//! stderr logger for the host simulator.
//!
//! The level comes from `WCLOCK_LOG` (`error`, `warn`, `info`, `debug`,
//! `trace`, `off`); unset or unparsable means `info`.

use std::io::Write as _;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub const LEVEL_ENV: &str = "WCLOCK_LOG";

pub struct ConsoleLogger {
    start: std::sync::OnceLock<Instant>,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    start: std::sync::OnceLock::new(),
};

pub fn level_from_env() -> LevelFilter {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the logger. Fails if another logger is already set.
pub fn init() -> Result<(), SetLoggerError> {
    LOGGER.start.get_or_init(Instant::now);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level_from_env());
    Ok(())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let ms = self.start.get().map_or(0, |s| s.elapsed().as_millis());
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{:>8} {:<5} {}", ms, record.level(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
