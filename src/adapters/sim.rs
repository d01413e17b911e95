//! Simulated peripherals for the host binary.
//!
//! The companion link is stdin/stdout (one protocol line per text line);
//! everything else is a stand-in that logs what real hardware would do.

use std::io::{BufRead as _, Write as _};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::app::ports::{
    AudioPort, ButtonPort, DeviceError, DisplayPort, IrCode, IrPort, LinkError, LinkPort, RenderFlags,
    RtcPort, SensorPort,
};
use crate::scheduler::TickInputs;
use crate::scheduler::calendar::{ClockTime, advance_calendar};

// ── Link ─────────────────────────────────────────────────────

/// Companion link on stdin (inbound) and stdout (outbound).
pub struct StdioLink {
    rx: Receiver<u8>,
}

impl StdioLink {
    /// Start the stdin reader thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                for b in line.bytes().chain(core::iter::once(b'\n')) {
                    if tx.send(b).is_err() {
                        return;
                    }
                }
            }
            debug!("sim: stdin closed");
        });
        Self { rx }
    }
}

impl LinkPort for StdioLink {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.try_recv().ok()
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|_| LinkError::WriteFailed)
    }
}

// ── RTC ──────────────────────────────────────────────────────

/// Battery-backed clock that keeps running between reads.
pub struct SimRtc {
    base: ClockTime,
    since: Instant,
}

impl SimRtc {
    pub fn new(start: ClockTime) -> Self {
        Self {
            base: start,
            since: Instant::now(),
        }
    }
}

impl RtcPort for SimRtc {
    fn is_up(&self) -> bool {
        true
    }

    fn get_time(&mut self) -> Result<ClockTime, DeviceError> {
        let mut t = self.base;
        for _ in 0..self.since.elapsed().as_secs() {
            t = advance_calendar(t);
        }
        Ok(t)
    }

    fn set_time(&mut self, t: &ClockTime) -> Result<(), DeviceError> {
        self.base = *t;
        self.since = Instant::now();
        Ok(())
    }

    fn temperature_index(&mut self) -> Result<u8, DeviceError> {
        Ok(22)
    }
}

// ── Sensors ──────────────────────────────────────────────────

/// Two-phase sensor returning a fixed value.
pub struct SimSensor {
    value: u16,
    pending: bool,
}

impl SimSensor {
    pub const fn new(value: u16) -> Self {
        Self { value, pending: false }
    }
}

impl SensorPort for SimSensor {
    fn is_up(&self) -> bool {
        true
    }

    fn start_conversion(&mut self) {
        self.pending = true;
    }

    fn poll_value(&mut self) -> Option<u16> {
        core::mem::take(&mut self.pending).then_some(self.value)
    }
}

// ── Audio ────────────────────────────────────────────────────

const SIM_TRACK_LEN: Duration = Duration::from_secs(1);

/// Logs each track and reports it finished a second later.
#[derive(Default)]
pub struct SimAudio {
    ends_at: Option<Instant>,
}

impl AudioPort for SimAudio {
    fn is_up(&self) -> bool {
        true
    }

    fn play_folder(&mut self, folder: u8, track: u8) -> Result<(), DeviceError> {
        info!("sim: audio {folder:02}/{track:03}");
        self.ends_at = Some(Instant::now() + SIM_TRACK_LEN);
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) {
        debug!("sim: volume {volume}");
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.ends_at = None;
    }

    fn poll_finished(&mut self) -> bool {
        match self.ends_at {
            Some(end) if Instant::now() >= end => {
                self.ends_at = None;
                true
            }
            _ => false,
        }
    }
}

// ── Display, IR, button ──────────────────────────────────────

/// Prints what the word matrix would show.
#[derive(Default)]
pub struct ConsoleDisplay {
    brightness: u8,
}

impl DisplayPort for ConsoleDisplay {
    fn render(&mut self, hour: u8, minute: u8, flags: RenderFlags) {
        info!("sim: display {hour:02}:{minute:02} ({flags:?}, brightness {})", self.brightness);
    }

    fn render_animation_tick(&mut self) {}

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn is_animating(&self) -> bool {
        false
    }

    fn show_ticker(&mut self, text: &str) {
        info!("sim: ticker {text:?}");
    }

    fn show_date(&mut self, date: &ClockTime) {
        info!("sim: date {:02}.{:02}.{}", date.day, date.month, date.year);
    }

    fn ambient_step(&mut self, position: u8) {
        debug!("sim: ambient {position}");
    }

    fn set_ambient_power(&mut self, on: bool) {
        debug!("sim: ambient power {on}");
    }

    fn game_input(&mut self, id: u8, value: u8) {
        info!("sim: game input {id} = {value}");
    }

    fn test_pattern(&mut self) {
        warn!("sim: display test pattern");
    }
}

pub struct NoIr;

impl IrPort for NoIr {
    fn poll(&mut self) -> Option<IrCode> {
        None
    }
}

pub struct NoButton;

impl ButtonPort for NoButton {
    fn is_pressed(&mut self) -> bool {
        false
    }
}

/// Tick-side inputs: no IR receiver, no broadcast antenna.
pub struct SimInputs;

impl TickInputs for SimInputs {
    fn sample_ir(&mut self) {}

    fn sample_broadcast(&mut self) -> bool {
        false
    }
}
