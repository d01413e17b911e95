//! Recording mock implementations of every port trait.
//!
//! Each mock logs the calls it receives so tests can assert on the exact
//! sequence of peripheral operations performed by `ClockApp`.

#![allow(dead_code)]

use std::collections::VecDeque;

use wclock::adapters::mem_store::MemStore;
use wclock::app::ports::{
    AudioPort, ButtonPort, ConfigStore, DeviceError, Devices, DisplayPort, IrCode, IrPort, LinkError, LinkPort,
    RenderFlags, RtcPort, SensorPort, StorageError,
};
use wclock::scheduler::TickInputs;
use wclock::scheduler::calendar::ClockTime;

// ── Display ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Render { hour: u8, minute: u8, flags: RenderFlags },
    AnimationTick,
    Brightness(u8),
    Ticker(String),
    Date(ClockTime),
    AmbientStep(u8),
    AmbientPower(bool),
    Game { id: u8, value: u8 },
    TestPattern,
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
    pub animating: bool,
}

impl MockDisplay {
    pub fn renders(&self) -> Vec<(u8, u8, RenderFlags)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Render { hour, minute, flags } => Some((*hour, *minute, *flags)),
                _ => None,
            })
            .collect()
    }

    pub fn last_brightness(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            DisplayCall::Brightness(level) => Some(*level),
            _ => None,
        })
    }
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, hour: u8, minute: u8, flags: RenderFlags) {
        self.calls.push(DisplayCall::Render { hour, minute, flags });
    }

    fn render_animation_tick(&mut self) {
        self.calls.push(DisplayCall::AnimationTick);
    }

    fn set_brightness(&mut self, level: u8) {
        self.calls.push(DisplayCall::Brightness(level));
    }

    fn is_animating(&self) -> bool {
        self.animating
    }

    fn show_ticker(&mut self, text: &str) {
        self.calls.push(DisplayCall::Ticker(text.to_owned()));
    }

    fn show_date(&mut self, date: &ClockTime) {
        self.calls.push(DisplayCall::Date(*date));
    }

    fn ambient_step(&mut self, position: u8) {
        self.calls.push(DisplayCall::AmbientStep(position));
    }

    fn set_ambient_power(&mut self, on: bool) {
        self.calls.push(DisplayCall::AmbientPower(on));
    }

    fn game_input(&mut self, id: u8, value: u8) {
        self.calls.push(DisplayCall::Game { id, value });
    }

    fn test_pattern(&mut self) {
        self.calls.push(DisplayCall::TestPattern);
    }
}

// ── Companion link ───────────────────────────────────────────

/// Inbound bytes are queued by the test; outbound lines are recorded.
/// With `auto_ack` every written line is answered with `OK`.
#[derive(Default)]
pub struct MockLink {
    pub inbound: VecDeque<u8>,
    pub sent: Vec<String>,
    pub auto_ack: bool,
    pub fail_writes: bool,
}

impl MockLink {
    pub fn acking() -> Self {
        Self {
            auto_ack: true,
            ..Self::default()
        }
    }

    /// Queue one inbound line (newline appended).
    pub fn feed(&mut self, line: &str) {
        self.inbound.extend(line.bytes());
        self.inbound.push_back(b'\n');
    }

    pub fn sent_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|l| l.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl LinkPort for MockLink {
    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        if self.fail_writes {
            return Err(LinkError::WriteFailed);
        }
        self.sent.push(line.to_owned());
        if self.auto_ack {
            self.feed("OK");
        }
        Ok(())
    }
}

// ── Store ────────────────────────────────────────────────────

/// [`MemStore`] with a flush counter.
#[derive(Default)]
pub struct MockStore {
    pub mem: MemStore,
    pub flushes: usize,
}

impl ConfigStore for MockStore {
    fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        self.mem.read(offset, buf)
    }

    fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), StorageError> {
        self.mem.write(offset, data)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        self.flushes += 1;
        self.mem.flush()
    }

    fn is_up(&self) -> bool {
        self.mem.is_up()
    }
}

// ── RTC ──────────────────────────────────────────────────────

pub struct MockRtc {
    pub up: bool,
    pub time: ClockTime,
    pub writes: Vec<ClockTime>,
    pub temperature: u8,
}

impl Default for MockRtc {
    fn default() -> Self {
        Self {
            up: true,
            time: ClockTime::new(2025, 1, 1, 12, 0, 0),
            writes: Vec::new(),
            temperature: 21,
        }
    }
}

impl RtcPort for MockRtc {
    fn is_up(&self) -> bool {
        self.up
    }

    fn get_time(&mut self) -> Result<ClockTime, DeviceError> {
        Ok(self.time)
    }

    fn set_time(&mut self, t: &ClockTime) -> Result<(), DeviceError> {
        self.time = *t;
        self.writes.push(*t);
        Ok(())
    }

    fn temperature_index(&mut self) -> Result<u8, DeviceError> {
        Ok(self.temperature)
    }
}

// ── Sensors ──────────────────────────────────────────────────

pub struct MockSensor {
    pub up: bool,
    pub value: u16,
    pub starts: usize,
    pending: bool,
}

impl MockSensor {
    pub fn new(value: u16) -> Self {
        Self {
            up: true,
            value,
            starts: 0,
            pending: false,
        }
    }
}

impl SensorPort for MockSensor {
    fn is_up(&self) -> bool {
        self.up
    }

    fn start_conversion(&mut self) {
        self.starts += 1;
        self.pending = true;
    }

    fn poll_value(&mut self) -> Option<u16> {
        std::mem::take(&mut self.pending).then_some(self.value)
    }
}

// ── Audio ────────────────────────────────────────────────────

/// Tracks finish only when the test says so.
pub struct MockAudio {
    pub up: bool,
    pub played: Vec<(u8, u8)>,
    pub volume: Option<u8>,
    pub stops: usize,
    pub finished: bool,
}

impl Default for MockAudio {
    fn default() -> Self {
        Self {
            up: true,
            played: Vec::new(),
            volume: None,
            stops: 0,
            finished: false,
        }
    }
}

impl AudioPort for MockAudio {
    fn is_up(&self) -> bool {
        self.up
    }

    fn play_folder(&mut self, folder: u8, track: u8) -> Result<(), DeviceError> {
        self.played.push((folder, track));
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = Some(volume);
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn poll_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }
}

// ── IR and button ────────────────────────────────────────────

#[derive(Default)]
pub struct MockIr {
    pub codes: VecDeque<IrCode>,
}

impl IrPort for MockIr {
    fn poll(&mut self) -> Option<IrCode> {
        self.codes.pop_front()
    }
}

#[derive(Default)]
pub struct MockButton {
    pub pressed: bool,
}

impl ButtonPort for MockButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed
    }
}

// ── Bundle ───────────────────────────────────────────────────

/// Owns one of every mock and lends them out as [`Devices`].
pub struct MockHw {
    pub store: MockStore,
    pub rtc: MockRtc,
    pub light: MockSensor,
    pub probe: MockSensor,
    pub audio: MockAudio,
    pub ir: MockIr,
    pub display: MockDisplay,
    pub link: MockLink,
    pub button: MockButton,
}

impl Default for MockHw {
    fn default() -> Self {
        Self {
            store: MockStore::default(),
            rtc: MockRtc::default(),
            light: MockSensor::new(2_048),
            probe: MockSensor::new(215),
            audio: MockAudio::default(),
            ir: MockIr::default(),
            display: MockDisplay::default(),
            link: MockLink::default(),
            button: MockButton::default(),
        }
    }
}

impl MockHw {
    pub fn devices(&mut self) -> Devices<'_> {
        Devices {
            store: &mut self.store,
            rtc: &mut self.rtc,
            light: &mut self.light,
            probe: &mut self.probe,
            audio: &mut self.audio,
            ir: &mut self.ir,
            display: &mut self.display,
            link: &mut self.link,
            button: &mut self.button,
        }
    }
}

pub fn ir_code(command: u16) -> IrCode {
    IrCode {
        protocol: 1,
        address: 0x00FF,
        command,
    }
}

/// Tick-side inputs with nothing connected.
pub struct QuietInputs;

impl TickInputs for QuietInputs {
    fn sample_ir(&mut self) {}

    fn sample_broadcast(&mut self) -> bool {
        false
    }
}
