//! In-memory clock state: user settings, tables, overlays and the latest
//! companion/sensor readings.
//!
//! Owned by the main loop.  The protocol dispatcher mutates it, the
//! persistence layer mirrors the persisted parts into the config store.

use heapless::String;

use crate::app::ports::IrCode;
use crate::drivers::ir::IR_COMMANDS;
use crate::overlay::{OVERLAY_SLOTS, Overlay};
use crate::window::{SilenceWindow, WindowKind, WindowTable};

pub const COLOR_SLOTS: usize = 8;
pub const ANIMATION_SLOTS: usize = 16;
pub const COLOR_ANIMATION_SLOTS: usize = 8;
pub const AMBIENT_MODE_SLOTS: usize = 8;
pub const HOURS: usize = 24;
pub const TEXT_LEN: usize = 32;

/// Highest brightness level; 0 is reserved for "off".
pub const MAX_BRIGHTNESS: u8 = 15;

// ── Settings ──────────────────────────────────────────────────

/// Scalar user settings, persisted as one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub display_power: bool,
    pub ambient_power: bool,
    pub display_mode: u8,
    /// 1..=15
    pub brightness: u8,
    pub auto_brightness: bool,
    pub volume: u8,
    /// Hourly chime.
    pub bell: bool,
    /// Speak the time every N minutes; 0 disables.
    pub speech_interval: u8,
    pub silence: SilenceWindow,
    /// Minutes between network time requests; 0 disables.
    pub net_time_interval: u16,
    pub ambient_leds: u8,
    pub broadcast_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_power: true,
            ambient_power: false,
            display_mode: 0,
            brightness: 8,
            auto_brightness: false,
            volume: 15,
            bell: false,
            speech_interval: 0,
            silence: SilenceWindow::default(),
            net_time_interval: 60,
            ambient_leds: 0,
            broadcast_enabled: false,
        }
    }
}

// ── Colors and animation tables ──────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    White,
}

impl ColorChannel {
    pub const ALL: [Self; 4] = [Self::Red, Self::Green, Self::Blue, Self::White];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgbw {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl Rgbw {
    pub const fn channel(&self, ch: ColorChannel) -> u8 {
        match ch {
            ColorChannel::Red => self.red,
            ColorChannel::Green => self.green,
            ColorChannel::Blue => self.blue,
            ColorChannel::White => self.white,
        }
    }

    pub fn set_channel(&mut self, ch: ColorChannel, value: u8) {
        match ch {
            ColorChannel::Red => self.red = value,
            ColorChannel::Green => self.green = value,
            ColorChannel::Blue => self.blue = value,
            ColorChannel::White => self.white = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimParam {
    Duration,
    Flags,
}

impl AnimParam {
    pub const ALL: [Self; 2] = [Self::Duration, Self::Flags];
}

/// Parameters of one animation, color animation or ambient mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimSlot {
    pub duration: u8,
    pub flags: u8,
}

impl AnimSlot {
    pub const fn get(&self, p: AnimParam) -> u8 {
        match p {
            AnimParam::Duration => self.duration,
            AnimParam::Flags => self.flags,
        }
    }

    pub fn set(&mut self, p: AnimParam, value: u8) {
        match p {
            AnimParam::Duration => self.duration = value,
            AnimParam::Flags => self.flags = value,
        }
    }
}

/// The three animation-parameter tables share one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimTable {
    Animation,
    ColorAnimation,
    AmbientMode,
}

impl AnimTable {
    pub const ALL: [Self; 3] = [Self::Animation, Self::ColorAnimation, Self::AmbientMode];
}

// ── Windows ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Windows {
    pub night: WindowTable,
    pub ambient_night: WindowTable,
    pub alarms: WindowTable,
}

impl Windows {
    pub const fn table(&self, kind: WindowKind) -> &WindowTable {
        match kind {
            WindowKind::Night => &self.night,
            WindowKind::AmbientNight => &self.ambient_night,
            WindowKind::Alarm => &self.alarms,
        }
    }

    pub fn table_mut(&mut self, kind: WindowKind) -> &mut WindowTable {
        match kind {
            WindowKind::Night => &mut self.night,
            WindowKind::AmbientNight => &mut self.ambient_night,
            WindowKind::Alarm => &mut self.alarms,
        }
    }
}

// ── Companion and readings ───────────────────────────────────

/// What the companion processor has told us about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Companion {
    /// Set by any valid inbound line, cleared on an acknowledgement timeout.
    pub up: bool,
    pub version: String<TEXT_LEN>,
    pub ip: String<TEXT_LEN>,
    pub hostname: String<TEXT_LEN>,
}

impl Companion {
    /// Online once it has reported a network address.
    pub fn is_online(&self) -> bool {
        self.up && !self.ip.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readings {
    /// Probe value in tenths of a degree.
    pub temperature: u16,
    pub rtc_temperature: u16,
}

// ── ClockState ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState {
    pub settings: Settings,
    pub colors: [Rgbw; COLOR_SLOTS],
    pub animations: [AnimSlot; ANIMATION_SLOTS],
    pub color_animations: [AnimSlot; COLOR_ANIMATION_SLOTS],
    pub ambient_modes: [AnimSlot; AMBIENT_MODE_SLOTS],
    pub windows: Windows,
    /// Per-hour brightness applied on the hour when auto brightness is off;
    /// 0 leaves the current level.
    pub hourly_brightness: [u8; HOURS],
    pub time_server: String<TEXT_LEN>,
    pub ir_codes: [Option<IrCode>; IR_COMMANDS],
    pub overlays: [Overlay; OVERLAY_SLOTS],
    pub companion: Companion,
    pub readings: Readings,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            colors: [Rgbw::default(); COLOR_SLOTS],
            animations: [AnimSlot::default(); ANIMATION_SLOTS],
            color_animations: [AnimSlot::default(); COLOR_ANIMATION_SLOTS],
            ambient_modes: [AnimSlot::default(); AMBIENT_MODE_SLOTS],
            windows: Windows::default(),
            hourly_brightness: [0; HOURS],
            time_server: String::new(),
            ir_codes: [None; IR_COMMANDS],
            overlays: core::array::from_fn(|_| Overlay::default()),
            companion: Companion::default(),
            readings: Readings::default(),
        }
    }
}

impl ClockState {
    pub fn anim_table(&self, table: AnimTable) -> &[AnimSlot] {
        match table {
            AnimTable::Animation => &self.animations,
            AnimTable::ColorAnimation => &self.color_animations,
            AnimTable::AmbientMode => &self.ambient_modes,
        }
    }

    pub fn anim_table_mut(&mut self, table: AnimTable) -> &mut [AnimSlot] {
        match table {
            AnimTable::Animation => &mut self.animations,
            AnimTable::ColorAnimation => &mut self.color_animations,
            AnimTable::AmbientMode => &mut self.ambient_modes,
        }
    }
}

/// Replace a fixed-capacity string, truncating `value` at the last char
/// boundary that fits. Returns `false` when it had to truncate.
pub fn set_text<const N: usize>(dst: &mut String<N>, value: &str) -> bool {
    let mut end = value.len().min(N);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    dst.clear();
    // `end <= N`, so this cannot fail.
    let _ = dst.push_str(&value[..end]);
    end == value.len()
}
