//! Fixed-offset layout of the configuration store.
//!
//! ```text
//! 0x000  version      u32 LE
//! 0x004  settings     16 B
//! 0x014  colors       8 × RGBW
//! 0x034  animations   16 × (duration, flags)
//! 0x054  color anims  8 × 2
//! 0x064  ambient      8 × 2
//! 0x074  night        8 × 5 B window rows
//! 0x09C  ambient nt   8 × 5
//! 0x0C4  alarms       8 × 5
//! 0x0EC  hourly       24 × brightness
//! 0x104  time server  32 B, NUL padded
//! 0x124  IR codes     12 × 5 B
//! 0x160  overlays     32 × 40 B
//! ```
//!
//! Record codecs here are pure; range correction happens on load.

use heapless::String;

use crate::app::ports::IrCode;
use crate::app::state::{
    AMBIENT_MODE_SLOTS, ANIMATION_SLOTS, AnimSlot, AnimTable, COLOR_ANIMATION_SLOTS,
    COLOR_SLOTS, HOURS, Rgbw, Settings, TEXT_LEN,
};
use crate::drivers::ir::IR_COMMANDS;
use crate::overlay::{MonthDay, OVERLAY_SLOTS, OVERLAY_TEXT_LEN, Overlay, OverlayKind};
use crate::window::{SilenceWindow, TimeWindow, WINDOW_SLOTS, WindowKind};

/// Bumped whenever the layout changes; a mismatch resets to defaults.
pub const STORE_VERSION: u32 = 0x5743_0003;

pub const STORE_SIZE: usize = 2048;

pub const SETTINGS_LEN: usize = 16;
pub const COLOR_LEN: usize = 4;
pub const ANIM_LEN: usize = 2;
pub const WINDOW_LEN: usize = 5;
pub const IR_LEN: usize = 5;
pub const OVERLAY_LEN: usize = 8 + OVERLAY_TEXT_LEN;

pub const VERSION: u16 = 0;
pub const SETTINGS: u16 = 4;
pub const COLORS: u16 = SETTINGS + SETTINGS_LEN as u16;
pub const ANIMATIONS: u16 = COLORS + (COLOR_SLOTS * COLOR_LEN) as u16;
pub const COLOR_ANIMATIONS: u16 = ANIMATIONS + (ANIMATION_SLOTS * ANIM_LEN) as u16;
pub const AMBIENT_MODES: u16 = COLOR_ANIMATIONS + (COLOR_ANIMATION_SLOTS * ANIM_LEN) as u16;
pub const NIGHT: u16 = AMBIENT_MODES + (AMBIENT_MODE_SLOTS * ANIM_LEN) as u16;
pub const AMBIENT_NIGHT: u16 = NIGHT + (WINDOW_SLOTS * WINDOW_LEN) as u16;
pub const ALARMS: u16 = AMBIENT_NIGHT + (WINDOW_SLOTS * WINDOW_LEN) as u16;
pub const HOURLY: u16 = ALARMS + (WINDOW_SLOTS * WINDOW_LEN) as u16;
pub const TIME_SERVER: u16 = HOURLY + HOURS as u16;
pub const IR_CODES: u16 = TIME_SERVER + TEXT_LEN as u16;
pub const OVERLAYS: u16 = IR_CODES + (IR_COMMANDS * IR_LEN) as u16;
pub const END: u16 = OVERLAYS + (OVERLAY_SLOTS * OVERLAY_LEN) as u16;

const _: () = assert!(END as usize <= STORE_SIZE);

pub const fn color_offset(index: usize) -> u16 {
    COLORS + (index * COLOR_LEN) as u16
}

pub const fn anim_offset(table: AnimTable, index: usize) -> u16 {
    let base = match table {
        AnimTable::Animation => ANIMATIONS,
        AnimTable::ColorAnimation => COLOR_ANIMATIONS,
        AnimTable::AmbientMode => AMBIENT_MODES,
    };
    base + (index * ANIM_LEN) as u16
}

pub const fn window_table_offset(kind: WindowKind) -> u16 {
    match kind {
        WindowKind::Night => NIGHT,
        WindowKind::AmbientNight => AMBIENT_NIGHT,
        WindowKind::Alarm => ALARMS,
    }
}

pub const fn window_offset(kind: WindowKind, slot: usize) -> u16 {
    window_table_offset(kind) + (slot * WINDOW_LEN) as u16
}

pub const fn overlay_offset(index: usize) -> u16 {
    OVERLAYS + (index * OVERLAY_LEN) as u16
}

// ── Settings ──────────────────────────────────────────────────

pub fn encode_settings(s: &Settings) -> [u8; SETTINGS_LEN] {
    let mut b = [0u8; SETTINGS_LEN];
    b[0] = u8::from(s.display_power);
    b[1] = u8::from(s.ambient_power);
    b[2] = s.display_mode;
    b[3] = s.brightness;
    b[4] = u8::from(s.auto_brightness);
    b[5] = s.volume;
    b[6] = u8::from(s.bell);
    b[7] = s.speech_interval;
    b[8..10].copy_from_slice(&s.silence.from.to_le_bytes());
    b[10..12].copy_from_slice(&s.silence.to.to_le_bytes());
    b[12..14].copy_from_slice(&s.net_time_interval.to_le_bytes());
    b[14] = s.ambient_leds;
    b[15] = u8::from(s.broadcast_enabled);
    b
}

pub fn decode_settings(b: &[u8; SETTINGS_LEN]) -> Settings {
    Settings {
        display_power: b[0] != 0,
        ambient_power: b[1] != 0,
        display_mode: b[2],
        brightness: b[3],
        auto_brightness: b[4] != 0,
        volume: b[5],
        bell: b[6] != 0,
        speech_interval: b[7],
        silence: SilenceWindow {
            from: u16::from_le_bytes([b[8], b[9]]),
            to: u16::from_le_bytes([b[10], b[11]]),
        },
        net_time_interval: u16::from_le_bytes([b[12], b[13]]),
        ambient_leds: b[14],
        broadcast_enabled: b[15] != 0,
    }
}

// ── Small records ────────────────────────────────────────────

pub const fn encode_color(c: &Rgbw) -> [u8; COLOR_LEN] {
    [c.red, c.green, c.blue, c.white]
}

pub const fn decode_color(b: &[u8; COLOR_LEN]) -> Rgbw {
    Rgbw {
        red: b[0],
        green: b[1],
        blue: b[2],
        white: b[3],
    }
}

pub const fn encode_anim(a: &AnimSlot) -> [u8; ANIM_LEN] {
    [a.duration, a.flags]
}

pub const fn decode_anim(b: &[u8; ANIM_LEN]) -> AnimSlot {
    AnimSlot {
        duration: b[0],
        flags: b[1],
    }
}

/// `flags (bit0 active, bit1 direction), from, to, minutes LE`.
pub fn encode_window(w: &TimeWindow) -> [u8; WINDOW_LEN] {
    let flags = u8::from(w.active) | u8::from(w.direction) << 1;
    let [lo, hi] = w.minutes.to_le_bytes();
    [flags, w.from, w.to, lo, hi]
}

pub fn decode_window(b: &[u8; WINDOW_LEN]) -> TimeWindow {
    TimeWindow {
        active: b[0] & 0x01 != 0,
        direction: b[0] & 0x02 != 0,
        from: b[1],
        to: b[2],
        minutes: u16::from_le_bytes([b[3], b[4]]),
    }
}

const IR_EMPTY: u8 = 0xFF;

pub fn encode_ir(code: Option<IrCode>) -> [u8; IR_LEN] {
    match code {
        None => [IR_EMPTY; IR_LEN],
        Some(c) => {
            let [a0, a1] = c.address.to_le_bytes();
            let [c0, c1] = c.command.to_le_bytes();
            [c.protocol, a0, a1, c0, c1]
        }
    }
}

pub fn decode_ir(b: &[u8; IR_LEN]) -> Option<IrCode> {
    (b[0] != IR_EMPTY).then(|| IrCode {
        protocol: b[0],
        address: u16::from_le_bytes([b[1], b[2]]),
        command: u16::from_le_bytes([b[3], b[4]]),
    })
}

// ── Text ──────────────────────────────────────────────────────

pub fn encode_text<const N: usize>(s: &str) -> [u8; N] {
    let mut b = [0u8; N];
    let n = s.len().min(N);
    b[..n].copy_from_slice(&s.as_bytes()[..n]);
    b
}

/// NUL-terminated text; invalid UTF-8 decodes as empty.
pub fn decode_text<const N: usize>(b: &[u8]) -> String<N> {
    let end = b.iter().position(|&c| c == 0).unwrap_or(b.len()).min(N);
    core::str::from_utf8(&b[..end])
        .ok()
        .and_then(|s| String::try_from(s).ok())
        .unwrap_or_default()
}

// ── Overlays ──────────────────────────────────────────────────

pub fn encode_overlay(o: &Overlay) -> [u8; OVERLAY_LEN] {
    let mut b = [0u8; OVERLAY_LEN];
    b[0] = o.kind as u8;
    b[1] = o.interval;
    b[2] = o.duration;
    b[3] = o.date_code;
    b[4] = o.date_start.month;
    b[5] = o.date_start.day;
    b[6] = o.days;
    b[7] = u8::from(o.active);
    b[8..].copy_from_slice(&encode_text::<OVERLAY_TEXT_LEN>(&o.text));
    b
}

/// Returns the overlay and whether any field had to be corrected.
pub fn decode_overlay(b: &[u8; OVERLAY_LEN]) -> (Overlay, bool) {
    let mut corrected = false;
    let kind = OverlayKind::from_u8(b[0]).unwrap_or_else(|| {
        corrected = true;
        OverlayKind::Unused
    });
    let mut date_start = MonthDay::new(b[4], b[5]);
    if date_start.month > 12 || date_start.day > 31 {
        date_start = MonthDay::NONE;
        corrected = true;
    }
    let overlay = Overlay {
        kind,
        interval: b[1],
        duration: b[2],
        date_code: b[3],
        date_start,
        date_end: MonthDay::NONE,
        days: b[6],
        text: decode_text(&b[8..]),
        active: b[7] != 0 && kind != OverlayKind::Unused,
    };
    (overlay, corrected)
}
