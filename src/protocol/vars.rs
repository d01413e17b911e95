//! Variable tables addressed by `N`, `n` and `S` lines.
//!
//! Each row binds an index to a getter, an optional setter, the record it
//! persists to and the side effect the main loop has to perform.  The
//! dispatcher, the bulk send and the load-time range check all walk these
//! tables instead of switching on ids.

use super::Action;
use crate::app::state::{ClockState, HOURS, MAX_BRIGHTNESS, set_text};
use crate::scheduler::calendar::MINUTES_PER_DAY;
use crate::store::Persist;

pub const MAX_DISPLAY_MODE: u16 = 15;
pub const MAX_VOLUME: u16 = 30;
pub const MAX_SPEECH_INTERVAL: u16 = 60;
pub const MAX_AMBIENT_LEDS: u16 = 60;

/// A scalar variable (`N` lines).
pub struct NumericVar {
    pub id: u8,
    pub name: &'static str,
    pub min: u16,
    pub max: u16,
    pub get: fn(&ClockState) -> u16,
    /// `None` for read-only values.
    pub set: Option<fn(&mut ClockState, u16)>,
    pub persist: Option<Persist>,
    pub effect: Option<Action>,
}

impl NumericVar {
    pub fn clamp(&self, value: u16) -> u16 {
        value.clamp(self.min, self.max)
    }
}

const fn flag(v: bool) -> u16 {
    v as u16
}

const SETTINGS: Option<Persist> = Some(Persist::Settings);

#[rustfmt::skip]
pub static NUMERIC_VARS: [NumericVar; 15] = [
    NumericVar { id: 0, name: "display_power", min: 0, max: 1,
        get: |s| flag(s.settings.display_power), set: Some(|s, v| s.settings.display_power = v != 0),
        persist: SETTINGS, effect: Some(Action::DisplayPower) },
    NumericVar { id: 1, name: "ambient_power", min: 0, max: 1,
        get: |s| flag(s.settings.ambient_power), set: Some(|s, v| s.settings.ambient_power = v != 0),
        persist: SETTINGS, effect: Some(Action::AmbientPower) },
    NumericVar { id: 2, name: "display_mode", min: 0, max: MAX_DISPLAY_MODE,
        get: |s| u16::from(s.settings.display_mode), set: Some(|s, v| s.settings.display_mode = v as u8),
        persist: SETTINGS, effect: Some(Action::Redraw) },
    NumericVar { id: 3, name: "brightness", min: 1, max: MAX_BRIGHTNESS as u16,
        get: |s| u16::from(s.settings.brightness), set: Some(|s, v| s.settings.brightness = v as u8),
        persist: SETTINGS, effect: Some(Action::Brightness) },
    NumericVar { id: 4, name: "auto_brightness", min: 0, max: 1,
        get: |s| flag(s.settings.auto_brightness), set: Some(|s, v| s.settings.auto_brightness = v != 0),
        persist: SETTINGS, effect: Some(Action::Brightness) },
    NumericVar { id: 5, name: "volume", min: 0, max: MAX_VOLUME,
        get: |s| u16::from(s.settings.volume), set: Some(|s, v| s.settings.volume = v as u8),
        persist: SETTINGS, effect: Some(Action::Volume) },
    NumericVar { id: 6, name: "bell", min: 0, max: 1,
        get: |s| flag(s.settings.bell), set: Some(|s, v| s.settings.bell = v != 0),
        persist: SETTINGS, effect: None },
    NumericVar { id: 7, name: "speech_interval", min: 0, max: MAX_SPEECH_INTERVAL,
        get: |s| u16::from(s.settings.speech_interval), set: Some(|s, v| s.settings.speech_interval = v as u8),
        persist: SETTINGS, effect: None },
    NumericVar { id: 8, name: "silence_from", min: 0, max: MINUTES_PER_DAY - 1,
        get: |s| s.settings.silence.from, set: Some(|s, v| s.settings.silence.from = v),
        persist: SETTINGS, effect: None },
    NumericVar { id: 9, name: "silence_to", min: 0, max: MINUTES_PER_DAY - 1,
        get: |s| s.settings.silence.to, set: Some(|s, v| s.settings.silence.to = v),
        persist: SETTINGS, effect: None },
    NumericVar { id: 10, name: "net_time_interval", min: 0, max: MINUTES_PER_DAY,
        get: |s| s.settings.net_time_interval, set: Some(|s, v| s.settings.net_time_interval = v),
        persist: SETTINGS, effect: None },
    NumericVar { id: 11, name: "ambient_leds", min: 0, max: MAX_AMBIENT_LEDS,
        get: |s| u16::from(s.settings.ambient_leds), set: Some(|s, v| s.settings.ambient_leds = v as u8),
        persist: SETTINGS, effect: Some(Action::SchedulerSync) },
    NumericVar { id: 12, name: "broadcast_enabled", min: 0, max: 1,
        get: |s| flag(s.settings.broadcast_enabled), set: Some(|s, v| s.settings.broadcast_enabled = v != 0),
        persist: SETTINGS, effect: Some(Action::SchedulerSync) },
    NumericVar { id: 13, name: "temperature", min: 0, max: u16::MAX,
        get: |s| s.readings.temperature, set: None, persist: None, effect: None },
    NumericVar { id: 14, name: "rtc_temperature", min: 0, max: u16::MAX,
        get: |s| s.readings.rtc_temperature, set: None, persist: None, effect: None },
];

pub const TEMPERATURE_ID: u8 = 13;
pub const RTC_TEMPERATURE_ID: u8 = 14;

pub fn numeric_var(id: u8) -> Option<&'static NumericVar> {
    NUMERIC_VARS.iter().find(|v| v.id == id)
}

/// Clamp every writable scalar into range. Returns `true` if any changed.
pub fn clamp_numeric(state: &mut ClockState) -> bool {
    let mut changed = false;
    for var in &NUMERIC_VARS {
        let Some(set) = var.set else { continue };
        let v = (var.get)(state);
        let clamped = var.clamp(v);
        if clamped != v {
            set(state, clamped);
            changed = true;
        }
    }
    changed
}

/// A byte-array variable (`n` lines).
pub struct ArrayVar {
    pub id: u8,
    pub len: usize,
    pub max: u8,
    pub get: fn(&ClockState, usize) -> u8,
    pub set: fn(&mut ClockState, usize, u8),
    pub persist: Persist,
}

pub static ARRAY_VARS: [ArrayVar; 1] = [ArrayVar {
    id: 0,
    len: HOURS,
    max: MAX_BRIGHTNESS,
    get: |s, i| s.hourly_brightness[i],
    set: |s, i, v| s.hourly_brightness[i] = v,
    persist: Persist::HourlyBrightness,
}];

pub fn array_var(id: u8) -> Option<&'static ArrayVar> {
    ARRAY_VARS.iter().find(|v| v.id == id)
}

/// A text variable (`S` lines).
pub struct TextVar {
    pub id: u8,
    pub get: fn(&ClockState) -> &str,
    /// Returns `false` when the value was truncated to fit.
    pub set: fn(&mut ClockState, &str) -> bool,
    pub persist: Option<Persist>,
}

pub const COMPANION_VERSION_ID: u8 = 0;
pub const IP_ADDRESS_ID: u8 = 1;
pub const TIME_SERVER_ID: u8 = 2;
pub const HOSTNAME_ID: u8 = 3;

#[rustfmt::skip]
pub static TEXT_VARS: [TextVar; 4] = [
    TextVar { id: COMPANION_VERSION_ID, get: |s| s.companion.version.as_str(),
        set: |s, v| set_text(&mut s.companion.version, v), persist: None },
    TextVar { id: IP_ADDRESS_ID, get: |s| s.companion.ip.as_str(),
        set: |s, v| set_text(&mut s.companion.ip, v), persist: None },
    TextVar { id: TIME_SERVER_ID, get: |s| s.time_server.as_str(),
        set: |s, v| set_text(&mut s.time_server, v), persist: Some(Persist::TimeServer) },
    TextVar { id: HOSTNAME_ID, get: |s| s.companion.hostname.as_str(),
        set: |s, v| set_text(&mut s.companion.hostname, v), persist: None },
];

pub fn text_var(id: u8) -> Option<&'static TextVar> {
    TEXT_VARS.iter().find(|v| v.id == id)
}
