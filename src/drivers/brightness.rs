//! Ambient light filtering for automatic brightness.
//!
//! Raw 12-bit light readings are smoothed with an exponential moving
//! average (`avg += (sample - avg) >> shift`) and mapped linearly onto the
//! display levels 1..=15.

use crate::app::state::MAX_BRIGHTNESS;

/// Full scale of the light sensor.
pub const LIGHT_FULL_SCALE: u16 = 4095;

#[derive(Debug)]
pub struct BrightnessFilter {
    shift: u8,
    avg: Option<i32>,
}

impl BrightnessFilter {
    pub const fn new(shift: u8) -> Self {
        Self { shift, avg: None }
    }

    /// Feed one raw reading; returns the filtered brightness level.
    pub fn update(&mut self, raw: u16) -> u8 {
        let sample = i32::from(raw.min(LIGHT_FULL_SCALE));
        let avg = match self.avg {
            // First sample seeds the average.
            None => sample,
            Some(avg) => avg + ((sample - avg) >> self.shift),
        };
        self.avg = Some(avg);
        level_for(avg as u16)
    }

    pub fn reset(&mut self) {
        self.avg = None;
    }
}

/// Map a light reading onto 1..=15.
pub const fn level_for(light: u16) -> u8 {
    let span = (MAX_BRIGHTNESS - 1) as u32;
    let light = if light > LIGHT_FULL_SCALE { LIGHT_FULL_SCALE } else { light };
    1 + (light as u32 * span / LIGHT_FULL_SCALE as u32) as u8
}
