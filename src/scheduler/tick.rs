//! The tick handler.
//!
//! [`TickSource::on_tick`] is the body of the single periodic interrupt.
//! It only advances counters, samples the IR and broadcast inputs and
//! raises signals; it never blocks and performs no other I/O.

use super::SchedulerState;
use super::broadcast::BroadcastSampler;
use super::calendar::{ClockTime, advance_calendar};
use super::divider::PeriodicDivider;
use crate::signals::{Counter, Signal};

/// Inputs sampled from interrupt context.
pub trait TickInputs {
    /// Give the IR decoder one sample slot (decoding is external).
    fn sample_ir(&mut self);

    /// Level of the time-broadcast receiver (`true` = pulse).
    fn sample_broadcast(&mut self) -> bool;
}

/// Second-of-minute marks raised once per minute by the 1 Hz path.
const MARKS: [(u8, Signal); 5] = [
    (30, Signal::HalfMinute),
    (45, Signal::ClockResync),
    (49, Signal::RtcTemperature),
    (50, Signal::TemperatureStart),
    (51, Signal::TemperatureRead),
];

const UNSET_STAMP: u32 = u32::MAX;

fn minute_stamp(t: &ClockTime) -> u32 {
    (u32::from(t.month) * 32 + u32::from(t.day)) * 1440 + u32::from(t.minute_of_day())
}

/// Interrupt-owned scheduler state: dividers, minute marks, samplers.
pub struct TickSource {
    base_hz: u32,
    quarter: PeriodicDivider,
    animation: PeriodicDivider,
    centi: PeriodicDivider,
    milli: PeriodicDivider,
    second: PeriodicDivider,
    ambient: PeriodicDivider,
    ambient_leds: u8,
    /// Bit n set when `MARKS[n]` already fired this minute.
    marks_fired: u8,
    minute_stamp: u32,
    broadcast: BroadcastSampler,
}

impl TickSource {
    pub const fn new(base_hz: u32) -> Self {
        Self {
            base_hz,
            quarter: PeriodicDivider::for_rate(base_hz, 4),
            animation: PeriodicDivider::for_rate(base_hz, 64),
            centi: PeriodicDivider::for_rate(base_hz, 100),
            milli: PeriodicDivider::for_rate(base_hz, 1000),
            second: PeriodicDivider::for_rate(base_hz, 1),
            ambient: PeriodicDivider::new(0),
            ambient_leds: 0,
            marks_fired: 0,
            minute_stamp: UNSET_STAMP,
            broadcast: BroadcastSampler::new(),
        }
    }

    pub const fn base_hz(&self) -> u32 {
        self.base_hz
    }

    /// Interrupt body, called at `base_hz`.
    pub fn on_tick(&mut self, state: &SchedulerState, inputs: &mut impl TickInputs) {
        inputs.sample_ir();

        if self.quarter.tick() {
            state.signals.raise(Signal::SensorSample);
        }
        if self.animation.tick() {
            state.signals.raise(Signal::Animation);
        }
        if self.centi.tick() {
            state.signals.raise(Signal::LinkTick);
            if state.broadcast_enabled() {
                let level = inputs.sample_broadcast();
                if let Some(bits) = self.broadcast.sample(level) {
                    state.publish_broadcast_frame(bits);
                    state.signals.raise(Signal::BroadcastFrame);
                }
            }
        }
        if self.milli.tick() {
            state.signals.bump(Counter::StoreTick);
            state.advance_uptime();
        }

        self.tick_ambient(state);

        if self.second.tick() {
            self.on_second(state);
        }
    }

    /// 1 Hz path: calendar advance and second-of-minute marks.
    fn on_second(&mut self, state: &SchedulerState) {
        let now = state.update_time(advance_calendar);

        // A new minute (natural rollover or the loop setting the clock into
        // another minute) re-arms the marks and is signalled even when the
        // set landed on :00 and the handler first sees :01. A time set back
        // within the same minute keeps the marks, so each fires at most once
        // per minute. The first second after start only records the stamp.
        let stamp = minute_stamp(&now);
        if stamp != self.minute_stamp {
            let started = self.minute_stamp != UNSET_STAMP;
            self.minute_stamp = stamp;
            self.marks_fired = 0;
            if started || now.second == 0 {
                self.resync_ambient(state);
                state.signals.raise(Signal::Minute);
            }
        }

        for (i, (second, signal)) in MARKS.iter().enumerate() {
            let bit = 1u8 << i;
            if now.second == *second && self.marks_fired & bit == 0 {
                self.marks_fired |= bit;
                state.signals.raise(*signal);
            }
        }
    }

    /// Spread `ambient_leds` steps evenly over one minute.
    fn tick_ambient(&mut self, state: &SchedulerState) {
        let leds = state.ambient_leds();
        if leds != self.ambient_leds {
            self.ambient_leds = leds;
            self.resync_ambient(state);
        }
        if leds == 0 {
            return;
        }
        if self.ambient.tick() {
            let next = state.ambient_position().saturating_add(1);
            if next < leds {
                state.set_ambient_position(next);
                state.signals.raise(Signal::AmbientStep);
            }
        }
    }

    /// Restart the sweep at position 0 with a freshly computed wait count,
    /// bounding the rounding drift of the integer division to one minute.
    fn resync_ambient(&mut self, state: &SchedulerState) {
        if self.ambient_leds == 0 {
            return;
        }
        let wait_cycles = self.base_hz.saturating_mul(60) / u32::from(self.ambient_leds);
        self.ambient.set_threshold(wait_cycles);
        state.set_ambient_position(0);
        state.signals.raise(Signal::AmbientStep);
    }
}
