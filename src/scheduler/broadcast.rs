//! Time-broadcast (DCF77-style) receiver: pulse sampler and frame decoder.
//!
//! The sampler runs inside the tick handler at 100 Hz and only classifies
//! pulse widths; the heavier BCD/parity decoding happens in the main loop
//! when the frame signal is raised.
//!
//! ```text
//!  carrier ▔▔▁▁▔▔▔▔▔▔▔▔▔▁▁▁▁▔▔▔▔▔▔ … ▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▁▁
//!          └─┘ 100 ms = 0 └──┘ 200 ms = 1     no pulse ≈ minute mark
//! ```

use super::calendar::{ClockTime, days_in_month};

/// Bits in a complete frame (second 0..=58).
pub const FRAME_BITS: u8 = 59;

// Widths in 10 ms samples.
const ZERO_MIN: u16 = 7;
const ZERO_MAX: u16 = 13;
const ONE_MIN: u16 = 16;
const ONE_MAX: u16 = 24;
/// Carrier gap long enough to be the missing 59th pulse.
const MINUTE_MARK_GAP: u16 = 150;

/// Interrupt-side pulse classifier.
#[derive(Debug, Default)]
pub struct BroadcastSampler {
    pulse_len: u16,
    gap_len: u16,
    bits: u64,
    bit_count: u8,
    in_pulse: bool,
}

impl BroadcastSampler {
    pub const fn new() -> Self {
        Self {
            pulse_len: 0,
            gap_len: 0,
            bits: 0,
            bit_count: 0,
            in_pulse: false,
        }
    }

    /// Feed one 10 ms sample (`true` = pulse active).
    ///
    /// Returns the 59-bit frame when the minute mark closes a complete one.
    pub fn sample(&mut self, level: bool) -> Option<u64> {
        match (self.in_pulse, level) {
            (false, true) => {
                let frame = if self.gap_len >= MINUTE_MARK_GAP {
                    self.take_frame()
                } else {
                    None
                };
                self.in_pulse = true;
                self.pulse_len = 1;
                self.gap_len = 0;
                frame
            }
            (true, true) => {
                self.pulse_len = self.pulse_len.saturating_add(1);
                None
            }
            (true, false) => {
                self.in_pulse = false;
                self.gap_len = 1;
                self.classify_pulse();
                None
            }
            (false, false) => {
                self.gap_len = self.gap_len.saturating_add(1);
                None
            }
        }
    }

    fn classify_pulse(&mut self) {
        let bit = match self.pulse_len {
            ZERO_MIN..=ZERO_MAX => false,
            ONE_MIN..=ONE_MAX => true,
            _ => {
                // Glitch: the frame can no longer be trusted.
                self.bits = 0;
                self.bit_count = 0;
                return;
            }
        };
        if self.bit_count < FRAME_BITS {
            if bit {
                self.bits |= 1 << self.bit_count;
            }
            self.bit_count += 1;
        } else {
            // More than 59 pulses without a minute mark.
            self.bits = 0;
            self.bit_count = 0;
        }
    }

    fn take_frame(&mut self) -> Option<u64> {
        let complete = self.bit_count == FRAME_BITS;
        let bits = self.bits;
        self.bits = 0;
        self.bit_count = 0;
        complete.then_some(bits)
    }
}

fn field(bits: u64, start: u8, len: u8) -> u8 {
    ((bits >> start) & ((1u64 << len) - 1)) as u8
}

fn even_parity(bits: u64, start: u8, len: u8) -> bool {
    ((bits >> start) & ((1u64 << len) - 1)).count_ones() % 2 == 0
}

fn bcd(raw: u8) -> Option<u8> {
    let (tens, ones) = (raw >> 4, raw & 0x0F);
    (ones <= 9).then_some(tens * 10 + ones)
}

/// Decode a 59-bit frame into the time at the start of the following minute.
///
/// Rejects frames with a missing start-of-time bit, failed parity or
/// out-of-range BCD fields.
pub fn decode_frame(bits: u64) -> Option<ClockTime> {
    if bits & (1 << 20) == 0 {
        return None;
    }
    // Parity bits are included in each range, so each span must be even.
    if !even_parity(bits, 21, 8) || !even_parity(bits, 29, 7) || !even_parity(bits, 36, 23) {
        return None;
    }

    let minute = bcd(field(bits, 21, 7))?;
    let hour = bcd(field(bits, 29, 6))?;
    let day = bcd(field(bits, 36, 6))?;
    let weekday = field(bits, 42, 3);
    let month = bcd(field(bits, 45, 5))?;
    let year = 2000 + u16::from(bcd(field(bits, 50, 8))?);

    if minute > 59 || hour > 23 || !(1..=7).contains(&weekday) || !(1..=12).contains(&month) {
        return None;
    }
    if day == 0 || day > days_in_month(year, month) {
        return None;
    }

    Some(ClockTime {
        year,
        month,
        day,
        // Broadcast weekdays run 1 = Monday .. 7 = Sunday.
        weekday: weekday % 7,
        hour,
        minute,
        second: 0,
    })
}

/// Encode `t` as a frame; the inverse of [`decode_frame`], used by tests
/// and the simulator's broadcast source.
pub fn encode_frame(t: &ClockTime) -> u64 {
    fn to_bcd(v: u8) -> u64 {
        u64::from((v / 10) << 4 | (v % 10))
    }
    fn with_parity(bits: u64, start: u8, len: u8) -> u64 {
        let ones = ((bits >> start) & ((1u64 << len) - 1)).count_ones();
        if ones % 2 == 1 { bits | 1 << (start + len) } else { bits }
    }

    let weekday = if t.weekday == 0 { 7 } else { t.weekday };
    let mut bits: u64 = 1 << 20;
    bits |= to_bcd(t.minute) << 21;
    bits = with_parity(bits, 21, 7);
    bits |= to_bcd(t.hour) << 29;
    bits = with_parity(bits, 29, 6);
    bits |= to_bcd(t.day) << 36;
    bits |= u64::from(weekday) << 42;
    bits |= to_bcd(t.month) << 45;
    bits |= to_bcd((t.year % 100) as u8) << 50;
    with_parity(bits, 36, 22)
}
