//! Software frequency dividers for the tick handler.

/// Counts calls to [`tick`](Self::tick) and fires once every `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicDivider {
    threshold: u32,
    counter: u32,
}

impl PeriodicDivider {
    /// A divider firing every `threshold` ticks. A threshold of 0 behaves as 1.
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold: if threshold == 0 { 1 } else { threshold },
            counter: 0,
        }
    }

    /// Divider producing `rate_hz` from a `base_hz` tick.
    ///
    /// Integer division: 10 kHz / 64 Hz gives 156 ticks (≈ 64.1 Hz).
    pub const fn for_rate(base_hz: u32, rate_hz: u32) -> Self {
        if rate_hz == 0 {
            return Self::new(base_hz);
        }
        Self::new(base_hz / rate_hz)
    }

    /// Advance by one tick; `true` when the period completes.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.threshold {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Restart the current period.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Change the period, restarting it.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
        self.counter = 0;
    }

    pub const fn threshold(&self) -> u32 {
        self.threshold
    }
}
