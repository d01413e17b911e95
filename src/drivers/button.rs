//! Polled button debouncer with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch, sampled through [`ButtonPort`] once per
//! main-loop iteration.  No interrupt is involved; the loop runs far
//! faster than the debounce time.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                         | Event        | Loop action         |
//! |-------------|-----------------------------------|--------------|---------------------|
//! | Short press | Stable press released before hold | `ShortPress` | toggle display      |
//! | Long press  | Held >= `long_press_ms`           | `LongPress`  | start IR learning   |
//!
//! A long press fires while still held; the following release is swallowed.
//!
//! [`ButtonPort`]: crate::app::ports::ButtonPort

use crate::config::ClockConfig;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    /// Long press already reported; waiting for release.
    Held,
}

#[derive(Debug)]
pub struct Debouncer {
    debounce_ms: u32,
    long_press_ms: u32,
    state: PressState,
}

impl Debouncer {
    pub const fn new(debounce_ms: u32, long_press_ms: u32) -> Self {
        Self {
            debounce_ms,
            long_press_ms,
            state: PressState::Idle,
        }
    }

    pub const fn from_config(cfg: &ClockConfig) -> Self {
        Self::new(cfg.debounce_ms, cfg.long_press_ms)
    }

    /// Feed the raw level. `now_ms` is the monotonic uptime.
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEvent> {
        match self.state {
            PressState::Idle => {
                if pressed {
                    self.state = PressState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            PressState::DebounceWait { since_ms } => {
                if !pressed {
                    // Bounce shorter than the debounce time.
                    self.state = PressState::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                    self.state = PressState::Pressed { since_ms };
                }
                None
            }

            PressState::Pressed { since_ms } => {
                if !pressed {
                    self.state = PressState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if now_ms.wrapping_sub(since_ms) >= self.long_press_ms {
                    self.state = PressState::Held;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            PressState::Held => {
                if !pressed {
                    self.state = PressState::Idle;
                }
                None
            }
        }
    }
}
