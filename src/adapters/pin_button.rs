//! Button on an active-low GPIO input.

use embedded_hal::digital::InputPin;

use crate::app::ports::ButtonPort;

pub struct PinButton<P> {
    pin: P,
}

impl<P: InputPin> PinButton<P> {
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> ButtonPort for PinButton<P> {
    fn is_pressed(&mut self) -> bool {
        // A read error counts as released.
        self.pin.is_low().unwrap_or(false)
    }
}
