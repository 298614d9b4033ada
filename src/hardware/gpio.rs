use core::convert::Infallible;

use strum::IntoEnumIterator;

use embedded_hal::digital::v2::{OutputPin, PinState};

use super::hal::gpio::{ErasedPin, Output, PushPull};

use crate::io::{DirectionPin, Level};

impl From<Level> for PinState {
    fn from(other: Level) -> PinState {
        match other {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

pub struct GpioPins {
    /// Actuator bridge direction, indexed by [DirectionPin].
    pub direction: [ErasedPin<Output<PushPull>>; 6],
}

/// GPIO pins.
pub struct Gpio {
    pins: GpioPins,
}

impl Gpio {
    /// Construct the GPIO driver with all direction pins low.
    pub fn new(pins: GpioPins) -> Self {
        let mut gpio = Gpio { pins };
        for pin in DirectionPin::iter() {
            gpio.set_direction(pin, Level::Low).ok();
        }
        gpio
    }

    pub fn set_direction(&mut self, pin: DirectionPin, level: Level) -> Result<(), Infallible> {
        OutputPin::set_state(&mut self.pins.direction[pin as usize], level.into())
    }
}
