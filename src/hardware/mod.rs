//! # Board support
//!
//! Hardware specific setup etc.
//!
//! | Function            | Peripheral                                       |
//! |---------------------|--------------------------------------------------|
//! | Thermistor inputs   | ADC1: PA3, PA6, PB0, PB1, PC0, PC4               |
//! | Actuator direction  | PD0, PD1, PD3, PD4, PD5, PD6                     |
//! | Actuator magnitude  | TIM1 CH1-4: PE9, PE11, PE13, PE14; TIM4 CH1-2: PD12, PD13 |
//! | Host serial line    | USART1: PA9 (TX), PA10 (RX)                      |

use core::convert::Infallible;

pub use stm32h7xx_hal as hal;

use crate::io::{ActuatorOutputs, DirectionPin, Level, MagnitudePin};

pub mod adc_internal;
pub mod delay;
pub mod gpio;
pub mod pwm;
pub mod setup;

/// System timer (RTIC Monotonic) tick frequency
pub const MONOTONIC_FREQUENCY: u32 = 1_000;
rtic_monotonics::systick_monotonic!(Systick, MONOTONIC_FREQUENCY);

pub type SerialTx = hal::serial::Tx<hal::stm32::USART1>;
pub type SerialRx = hal::serial::Rx<hal::stm32::USART1>;

/// All actuator outputs: direction GPIOs and magnitude PWMs.
pub struct Outputs {
    pub gpio: gpio::Gpio,
    pub pwm: pwm::Pwm,
}

impl ActuatorOutputs for Outputs {
    type Error = Infallible;

    fn set_direction(&mut self, pin: DirectionPin, level: Level) -> Result<(), Infallible> {
        self.gpio.set_direction(pin, level)
    }

    fn set_magnitude(&mut self, pin: MagnitudePin, duty: u8) -> Result<(), Infallible> {
        self.pwm.set(pin, duty);
        Ok(())
    }
}
