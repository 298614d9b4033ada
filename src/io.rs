//! Board I/O used by the chambers.
//!
//! The analog front end is a single multiplexed ADC. Actuators are driven by a direction pin
//! and a PWM magnitude pin each. Pins are addressed by board identifier so that one driver
//! instance serves all chambers.

use strum::EnumIter;

/// Analog input wired to a chamber thermistor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[repr(usize)]
pub enum SensorInput {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

/// Digital output selecting the actuator direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[repr(usize)]
pub enum DirectionPin {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

/// PWM output setting the actuator magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[repr(usize)]
pub enum MagnitudePin {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

/// Digital output level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Multiplexed analog sampling.
///
/// Consecutive reads of the same input without an intervening read of another input sample the
/// same signal. The first read after switching inputs may not have settled.
pub trait AnalogInput {
    type Error: core::fmt::Debug;

    /// Read one raw 10 bit sample.
    fn read(&mut self, input: SensorInput) -> Result<u16, Self::Error>;
}

/// Actuator outputs.
pub trait ActuatorOutputs {
    type Error: core::fmt::Debug;

    fn set_direction(&mut self, pin: DirectionPin, level: Level) -> Result<(), Self::Error>;

    /// Set the 8 bit duty cycle of a magnitude output. 0 is constantly low, 255 constantly high.
    fn set_magnitude(&mut self, pin: MagnitudePin, duty: u8) -> Result<(), Self::Error>;
}
