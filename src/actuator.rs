//! # Actuator driver
//!
//! The thermoelectric actuators sit on a full bridge controlled by a direction pin and a PWM
//! magnitude pin. A single signed power value in [-255, 255] encodes both.
//!
//! The bridge responds oppositely in the two directions: heating duty is proportional to power,
//! cooling duty is `power + 255`, so full cooling (-255) is a constantly low magnitude pin and
//! the weakest cooling is close to 255.

use fugit::HertzU32;
use serde::{Deserialize, Serialize};

use crate::io::{ActuatorOutputs, DirectionPin, Level, MagnitudePin};
use crate::POWER_LIMIT;

/// Clamp a commanded power into [-255, 255]. NaN is passed through and drives nothing.
pub fn clamp_power(power: f32) -> f32 {
    power.clamp(-POWER_LIMIT, POWER_LIMIT)
}

/// Pin state for one actuator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Drive {
    /// Both pins low.
    Off,
    /// Direction low, magnitude is the duty cycle.
    Heat(u8),
    /// Direction high, magnitude is the (inverted) duty cycle.
    Cool(u8),
}

impl Drive {
    /// Map a commanded power to pin states. The power is clamped first.
    pub fn from_power(power: f32) -> Self {
        let power = clamp_power(power);
        if power > 0.0 {
            Self::Heat(power as u8)
        } else if power < 0.0 {
            Self::Cool((power + POWER_LIMIT) as u8)
        } else {
            Self::Off
        }
    }

    pub fn direction(&self) -> Level {
        match self {
            Self::Off | Self::Heat(_) => Level::Low,
            Self::Cool(_) => Level::High,
        }
    }

    pub fn magnitude(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat(duty) | Self::Cool(duty) => *duty,
        }
    }

    /// Write the pin states to one actuator.
    pub fn apply<O: ActuatorOutputs>(
        &self,
        outputs: &mut O,
        direction: DirectionPin,
        magnitude: MagnitudePin,
    ) -> Result<(), O::Error> {
        outputs.set_direction(direction, self.direction())?;
        outputs.set_magnitude(magnitude, self.magnitude())
    }
}

/// Drive one actuator from a commanded power.
pub fn drive<O: ActuatorOutputs>(
    power: f32,
    outputs: &mut O,
    direction: DirectionPin,
    magnitude: MagnitudePin,
) -> Result<(), O::Error> {
    Drive::from_power(power).apply(outputs, direction, magnitude)
}

/// Magnitude PWM clock divisor.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u16)]
pub enum PwmDivisor {
    One = 1,
    Eight = 8,
    ThirtyTwo = 32,
    SixtyFour = 64,
    OneTwentyEight = 128,
    TwoFiftySix = 256,
    OneThousandTwentyFour = 1024,
}

impl PwmDivisor {
    /// Undivided PWM frequency.
    pub const BASE_HZ: u32 = 31_250;

    /// PWM frequency for this divisor.
    pub fn frequency(self) -> HertzU32 {
        HertzU32::from_raw(Self::BASE_HZ / u16::from(self) as u32)
    }
}

impl Default for PwmDivisor {
    fn default() -> Self {
        Self::Eight
    }
}
