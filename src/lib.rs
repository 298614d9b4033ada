#![no_std]

#[cfg(test)]
extern crate std;

#[cfg(target_os = "none")]
pub mod hardware;

pub mod actuator;
pub mod bank;
pub mod cadence;
pub mod chamber;
pub mod command;
pub mod convert;
pub mod io;
pub mod settings;
pub mod telemetry;

use core::ops::RangeInclusive;

/// Number of chambers on the controller.
pub const CHAMBER_COUNT: usize = 6;

/// Accepted setpoint range in °C.
pub const SETPOINT_RANGE: RangeInclusive<f32> = 0.0..=55.0;

/// Commanded power bound. Positive heats, negative cools.
pub const POWER_LIMIT: f32 = 255.0;

/// Chamber index in physical layout order.
///
/// ```text
/// 0 1 2 fan
/// 3 4 5 fan
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum::EnumIter,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum ChamberIdx {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl ChamberIdx {
    pub const ALL: [Self; CHAMBER_COUNT] = [
        Self::Zero,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
    ];
}

impl TryFrom<usize> for ChamberIdx {
    type Error = num_enum::TryFromPrimitiveError<ChamberIdx>;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        // Anything past u8 is out of range as well.
        Self::try_from(u8::try_from(idx).unwrap_or(u8::MAX))
    }
}
