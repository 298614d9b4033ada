//! # Thermistor linearization
//!
//! Each chamber senses its temperature with an NTC thermistor on the low side of a divider
//! against a fixed pullup. The ADC samples the divider tap.

use num_traits::float::Float;
use serde::{Deserialize, Serialize};

const ZERO_C: f32 = 273.15; // 0°C in °K

/// ADC full scale (exclusive) for the 10 bit converter.
pub const FULL_SCALE: f32 = 1024.0;

/// log2 of the number of consecutive samples averaged into one reading.
pub const OVERSAMPLING_SHIFT: u32 = 3;

/// Number of consecutive samples averaged into one reading.
pub const OVERSAMPLING: u32 = 1 << OVERSAMPLING_SHIFT;

/// A type representing an (averaged) ADC sample of a thermistor divider tap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdcCode(u16);

impl AdcCode {
    /// Mean of [OVERSAMPLING] raw samples given their sum. The remainder is truncated.
    pub fn from_sum(sum: u32) -> Self {
        Self((sum >> OVERSAMPLING_SHIFT) as u16)
    }
}

impl From<u16> for AdcCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<AdcCode> for u16 {
    fn from(code: AdcCode) -> u16 {
        code.0
    }
}

/// Steinhart-Hart style fit, 3 terms: `1/T = a + b ln(R) + c ln(R)^3`
/// with `R` relative to the nominal resistance at 25 °C.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thermistor {
    /// Divider pullup resistance (Ω)
    pub pullup: f32,
    /// Thermistor resistance at 25 °C (Ω)
    pub r25: f32,
    /// Constant term (1/K)
    pub a: f32,
    /// Linear term (1/K)
    pub b: f32,
    /// Cubic term (1/K)
    pub c: f32,
}

impl Thermistor {
    pub fn new(pullup: f32, r25: f32, a: f32, b: f32, c: f32) -> Self {
        Self {
            pullup,
            r25,
            a,
            b,
            c,
        }
    }

    /// Thermistor resistance relative to `r25` for a divider tap code.
    ///
    /// Codes of 0 and full scale are outside the divider's range and give 0 and infinity
    /// respectively. Codes above full scale give a negative ratio.
    pub fn relative_resistance(&self, code: AdcCode) -> f32 {
        self.pullup / (FULL_SCALE / u16::from(code) as f32 - 1.0) / self.r25
    }

    /// Temperature in °C for a resistance relative to `r25`.
    pub fn temperature(&self, relative_resistance: f32) -> f32 {
        let log_r = relative_resistance.ln();
        (self.a + self.b * log_r + self.c * log_r * log_r * log_r).recip() - ZERO_C
    }

    /// Convert an averaged divider tap code to °C.
    ///
    /// No plausibility check is done: a shorted sensor (code 0) or an open one (full scale)
    /// yields -273.15 °C and codes beyond full scale yield NaN.
    pub fn convert(&self, code: AdcCode) -> f32 {
        self.temperature(self.relative_resistance(code))
    }
}

impl Default for Thermistor {
    /// Vishay NTC fit for the 102 kΩ parts on a 100 kΩ pullup.
    fn default() -> Self {
        Self::new(100.0e3, 102.0e3, 0.003354016, 0.0002460382, 3.405377e-6)
    }
}
