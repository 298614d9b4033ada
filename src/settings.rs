//! Controller settings.
//!
//! Settings are fixed at start-up and not persisted. The defaults are the values of the
//! deployed controller.

use serde::{Deserialize, Serialize};

use crate::actuator::PwmDivisor;
use crate::convert::Thermistor;
use crate::telemetry::Format;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sampling and telemetry period in milliseconds.
    pub telemetry_period_ms: u32,

    /// Telemetry line format.
    pub telemetry_format: Format,

    /// Setpoint of every chamber at start-up in °C.
    pub default_setpoint: f32,

    /// Temperature reported before the first measurement in °C.
    pub initial_temperature: f32,

    /// Thermistor divider and fit.
    pub thermistor: Thermistor,

    /// Actuator PWM clock divisor.
    pub pwm_divisor: PwmDivisor,

    /// Host serial line baud rate.
    pub baud_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telemetry_period_ms: 250,
            telemetry_format: Format::Text,
            default_setpoint: 28.0,
            initial_temperature: 25.0,
            thermistor: Thermistor::default(),
            pwm_divisor: PwmDivisor::Eight,
            baud_rate: 115_200,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json_core::de::Error> {
        serde_json_core::from_slice(json).map(|(settings, _)| settings)
    }
}
