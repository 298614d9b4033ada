//! MCU ADC sampling of the thermistor dividers.
use embedded_hal::{adc::OneShot, blocking::delay::DelayUs};

use super::hal::{
    adc,
    gpio::{gpioa::*, gpiob::*, gpioc::*, Analog},
    prelude::*,
    rcc::{rec, CoreClocks},
    stm32::ADC1,
};

use crate::io::{AnalogInput, SensorInput};

pub struct AdcPins {
    pub thermistor: (
        PA3<Analog>,
        PA6<Analog>,
        PB0<Analog>,
        PB1<Analog>,
        PC0<Analog>,
        PC4<Analog>,
    ),
}

#[derive(Debug)]
pub struct ConversionError;

pub struct AdcInternal {
    adc1: adc::Adc<ADC1, adc::Enabled>,
    pins: AdcPins,
}

impl AdcInternal {
    pub fn new(
        delay: &mut impl DelayUs<u8>,
        clocks: &CoreClocks,
        adc_rcc: rec::Adc12,
        adc1: ADC1,
        pins: AdcPins,
    ) -> Self {
        let mut adc1 = adc::Adc::adc1(adc1, 4.MHz(), delay, adc_rcc, clocks).enable();
        // Codes are interpreted against a 1024 full scale.
        adc1.set_resolution(adc::Resolution::TenBit);
        // 100 kΩ divider source impedance
        adc1.set_sample_time(adc::AdcSampleTime::T_387);

        AdcInternal { adc1, pins }
    }
}

impl AnalogInput for AdcInternal {
    type Error = ConversionError;

    fn read(&mut self, input: SensorInput) -> Result<u16, ConversionError> {
        let p = &mut self.pins.thermistor;
        let code: u32 = match input {
            SensorInput::Zero => self.adc1.read(&mut p.0),
            SensorInput::One => self.adc1.read(&mut p.1),
            SensorInput::Two => self.adc1.read(&mut p.2),
            SensorInput::Three => self.adc1.read(&mut p.3),
            SensorInput::Four => self.adc1.read(&mut p.4),
            SensorInput::Five => self.adc1.read(&mut p.5),
        }
        .map_err(|_| ConversionError)?;
        u16::try_from(code).map_err(|_| ConversionError)
    }
}
