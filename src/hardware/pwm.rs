//! Actuator magnitude PWM driver
use embedded_hal::PwmPin;

use super::hal::{
    gpio::{gpiod::*, gpioe::*, Alternate},
    prelude::*,
    pwm::{ActiveHigh, ComplementaryDisabled, ComplementaryImpossible, C1, C2, C3, C4},
    rcc::{rec, CoreClocks},
    stm32::{TIM1, TIM4},
};

use crate::actuator::PwmDivisor;
use crate::io::MagnitudePin;

pub struct PwmPins {
    pub magnitude0: PE9<Alternate<1>>,
    pub magnitude1: PE11<Alternate<1>>,
    pub magnitude2: PE13<Alternate<1>>,
    pub magnitude3: PE14<Alternate<1>>,
    pub magnitude4: PD12<Alternate<2>>,
    pub magnitude5: PD13<Alternate<2>>,
}

type Pt0<T, S> = super::hal::pwm::Pwm<T, S, ComplementaryDisabled, ActiveHigh, ActiveHigh>;
type Pt1<T, S> = super::hal::pwm::Pwm<T, S, ComplementaryImpossible, ActiveHigh, ActiveHigh>;

pub struct Pwm {
    magnitude0: Pt0<TIM1, C1>,
    magnitude1: Pt0<TIM1, C2>,
    magnitude2: Pt0<TIM1, C3>,
    magnitude3: Pt1<TIM1, C4>,
    magnitude4: Pt1<TIM4, C1>,
    magnitude5: Pt1<TIM4, C2>,
}

impl Pwm {
    /// All outputs start at zero duty.
    pub fn new(
        clocks: &CoreClocks,
        tim_rcc: (rec::Tim1, rec::Tim4),
        tim: (TIM1, TIM4),
        pins: PwmPins,
        divisor: PwmDivisor,
    ) -> Pwm {
        fn init_pwm_pin<P: PwmPin<Duty = u16>>(pin: &mut P) {
            pin.set_duty(0);
            pin.enable();
        }

        let frequency = divisor.frequency();
        log::info!("Actuator PWM at {} Hz", frequency.to_Hz());

        let (mut magnitude0, mut magnitude1, mut magnitude2, mut magnitude3) = tim.0.pwm(
            (
                pins.magnitude0,
                pins.magnitude1,
                pins.magnitude2,
                pins.magnitude3,
            ),
            frequency,
            tim_rcc.0,
            clocks,
        );
        init_pwm_pin(&mut magnitude0);
        init_pwm_pin(&mut magnitude1);
        init_pwm_pin(&mut magnitude2);
        init_pwm_pin(&mut magnitude3);

        let (mut magnitude4, mut magnitude5) = tim.1.pwm(
            (pins.magnitude4, pins.magnitude5),
            frequency,
            tim_rcc.1,
            clocks,
        );
        init_pwm_pin(&mut magnitude4);
        init_pwm_pin(&mut magnitude5);

        Pwm {
            magnitude0,
            magnitude1,
            magnitude2,
            magnitude3,
            magnitude4,
            magnitude5,
        }
    }

    /// Set the 8 bit duty cycle of a magnitude output.
    pub fn set(&mut self, pin: MagnitudePin, duty: u8) {
        fn set_pwm<P: PwmPin<Duty = u16>>(pin: &mut P, duty: u8) {
            let max = pin.get_max_duty() as u32;
            let value = (duty as u32 * max / u8::MAX as u32).min(max);
            pin.set_duty(value as u16);
        }
        match pin {
            MagnitudePin::Zero => set_pwm(&mut self.magnitude0, duty),
            MagnitudePin::One => set_pwm(&mut self.magnitude1, duty),
            MagnitudePin::Two => set_pwm(&mut self.magnitude2, duty),
            MagnitudePin::Three => set_pwm(&mut self.magnitude3, duty),
            MagnitudePin::Four => set_pwm(&mut self.magnitude4, duty),
            MagnitudePin::Five => set_pwm(&mut self.magnitude5, duty),
        }
    }
}
