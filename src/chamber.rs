//! # Chamber
//!
//! One independently controlled thermal zone: a thermistor input, an actuator and the
//! commanded state.

use crate::actuator::{self, clamp_power};
use crate::convert::{AdcCode, Thermistor, OVERSAMPLING};
use crate::io::{ActuatorOutputs, AnalogInput, DirectionPin, MagnitudePin, SensorInput};
use crate::{ChamberIdx, CHAMBER_COUNT, POWER_LIMIT, SETPOINT_RANGE};

#[derive(Debug, PartialEq)]
pub enum Error<E> {
    Adc(E),
    Output(E),
}

/// Setpoint outside [SETPOINT_RANGE].
#[derive(Debug, PartialEq)]
pub struct OutOfRange;

/// Fixed hardware assignment of one chamber.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Wiring {
    pub sensor: SensorInput,
    pub direction: DirectionPin,
    pub magnitude: MagnitudePin,
}

impl Wiring {
    const fn new(driver: usize, sensor: SensorInput) -> Self {
        const DIRECTION: [DirectionPin; CHAMBER_COUNT] = [
            DirectionPin::Zero,
            DirectionPin::One,
            DirectionPin::Two,
            DirectionPin::Three,
            DirectionPin::Four,
            DirectionPin::Five,
        ];
        const MAGNITUDE: [MagnitudePin; CHAMBER_COUNT] = [
            MagnitudePin::Zero,
            MagnitudePin::One,
            MagnitudePin::Two,
            MagnitudePin::Three,
            MagnitudePin::Four,
            MagnitudePin::Five,
        ];
        Self {
            sensor,
            direction: DIRECTION[driver],
            magnitude: MAGNITUDE[driver],
        }
    }

    /// Wiring of the deployed board, indexed by [ChamberIdx].
    ///
    /// Chambers are numbered by physical position while drivers and sensor inputs are numbered
    /// by board connector, hence the shuffle. Driver 5 (chamber 3) is wired with its bridge
    /// reversed and driver 1 (chamber 2) is known faulty; neither is compensated here.
    pub const BOARD: [Wiring; CHAMBER_COUNT] = [
        Self::new(0, SensorInput::Five),
        Self::new(2, SensorInput::One),
        Self::new(1, SensorInput::Zero),
        Self::new(5, SensorInput::Three),
        Self::new(3, SensorInput::Four),
        Self::new(4, SensorInput::Two),
    ];

    pub fn of(idx: ChamberIdx) -> Self {
        Self::BOARD[idx as usize]
    }
}

#[derive(Clone, Debug)]
pub struct Chamber {
    wiring: Wiring,
    /// Self-test sweep position: 0 before the first step, then alternating 1 and -1.
    status: i8,
    /// Commanded power. Positive heats, negative cools.
    power: f32,
    /// Last measured temperature in °C.
    temperature: f32,
    /// Target temperature in °C.
    setpoint: f32,
}

impl Chamber {
    pub fn new(wiring: Wiring, setpoint: f32, temperature: f32) -> Self {
        Self {
            wiring,
            status: 0,
            power: 0.0,
            temperature,
            setpoint,
        }
    }

    pub fn wiring(&self) -> Wiring {
        self.wiring
    }

    pub fn status(&self) -> i8 {
        self.status
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Set the commanded power. It is clamped when applied.
    pub fn set_power(&mut self, power: f32) {
        self.power = power;
    }

    /// Set the target temperature. Values outside [SETPOINT_RANGE] are rejected and leave the
    /// setpoint unchanged.
    pub fn set_setpoint(&mut self, setpoint: f32) -> Result<(), OutOfRange> {
        if !SETPOINT_RANGE.contains(&setpoint) {
            return Err(OutOfRange);
        }
        // No negative zero in telemetry.
        self.setpoint = setpoint + 0.0;
        Ok(())
    }

    /// Measure the chamber temperature.
    ///
    /// The first read after switching the multiplexer is discarded, then [OVERSAMPLING] reads
    /// are averaged and converted.
    pub fn sample<A: AnalogInput>(
        &mut self,
        adc: &mut A,
        thermistor: &Thermistor,
    ) -> Result<f32, Error<A::Error>> {
        let input = self.wiring.sensor;
        adc.read(input).map_err(Error::Adc)?;
        let mut sum = 0u32;
        for _ in 0..OVERSAMPLING {
            sum += adc.read(input).map_err(Error::Adc)? as u32;
        }
        self.temperature = thermistor.convert(AdcCode::from_sum(sum));
        Ok(self.temperature)
    }

    /// Clamp the commanded power and drive the actuator with it.
    pub fn apply_power<O: ActuatorOutputs>(
        &mut self,
        outputs: &mut O,
    ) -> Result<(), Error<O::Error>> {
        self.power = clamp_power(self.power);
        actuator::drive(
            self.power,
            outputs,
            self.wiring.direction,
            self.wiring.magnitude,
        )
        .map_err(Error::Output)
    }

    /// Step the hardware self-test sweep: full heat, full cool, full heat, ...
    pub fn cycle_self_test<O: ActuatorOutputs>(
        &mut self,
        outputs: &mut O,
    ) -> Result<(), Error<O::Error>> {
        self.status = if self.status == 1 { -1 } else { 1 };
        self.power = self.status as f32 * POWER_LIMIT;
        self.apply_power(outputs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::mock::{MockAdc, MockOutputs};
    use crate::io::Level;
    use std::vec;

    fn chamber() -> Chamber {
        Chamber::new(Wiring::of(ChamberIdx::Three), 28.0, 25.0)
    }

    #[test]
    fn construction() {
        let c = chamber();
        assert_eq!(c.status(), 0);
        assert_eq!(c.power(), 0.0);
        assert_eq!(c.temperature(), 25.0);
        assert_eq!(c.setpoint(), 28.0);
        assert_eq!(
            c.wiring(),
            Wiring {
                sensor: SensorInput::Three,
                direction: DirectionPin::Five,
                magnitude: MagnitudePin::Five,
            }
        );
    }

    #[test]
    fn board_wiring() {
        let sensors = Wiring::BOARD.map(|w| w.sensor as usize);
        let drivers = Wiring::BOARD.map(|w| w.direction as usize);
        assert_eq!(sensors, [5, 1, 0, 3, 4, 2]);
        assert_eq!(drivers, [0, 2, 1, 5, 3, 4]);
        for w in Wiring::BOARD {
            assert_eq!(w.direction as usize, w.magnitude as usize);
        }
    }

    #[test]
    fn sample_discards_settle_read() {
        let mut adc = MockAdc::new([100, 200, 300, 400, 500, 600]);
        adc.unsettled = 1000;
        let t = Thermistor::default();
        let mut c = chamber();
        let temp = c.sample(&mut adc, &t).unwrap();
        assert_eq!(adc.reads, vec![SensorInput::Three; 9]);
        assert_eq!(temp, t.convert(AdcCode::from(400)));
        assert_eq!(c.temperature(), temp);
    }

    #[test]
    fn sample_error_keeps_temperature() {
        let mut adc = MockAdc::new([512; 6]);
        adc.fail = Some(SensorInput::Three);
        let mut c = chamber();
        assert_eq!(
            c.sample(&mut adc, &Thermistor::default()),
            Err(Error::Adc(()))
        );
        assert_eq!(c.temperature(), 25.0);
    }

    #[test]
    fn setpoint_validation() {
        let mut c = chamber();
        assert_eq!(c.set_setpoint(30.0), Ok(()));
        assert_eq!(c.setpoint(), 30.0);
        assert_eq!(c.set_setpoint(0.0), Ok(()));
        assert_eq!(c.set_setpoint(55.0), Ok(()));
        for bad in [-0.1, 55.1, 60.0, f32::NAN, f32::INFINITY] {
            assert_eq!(c.set_setpoint(bad), Err(OutOfRange));
        }
        assert_eq!(c.setpoint(), 55.0);
    }

    #[test]
    fn apply_power_clamps() {
        let mut out = MockOutputs::default();
        let mut c = chamber();
        c.set_power(-400.0);
        c.apply_power(&mut out).unwrap();
        assert_eq!(c.power(), -255.0);
        assert_eq!(out.direction[5], Some(Level::High));
        assert_eq!(out.magnitude[5], Some(0));

        c.set_power(1e6);
        c.apply_power(&mut out).unwrap();
        assert_eq!(c.power(), 255.0);
        assert_eq!(out.direction[5], Some(Level::Low));
        assert_eq!(out.magnitude[5], Some(255));
    }

    #[test]
    fn self_test_sequence() {
        let mut out = MockOutputs::default();
        let mut c = chamber();
        let mut seen = vec![];
        for _ in 0..6 {
            c.cycle_self_test(&mut out).unwrap();
            seen.push((c.status(), c.power(), out.magnitude[5].unwrap()));
        }
        assert_eq!(
            seen,
            vec![
                (1, 255.0, 255),
                (-1, -255.0, 0),
                (1, 255.0, 255),
                (-1, -255.0, 0),
                (1, 255.0, 255),
                (-1, -255.0, 0),
            ]
        );
    }

    #[test]
    fn self_test_never_returns_to_off() {
        let mut out = MockOutputs::default();
        let mut c = chamber();
        c.status = -1;
        c.cycle_self_test(&mut out).unwrap();
        assert_eq!((c.status(), c.power()), (1, 255.0));
        assert_eq!(out.magnitude[5], Some(255));
        assert_eq!(out.direction[5], Some(Level::Low));
        c.cycle_self_test(&mut out).unwrap();
        assert_eq!((c.status(), c.power()), (-1, -255.0));
    }

    #[test]
    fn negative_zero_setpoint() {
        let mut c = chamber();
        c.set_setpoint(-0.0).unwrap();
        assert!(c.setpoint().is_sign_positive());
        assert_eq!(c.setpoint(), 0.0);
    }
}
