//! # Chamber bank
//!
//! The six chambers and the fixed-cadence cycle over them.
//!
//! # Design
//! The bank is the only owner of chamber state and is driven from a single loop. Each loop
//! iteration first executes the host commands that arrived since the last iteration and then
//! polls the cycle gate. On a cycle boundary every chamber is sampled and re-driven in physical
//! order and one telemetry line is written. Commands never wait for a cycle and a cycle never
//! waits for commands.

use core::fmt::Write;

use fugit::MillisDurationU32;

use crate::cadence::{Cadence, Instant};
use crate::chamber::{self, Chamber, OutOfRange, Wiring};
use crate::command::{self, Command};
use crate::convert::Thermistor;
use crate::io::{ActuatorOutputs, AnalogInput};
use crate::settings::Settings;
use crate::telemetry::{self, Format, Record};
use crate::{ChamberIdx, CHAMBER_COUNT};

#[derive(Debug, PartialEq)]
pub enum Error<E> {
    Command(command::Error),
    Setpoint(OutOfRange),
    Output(E),
}

impl<E> From<command::Error> for Error<E> {
    fn from(e: command::Error) -> Self {
        Self::Command(e)
    }
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(e: OutOfRange) -> Self {
        Self::Setpoint(e)
    }
}

impl<E> From<chamber::Error<E>> for Error<E> {
    fn from(e: chamber::Error<E>) -> Self {
        match e {
            chamber::Error::Adc(e) | chamber::Error::Output(e) => Self::Output(e),
        }
    }
}

pub struct ChamberBank {
    chambers: [Chamber; CHAMBER_COUNT],
    thermistor: Thermistor,
    format: Format,
    cadence: Cadence,
}

impl ChamberBank {
    /// Construct the bank with the board wiring. The first cycle is due one period after
    /// `start`.
    pub fn new(settings: &Settings, start: Instant) -> Self {
        Self {
            chambers: Wiring::BOARD.map(|wiring| {
                Chamber::new(
                    wiring,
                    settings.default_setpoint,
                    settings.initial_temperature,
                )
            }),
            thermistor: settings.thermistor,
            format: settings.telemetry_format,
            cadence: Cadence::new(
                MillisDurationU32::from_ticks(settings.telemetry_period_ms),
                start,
            ),
        }
    }

    pub fn chambers(&self) -> &[Chamber; CHAMBER_COUNT] {
        &self.chambers
    }

    pub fn chamber(&self, idx: ChamberIdx) -> &Chamber {
        &self.chambers[idx as usize]
    }

    /// Bounds checked access by raw index.
    pub fn get(&self, idx: usize) -> Option<&Chamber> {
        self.chambers.get(idx)
    }

    /// Bounds checked mutable access by raw index.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Chamber> {
        self.chambers.get_mut(idx)
    }

    /// Drive every actuator from its commanded power (off after construction).
    pub fn apply_all<O: ActuatorOutputs>(&mut self, outputs: &mut O) {
        for (i, chamber) in self.chambers.iter_mut().enumerate() {
            if let Err(e) = chamber.apply_power(outputs) {
                log::warn!("Chamber {i}: driving outputs failed: {e:?}");
            }
        }
    }

    /// Execute a host command.
    pub fn execute<O: ActuatorOutputs>(
        &mut self,
        command: Command,
        outputs: &mut O,
    ) -> Result<(), Error<O::Error>> {
        match command {
            Command::Setpoint { chamber, setpoint } => {
                self.chambers[chamber as usize].set_setpoint(setpoint)?
            }
            Command::Power { chamber, power } => {
                let chamber = &mut self.chambers[chamber as usize];
                chamber.set_power(power);
                chamber.apply_power(outputs)?
            }
            Command::SelfTest { chamber } => {
                self.chambers[chamber as usize].cycle_self_test(outputs)?
            }
        }
        Ok(())
    }

    /// Parse and execute one command line. Rejected lines are dropped.
    pub fn handle_line<O: ActuatorOutputs>(&mut self, line: &str, outputs: &mut O) {
        if let Err(e) = Command::parse(line)
            .map_err(Error::from)
            .and_then(|command| self.execute(command, outputs))
        {
            log::debug!("Dropped command {line:?}: {e:?}");
        }
    }

    /// Run one cycle: sample and re-drive every chamber in physical order, then write one
    /// telemetry line.
    ///
    /// Hardware failures of a chamber are logged and the remaining chambers proceed; the failed
    /// chamber reports its previous temperature.
    pub fn cycle<A: AnalogInput, O: ActuatorOutputs, W: Write>(
        &mut self,
        adc: &mut A,
        outputs: &mut O,
        sink: &mut W,
    ) -> Result<Record, telemetry::Error> {
        for (i, chamber) in self.chambers.iter_mut().enumerate() {
            if let Err(e) = chamber.sample(adc, &self.thermistor) {
                log::warn!("Chamber {i}: sampling failed: {e:?}");
            }
            if let Err(e) = chamber.apply_power(outputs) {
                log::warn!("Chamber {i}: driving outputs failed: {e:?}");
            }
        }
        let record = Record::new(&self.chambers);
        record.write(self.format, sink)?;
        Ok(record)
    }

    /// Check the cycle gate at `now` and run a cycle on a boundary.
    pub fn poll<A: AnalogInput, O: ActuatorOutputs, W: Write>(
        &mut self,
        now: Instant,
        adc: &mut A,
        outputs: &mut O,
        sink: &mut W,
    ) -> Result<Option<Record>, telemetry::Error> {
        if !self.cadence.poll(now) {
            return Ok(None);
        }
        self.cycle(adc, outputs, sink).map(Some)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::convert::AdcCode;
    use crate::io::mock::{MockAdc, MockOutputs};
    use crate::io::{Level, SensorInput};
    use heapless::String;
    use std::vec::Vec;

    const CODES: [u16; 6] = [300, 350, 400, 450, 500, 550];

    fn bank() -> ChamberBank {
        ChamberBank::new(&Settings::default(), Instant::from_ticks(0))
    }

    fn setpoints(bank: &ChamberBank) -> [f32; CHAMBER_COUNT] {
        bank.chambers().each_ref().map(|c| c.setpoint())
    }

    #[test]
    fn construction() {
        let bank = bank();
        for (chamber, wiring) in bank.chambers().iter().zip(Wiring::BOARD) {
            assert_eq!(chamber.wiring(), wiring);
            assert_eq!(chamber.setpoint(), 28.0);
            assert_eq!(chamber.temperature(), 25.0);
            assert_eq!(chamber.power(), 0.0);
        }
        assert!(bank.get(5).is_some());
        assert!(bank.get(6).is_none());
    }

    #[test]
    fn setpoint_commands() {
        let mut bank = bank();
        let mut out = MockOutputs::default();

        bank.handle_line("S3 30", &mut out);
        assert_eq!(bank.chamber(ChamberIdx::Three).setpoint(), 30.0);

        let before = setpoints(&bank);
        for line in ["S6 30", "S2 60", "S2", "S2 -1", "Sfoo 20", "S1 bar"] {
            bank.handle_line(line, &mut out);
            assert_eq!(setpoints(&bank), before, "{line}");
        }
        assert_eq!(out.writes, 0);
    }

    #[test]
    fn setpoint_rejection_reason() {
        let mut bank = bank();
        let mut out = MockOutputs::default();
        let command = Command::Setpoint {
            chamber: ChamberIdx::Two,
            setpoint: 60.0,
        };
        assert_eq!(
            bank.execute(command, &mut out),
            Err(Error::Setpoint(OutOfRange))
        );
    }

    #[test]
    fn power_command_drives_outputs() {
        let mut bank = bank();
        let mut out = MockOutputs::default();
        bank.handle_line("P3 -300", &mut out);
        let chamber = bank.chamber(ChamberIdx::Three);
        assert_eq!(chamber.power(), -255.0);
        let pin = chamber.wiring().direction as usize;
        assert_eq!(out.direction[pin], Some(Level::High));
        assert_eq!(out.magnitude[pin], Some(0));
    }

    #[test]
    fn self_test_command() {
        let mut bank = bank();
        let mut out = MockOutputs::default();
        let powers: Vec<f32> = (0..4)
            .map(|_| {
                bank.handle_line("T0", &mut out);
                bank.chamber(ChamberIdx::Zero).power()
            })
            .collect();
        assert_eq!(powers, [255.0, -255.0, 255.0, -255.0]);
    }

    #[test]
    fn start_up_outputs_off() {
        let mut bank = bank();
        let mut out = MockOutputs::default();
        bank.apply_all(&mut out);
        assert_eq!(out.direction, [Some(Level::Low); 6]);
        assert_eq!(out.magnitude, [Some(0); 6]);
    }

    #[test]
    fn telemetry_in_physical_order() {
        let mut bank = bank();
        let mut adc = MockAdc::new(CODES);
        let mut out = MockOutputs::default();
        let mut line: String<256> = String::new();
        let record = bank.cycle(&mut adc, &mut out, &mut line).unwrap();

        let t = Thermistor::default();
        for (reading, wiring) in record.chambers.iter().zip(Wiring::BOARD) {
            let code = CODES[wiring.sensor as usize];
            assert_eq!(reading.temperature, t.convert(AdcCode::from(code)));
            assert_eq!(reading.setpoint, 28.0);
            assert_eq!(reading.power, 0.0);
        }

        // Settle read plus eight samples per chamber, chambers in order.
        assert_eq!(adc.reads.len(), 9 * CHAMBER_COUNT);
        let order: Vec<SensorInput> = adc.reads.chunks(9).map(|c| c[0]).collect();
        assert_eq!(order, Wiring::BOARD.map(|w| w.sensor));

        assert_eq!(line.matches('\n').count(), 1);
        let triples: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(triples.len(), CHAMBER_COUNT);
        assert!(triples.iter().all(|t| t.split(' ').count() == 3));
    }

    #[test]
    fn failed_sensor_does_not_stop_cycle() {
        let mut bank = bank();
        let mut adc = MockAdc::new(CODES);
        adc.fail = Some(SensorInput::One);
        let mut out = MockOutputs::default();
        let mut line: String<256> = String::new();
        let record = bank.cycle(&mut adc, &mut out, &mut line).unwrap();

        // Chamber 1 reads sensor input 1.
        assert_eq!(record.chambers[1].temperature, 25.0);
        assert_ne!(record.chambers[0].temperature, 25.0);
        assert_ne!(record.chambers[5].temperature, 25.0);
        assert_eq!(out.magnitude, [Some(0); 6]);
    }

    #[test]
    fn cycle_cadence() {
        let mut bank = bank();
        let mut adc = MockAdc::new(CODES);
        let mut out = MockOutputs::default();
        let mut sink: String<4096> = String::new();
        let mut cycles = Vec::new();
        for ms in 0..=1000 {
            let now = Instant::from_ticks(ms);
            // Commands are serviced on every iteration.
            bank.handle_line("S0 30", &mut out);
            if bank
                .poll(now, &mut adc, &mut out, &mut sink)
                .unwrap()
                .is_some()
            {
                cycles.push(ms);
            }
        }
        assert_eq!(cycles, [250, 500, 750, 1000]);
        assert_eq!(sink.matches('\n').count(), 4);
        assert_eq!(adc.reads.len(), 4 * 9 * CHAMBER_COUNT);
    }

    #[test]
    fn json_telemetry() {
        let settings = Settings {
            telemetry_format: Format::Json,
            ..Default::default()
        };
        let mut bank = ChamberBank::new(&settings, Instant::from_ticks(0));
        let mut adc = MockAdc::new(CODES);
        let mut out = MockOutputs::default();
        let mut line: String<1024> = String::new();
        bank.cycle(&mut adc, &mut out, &mut line).unwrap();
        assert!(line.starts_with('{'));
        assert!(line.ends_with("}\n"));
    }
}
