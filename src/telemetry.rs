//! Chamber telemetry
//!
//! # Design
//! One record is emitted per cycle on the serial line. The default text format is one line
//! holding a `temperature setpoint power` triple per chamber in physical order, each triple
//! followed by a tab:
//!
//! ```text
//! 25.12 28.00 0.00\t24.98 28.00 -255.00\t...\n
//! ```
//!
//! There is no header, no units and no chamber index. A JSON rendering of the same record is
//! available for hosts that prefer it.
use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::chamber::Chamber;
use crate::CHAMBER_COUNT;

/// Largest JSON rendering of a [Record].
const JSON_CAPACITY: usize = 640;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// The telemetry sink did not accept the data.
    Sink,
    /// The record did not fit the serialization buffer.
    Overflow,
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::Sink
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Snapshot of one chamber.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChamberReading {
    pub temperature: f32,
    pub setpoint: f32,
    pub power: f32,
}

impl From<&Chamber> for ChamberReading {
    fn from(chamber: &Chamber) -> Self {
        Self {
            temperature: chamber.temperature(),
            setpoint: chamber.setpoint(),
            power: chamber.power(),
        }
    }
}

/// Telemetry of one cycle, in physical chamber order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Record {
    pub chambers: [ChamberReading; CHAMBER_COUNT],
}

impl Record {
    pub fn new(chambers: &[Chamber; CHAMBER_COUNT]) -> Self {
        Self {
            chambers: chambers.each_ref().map(ChamberReading::from),
        }
    }

    /// Write the record as one line in the given format.
    pub fn write<W: Write>(&self, format: Format, sink: &mut W) -> Result<(), Error> {
        match format {
            Format::Text => {
                for c in self.chambers.iter() {
                    write!(sink, "{:.2} {:.2} {:.2}\t", c.temperature, c.setpoint, c.power)?;
                }
            }
            Format::Json => {
                let json: heapless::String<JSON_CAPACITY> =
                    serde_json_core::to_string(self).map_err(|_| Error::Overflow)?;
                sink.write_str(&json)?;
            }
        }
        sink.write_char('\n')?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chamber::Wiring;
    use crate::ChamberIdx;
    use heapless::String;
    use std::vec::Vec;

    fn chambers() -> [Chamber; CHAMBER_COUNT] {
        let mut chambers =
            ChamberIdx::ALL.map(|idx| Chamber::new(Wiring::of(idx), 28.0, 25.0));
        chambers[1].set_power(-255.0);
        chambers[4].set_setpoint(31.5).unwrap();
        chambers
    }

    #[test]
    fn text_line() {
        let record = Record::new(&chambers());
        let mut line: String<256> = String::new();
        record.write(Format::Text, &mut line).unwrap();
        assert!(line.ends_with("\t\n"));
        assert_eq!(line.matches('\n').count(), 1);

        let triples: Vec<Vec<f32>> = line
            .trim_end_matches('\n')
            .split_terminator('\t')
            .map(|t| t.split(' ').map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(triples.len(), CHAMBER_COUNT);
        assert!(triples.iter().all(|t| t.len() == 3));
        assert_eq!(triples[0], [25.0, 28.0, 0.0]);
        assert_eq!(triples[1], [25.0, 28.0, -255.0]);
        assert_eq!(triples[4], [25.0, 31.5, 0.0]);
    }

    #[test]
    fn text_precision() {
        let mut record = Record::default();
        record.chambers[0].temperature = 23.456;
        let mut line: String<256> = String::new();
        record.write(Format::Text, &mut line).unwrap();
        assert!(line.starts_with("23.46 0.00 0.00\t"));
    }

    #[test]
    fn fault_values_are_reported() {
        let mut record = Record::default();
        record.chambers[2].temperature = f32::NAN;
        record.chambers[3].temperature = -273.15;
        let mut line: String<256> = String::new();
        record.write(Format::Text, &mut line).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 3 * CHAMBER_COUNT);
        assert_eq!(fields[6], "NaN");
        assert_eq!(fields[9], "-273.15");
    }

    #[test]
    fn json_line() {
        let record = Record::new(&chambers());
        let mut line: String<JSON_CAPACITY> = String::new();
        record.write(Format::Json, &mut line).unwrap();
        assert!(line.starts_with("{\"chambers\":[{\"temperature\":25"));
        assert!(line.ends_with("]}\n"));
        assert_eq!(line.matches("\"setpoint\"").count(), CHAMBER_COUNT);
    }

    #[test]
    fn sink_full() {
        let record = Record::new(&chambers());
        let mut line: String<16> = String::new();
        assert_eq!(record.write(Format::Text, &mut line), Err(Error::Sink));
    }
}
