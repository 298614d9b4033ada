//! # Host command channel
//!
//! Commands arrive as newline terminated ASCII lines on the serial port. The receive interrupt
//! only assembles lines ([LineBuffer]); parsing and execution happen in the main loop.
//!
//! | Line        | Effect                                         |
//! |-------------|------------------------------------------------|
//! | `S <i> <t>` | set the setpoint of chamber `i` to `t` °C      |
//! | `P <i> <p>` | set the commanded power of chamber `i`         |
//! | `T <i>`     | step the self-test sweep of chamber `i`        |
//!
//! The space after the command letter is optional. Invalid lines are dropped without any
//! response.

use heapless::String;

use crate::ChamberIdx;

/// Longest command line (excluding the newline).
pub const LINE_CAPACITY: usize = 32;

pub type Line = String<LINE_CAPACITY>;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// Nothing but whitespace.
    Empty,
    /// Unknown command letter.
    Unknown,
    MissingArgument,
    /// Chamber index is not a number in [0, 6).
    Index,
    /// Value is not a number.
    Value,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Setpoint { chamber: ChamberIdx, setpoint: f32 },
    Power { chamber: ChamberIdx, power: f32 },
    SelfTest { chamber: ChamberIdx },
}

impl Command {
    /// Parse one trimmed line. Tokens after the expected arguments are ignored.
    ///
    /// The setpoint range is not checked here, see [crate::chamber::Chamber::set_setpoint].
    pub fn parse(line: &str) -> Result<Self, Error> {
        let mut chars = line.chars();
        let letter = chars.next().ok_or(Error::Empty)?;
        let mut args = chars.as_str().split_whitespace();

        match letter {
            'S' => {
                let chamber = index(args.next())?;
                let setpoint = value(args.next())?;
                Ok(Self::Setpoint { chamber, setpoint })
            }
            'P' => {
                let chamber = index(args.next())?;
                let power = value(args.next())?;
                Ok(Self::Power { chamber, power })
            }
            'T' => Ok(Self::SelfTest {
                chamber: index(args.next())?,
            }),
            _ if letter.is_whitespace() => Err(Error::Empty),
            _ => Err(Error::Unknown),
        }
    }
}

fn index(token: Option<&str>) -> Result<ChamberIdx, Error> {
    let token = token.ok_or(Error::MissingArgument)?;
    let idx: u8 = token.parse().map_err(|_| Error::Index)?;
    ChamberIdx::try_from(idx).map_err(|_| Error::Index)
}

fn value(token: Option<&str>) -> Result<f32, Error> {
    let token = token.ok_or(Error::MissingArgument)?;
    let value: f32 = token.parse().map_err(|_| Error::Value)?;
    if value.is_nan() {
        return Err(Error::Value);
    }
    Ok(value)
}

/// Incremental line assembly from received bytes.
///
/// Bytes outside 1..=127 (line noise during start-up) are discarded. A line longer than the
/// buffer is dropped as a whole.
#[derive(Default)]
pub struct LineBuffer {
    line: Line,
    overflow: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns the trimmed line once a newline completes a non-empty one.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' => {
                let line = core::mem::take(&mut self.line);
                if core::mem::take(&mut self.overflow) {
                    log::debug!("Dropping overlong command line");
                    return None;
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let mut command = Line::new();
                // A substring always fits the same capacity.
                command.push_str(trimmed).ok()?;
                Some(command)
            }
            1..=127 => {
                if self.line.push(byte as char).is_err() {
                    self.overflow = true;
                }
                None
            }
            _ => None,
        }
    }
}
