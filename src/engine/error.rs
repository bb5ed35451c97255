// Error kinds surfaced by the steering core.
// Degenerate geometry never errors; it falls back to a zero force instead.

use std::error::Error;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringError {
    /// A vehicle parameter or behavior weight is outside its allowed range.
    InvalidConfiguration { field: &'static str, value: f32 },
    /// An index into an externally supplied sequence (waypoints) is not valid.
    OutOfRange { index: usize, len: usize },
}

impl Error for SteeringError {}

impl Display for SteeringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, value } => {
                write!(f, "invalid configuration: {field} = {value}")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for sequence of length {len}")
            }
        }
    }
}
