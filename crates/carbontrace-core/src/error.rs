//! Error types for grid construction and hydrology input.

use std::error::Error;
use std::fmt;

/// Errors arising from building a [`Grid`](crate::Grid) or a
/// [`HydroGrid`](crate::HydroGrid) from caller-supplied data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A backing buffer did not hold exactly `width * height` elements.
    LengthMismatch {
        /// `width * height`.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// Attempted to construct a hydrology grid with zero cells.
    EmptyGrid,
    /// A dimension exceeds what signed cell arithmetic can address.
    DimensionTooLarge {
        /// Which dimension (`"width"` or `"height"`).
        name: &'static str,
        /// The configured value.
        value: u32,
        /// The maximum permitted value.
        max: u32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} cells, got {actual}")
            }
            Self::EmptyGrid => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} {value} exceeds maximum {max}")
            }
        }
    }
}

impl Error for GridError {}
