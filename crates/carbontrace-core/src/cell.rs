//! Strongly-typed cell coordinates.

use std::fmt;

/// A cell (patch) coordinate on the hydrology grid.
///
/// `x` runs along the grid width and `y` along its height. The origin
/// `(0, 0)` is the bottom-left patch; `y` grows upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column index, `0 <= x < width`.
    pub x: u32,
    /// Row index, `0 <= y < height`.
    pub y: u32,
}

impl Cell {
    /// Create a cell coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Convert signed coordinates into a cell, or `None` if either is
    /// negative or exceeds `u32::MAX`.
    pub fn from_signed(x: i64, y: i64) -> Option<Self> {
        Some(Self {
            x: u32::try_from(x).ok()?,
            y: u32::try_from(y).ok()?,
        })
    }

    /// Convert signed coordinates into a cell of a `width x height` grid,
    /// or `None` if they fall outside it.
    pub fn from_signed_within(x: i64, y: i64, width: u32, height: u32) -> Option<Self> {
        let cell = Self::from_signed(x, y)?;
        (cell.x < width && cell.y < height).then_some(cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(u32, u32)> for Cell {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}
