//! The hydrology collaborator consumed by the routing engine.
//!
//! The engine never sees depth, chemistry, or time series; it needs only
//! the grid extent, which patches hold water, and one velocity vector per
//! patch. [`Hydrology`] captures exactly that. [`HydroGrid`] is the
//! in-memory implementation used by callers that already hold per-patch
//! flow records.

use crate::cell::Cell;
use crate::error::GridError;
use crate::grid::Grid;

/// Read-only view of a hydrological velocity field.
///
/// Implementations must be deterministic: repeated calls with the same
/// cell return the same answer for the lifetime of a routing run.
pub trait Hydrology {
    /// Number of patch columns.
    fn width(&self) -> u32;

    /// Number of patch rows.
    fn height(&self) -> u32;

    /// Whether the patch at `cell` exists (holds water).
    ///
    /// Only called with cells inside `width() x height()`; out-of-range
    /// candidates are filtered by the caller.
    fn patch_exists(&self, cell: Cell) -> bool;

    /// Water velocity at `cell` as `[vx, vy]`, in metres per second.
    ///
    /// Only called for cells where [`patch_exists`](Hydrology::patch_exists)
    /// is `true`.
    fn flow_vector(&self, cell: Cell) -> [f64; 2];
}

impl<H: Hydrology + ?Sized> Hydrology for &H {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn patch_exists(&self, cell: Cell) -> bool {
        (**self).patch_exists(cell)
    }

    fn flow_vector(&self, cell: Cell) -> [f64; 2] {
        (**self).flow_vector(cell)
    }
}

/// Per-patch flow record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowCell {
    /// Whether the patch holds water. Dry patches do not exist for routing.
    pub has_water: bool,
    /// Water depth in metres. Informational; routing ignores it.
    pub depth: f64,
    /// Velocity along `x`.
    pub vx: f64,
    /// Velocity along `y`.
    pub vy: f64,
}

impl FlowCell {
    /// A wet patch flowing with velocity `(vx, vy)`.
    pub fn wet(vx: f64, vy: f64) -> Self {
        Self {
            has_water: true,
            depth: 0.0,
            vx,
            vy,
        }
    }
}

/// In-memory hydrology backed by a [`Grid`] of [`FlowCell`]s.
///
/// # Examples
///
/// ```
/// use carbontrace_core::{Cell, FlowCell, HydroGrid, Hydrology};
///
/// let mut hydro = HydroGrid::new(3, 2).unwrap();
/// hydro.set(Cell::new(1, 0), FlowCell::wet(0.5, 0.0));
/// assert!(hydro.patch_exists(Cell::new(1, 0)));
/// assert!(!hydro.patch_exists(Cell::new(0, 0)));
/// assert_eq!(hydro.flow_vector(Cell::new(1, 0)), [0.5, 0.0]);
/// ```
#[derive(Clone, Debug)]
pub struct HydroGrid {
    cells: Grid<FlowCell>,
}

impl HydroGrid {
    /// Maximum dimension: routing geometry works in signed cell space.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create an all-dry grid.
    ///
    /// Returns `Err(GridError::EmptyGrid)` if either dimension is 0, or
    /// `Err(GridError::DimensionTooLarge)` if either exceeds
    /// [`MAX_DIM`](Self::MAX_DIM).
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        Self::check_dims(width, height)?;
        Ok(Self {
            cells: Grid::new(width, height),
        })
    }

    /// Build from a row-major vector of flow records.
    pub fn from_cells(width: u32, height: u32, cells: Vec<FlowCell>) -> Result<Self, GridError> {
        Self::check_dims(width, height)?;
        Ok(Self {
            cells: Grid::from_vec(width, height, cells)?,
        })
    }

    /// Build a fully wet grid where every patch flows with the same velocity.
    pub fn uniform(width: u32, height: u32, vx: f64, vy: f64) -> Result<Self, GridError> {
        Self::check_dims(width, height)?;
        Ok(Self {
            cells: Grid::filled(width, height, FlowCell::wet(vx, vy)),
        })
    }

    fn check_dims(width: u32, height: u32) -> Result<(), GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        if width > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Self::MAX_DIM,
            });
        }
        if height > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Self::MAX_DIM,
            });
        }
        Ok(())
    }

    /// Replace the record at `cell`.
    pub fn set(&mut self, cell: Cell, record: FlowCell) {
        self.cells[cell] = record;
    }

    /// Mark `cell` dry, removing it from the routing domain.
    pub fn set_dry(&mut self, cell: Cell) {
        self.cells[cell].has_water = false;
    }

    /// The record at `cell`.
    pub fn cell(&self, cell: Cell) -> &FlowCell {
        &self.cells[cell]
    }

    /// Number of wet patches.
    pub fn wet_count(&self) -> usize {
        self.cells.as_slice().iter().filter(|c| c.has_water).count()
    }
}

impl Hydrology for HydroGrid {
    fn width(&self) -> u32 {
        self.cells.width()
    }

    fn height(&self) -> u32 {
        self.cells.height()
    }

    fn patch_exists(&self, cell: Cell) -> bool {
        self.cells[cell].has_water
    }

    fn flow_vector(&self, cell: Cell) -> [f64; 2] {
        let c = &self.cells[cell];
        [c.vx, c.vy]
    }
}
