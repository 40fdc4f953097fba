//! Per-run routing plan.
//!
//! Velocities are fixed for a run, so every cell's flow targets are the
//! same on every step. [`RoutingPlan::compile`] computes them once and
//! inverts them into per-destination inflow lists. A routing step is then a
//! gather: each destination cell sums its inflows, and no two destinations
//! write to the same ledger span.

use log::warn;

use carbontrace_core::{Cell, Grid, Hydrology};
use carbontrace_ledger::LedgerError;

use crate::config::RoutingConfig;
use crate::error::RoutingError;
use crate::geometry::{displacement, flow_targets};

/// One contribution to a destination cell: the source cell's linear index
/// and the fraction of its mass that arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Inflow {
    /// Linear index of the contributing cell.
    pub from: u32,
    /// Fraction of the contributing cell's mass.
    pub weight: f64,
}

/// Compiled flow targets for one hydrology and configuration, indexed by
/// destination.
#[derive(Clone, Debug)]
pub struct RoutingPlan {
    /// Number of inflows per destination.
    fan_in: Grid<u32>,
    /// `offsets[i]..offsets[i + 1]` selects cell `i`'s inflows. Length is
    /// `cell_count + 1`.
    offsets: Vec<u32>,
    inflows: Vec<Inflow>,
    wet_cells: usize,
    overshooting_cells: usize,
}

impl RoutingPlan {
    /// Compute every existing cell's outflow and index it by destination.
    ///
    /// A source's stationary remainder is folded into its own inflow, so
    /// each (destination, source) pair appears at most once. Within a
    /// destination, inflows are ordered by the source's column-major scan
    /// position.
    pub fn compile<H: Hydrology + ?Sized>(
        hydrology: &H,
        config: &RoutingConfig,
    ) -> Result<Self, RoutingError> {
        let (width, height) = (hydrology.width(), hydrology.height());
        if width == 0 || height == 0 {
            return Err(RoutingError::EmptyDomain);
        }
        let mut fan_in: Grid<u32> = Grid::new(width, height);
        let scale = config.cells_per_unit_velocity();

        // 1. Outflows in scan order, staged as (destination, inflow).
        let mut staged: Vec<(usize, Inflow)> = Vec::new();
        let mut wet_cells = 0usize;
        let mut overshooting_cells = 0usize;
        for cell in fan_in.cells() {
            if !hydrology.patch_exists(cell) {
                continue;
            }
            wet_cells += 1;
            let velocity = hydrology.flow_vector(cell);
            let shift = displacement(velocity, scale);
            if !shift.iter().all(|d| d.is_finite()) {
                return Err(RoutingError::NonFiniteVelocity {
                    cell,
                    vx: velocity[0],
                    vy: velocity[1],
                });
            }
            let targets = flow_targets(hydrology, cell, shift);
            if targets.overshoots {
                overshooting_cells += 1;
            }

            let from = fan_in.index_of(cell);
            let from_u32 = index_u32(from)?;
            staged
                .try_reserve(targets.targets.len() + 1)
                .map_err(|_| LedgerError::AllocationFailed {
                    requested: staged.len() + targets.targets.len() + 1,
                })?;
            let mut stationary = targets.stationary();
            for t in &targets.targets {
                let mut weight = t.weight;
                if t.cell == cell {
                    weight += stationary;
                    stationary = 0.0;
                }
                staged.push((fan_in.index_of(t.cell), Inflow { from: from_u32, weight }));
            }
            if stationary > 0.0 {
                staged.push((from, Inflow { from: from_u32, weight: stationary }));
            }
        }
        for (dest, _) in &staged {
            fan_in[*dest] += 1;
        }

        // 2. Exclusive prefix sum over destinations.
        let cell_count = fan_in.size();
        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(cell_count + 1)
            .map_err(|_| LedgerError::AllocationFailed {
                requested: cell_count + 1,
            })?;
        let mut running = 0u32;
        offsets.push(0);
        for &n in fan_in.as_slice() {
            running = running
                .checked_add(n)
                .ok_or(LedgerError::SpanOverflow {
                    entries: staged.len(),
                })?;
            offsets.push(running);
        }

        // 3. Stable scatter into destination order.
        let mut inflows = Vec::new();
        inflows
            .try_reserve_exact(staged.len())
            .map_err(|_| LedgerError::AllocationFailed {
                requested: staged.len(),
            })?;
        inflows.resize(staged.len(), Inflow::default());
        let mut cursor: Vec<u32> = offsets[..cell_count].to_vec();
        for (dest, inflow) in staged {
            inflows[cursor[dest] as usize] = inflow;
            cursor[dest] += 1;
        }

        if overshooting_cells > 0 {
            warn!(
                "{overshooting_cells} of {wet_cells} patches move more than one cell per step; \
                 their flow skips the cells in between"
            );
        }

        Ok(Self {
            fan_in,
            offsets,
            inflows,
            wet_cells,
            overshooting_cells,
        })
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.fan_in.width()
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.fan_in.height()
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.fan_in.size()
    }

    /// The cell at linear index `i` (row-major).
    pub fn cell_at(&self, i: usize) -> Cell {
        self.fan_in.cell_at(i)
    }

    /// Number of inflows of `cell`.
    pub fn fan_in(&self, cell: Cell) -> u32 {
        self.fan_in[cell]
    }

    /// Inflows of the cell at linear index `dest`.
    pub fn inflows(&self, dest: usize) -> &[Inflow] {
        &self.inflows[self.offsets[dest] as usize..self.offsets[dest + 1] as usize]
    }

    /// Total number of (destination, source) pairs.
    pub fn inflow_count(&self) -> usize {
        self.inflows.len()
    }

    /// Number of existing patches.
    pub fn wet_cells(&self) -> usize {
        self.wet_cells
    }

    /// Number of patches whose displacement exceeds one cell.
    pub fn overshooting_cells(&self) -> usize {
        self.overshooting_cells
    }
}

fn index_u32(i: usize) -> Result<u32, RoutingError> {
    u32::try_from(i).map_err(|_| RoutingError::Ledger(LedgerError::SpanOverflow { entries: i }))
}
