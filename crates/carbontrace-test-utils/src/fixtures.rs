//! Reusable hydrology fixtures.
//!
//! - [`east_quarter`]: every patch wet, moving a quarter cell east per
//!   step under the default geometry.
//! - [`masked`]: a uniform field with selected patches dry.
//! - [`random_flow`]: seeded random velocities and dry patches.

use carbontrace_core::{Cell, FlowCell, HydroGrid};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Velocity (m/s) that moves water a quarter cell per step with a 30 m
/// cell and 60 s step.
pub const QUARTER_CELL_SPEED: f64 = 0.125;

/// Fully wet grid flowing a quarter cell east per step.
pub fn east_quarter(width: u32, height: u32) -> HydroGrid {
    uniform(width, height, QUARTER_CELL_SPEED, 0.0)
}

/// Fully wet grid with the same velocity everywhere.
pub fn uniform(width: u32, height: u32, vx: f64, vy: f64) -> HydroGrid {
    HydroGrid::uniform(width, height, vx, vy).expect("fixture dimensions are non-zero")
}

/// Uniform grid with every cell in `dry` removed.
pub fn masked(width: u32, height: u32, vx: f64, vy: f64, dry: &[Cell]) -> HydroGrid {
    let mut h = uniform(width, height, vx, vy);
    for &cell in dry {
        h.set_dry(cell);
    }
    h
}

/// Seeded random flow field.
///
/// Each patch is wet with probability `wet_fraction`; wet patches get a
/// velocity drawn uniformly from `[-max_speed, max_speed]` on each axis.
/// Identical arguments produce identical grids.
pub fn random_flow(
    width: u32,
    height: u32,
    seed: u64,
    max_speed: f64,
    wet_fraction: f64,
) -> HydroGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells = (0..u64::from(width) * u64::from(height))
        .map(|_| {
            if rng.random_bool(wet_fraction) {
                FlowCell {
                    has_water: true,
                    depth: rng.random_range(0.1..2.0),
                    vx: rng.random_range(-max_speed..=max_speed),
                    vy: rng.random_range(-max_speed..=max_speed),
                }
            } else {
                FlowCell::default()
            }
        })
        .collect();
    HydroGrid::from_cells(width, height, cells).expect("fixture cell count matches dimensions")
}
