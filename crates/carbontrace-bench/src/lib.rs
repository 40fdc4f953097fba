//! Benchmark profiles for the carbontrace provenance router.
//!
//! Provides pre-built hydrology profiles for benchmarking and examples:
//!
//! - [`reference_profile`]: 100x100 grid (10K patches), mostly wet
//! - [`stress_profile`]: 316x316 grid (~100K patches)
//! - [`river_profile`]: a single meandering channel through dry land

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use carbontrace_core::{FlowCell, GridError, HydroGrid};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Iteration count used by the full-run benchmarks.
pub const REFERENCE_ITERATIONS: u32 = 20;

/// Build a reference benchmark profile: 100x100 grid (10K patches).
///
/// 90% of patches are wet, with speeds up to 0.4 m/s on each axis (0.8 of
/// a cell per step under the default geometry).
pub fn reference_profile(seed: u64) -> Result<HydroGrid, GridError> {
    random_field(100, 100, seed, 0.4, 0.9)
}

/// Build a stress benchmark profile: 316x316 grid (~100K patches).
///
/// Same distribution as [`reference_profile`] at 10x the patch count.
pub fn stress_profile(seed: u64) -> Result<HydroGrid, GridError> {
    random_field(316, 316, seed, 0.4, 0.9)
}

/// Build a channel profile: a sine-shaped river three patches wide across
/// a `width x height` dry grid, flowing east.
pub fn river_profile(width: u32, height: u32) -> Result<HydroGrid, GridError> {
    let mut cells = vec![FlowCell::default(); width as usize * height as usize];
    let mid = f64::from(height) / 2.0;
    let amplitude = f64::from(height) / 4.0;
    for x in 0..width {
        let phase = f64::from(x) / f64::from(width) * std::f64::consts::TAU;
        let centre = (mid + amplitude * phase.sin()).round() as i64;
        let slope = amplitude * phase.cos() * std::f64::consts::TAU / f64::from(width);
        for y in centre - 1..=centre + 1 {
            if y < 0 || y >= i64::from(height) {
                continue;
            }
            let i = y as usize * width as usize + x as usize;
            cells[i] = FlowCell {
                has_water: true,
                depth: 1.5,
                vx: 0.3,
                vy: 0.3 * slope,
            };
        }
    }
    HydroGrid::from_cells(width, height, cells)
}

fn random_field(
    width: u32,
    height: u32,
    seed: u64,
    max_speed: f64,
    wet_fraction: f64,
) -> Result<HydroGrid, GridError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells = (0..width as usize * height as usize)
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
    HydroGrid::from_cells(width, height, cells)
}
