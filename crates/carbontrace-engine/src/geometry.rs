//! Flow-target geometry.
//!
//! A cell's water is modelled as a unit square that travels by the cell's
//! displacement for one step. Wherever the square lands it overlaps at most
//! four cells: the cell containing its lower-left corner (A) and that
//! cell's east (B), north (C) and north-east (D) neighbours. Each existing
//! candidate receives the fraction of the square it overlaps.
//!
//! All coordinates here are in cell units: the displaced corner of cell
//! `(x, y)` is `(x + dx, y + dy)`, where `(dx, dy)` is the velocity times
//! the step time divided by the cell side length.

use smallvec::SmallVec;

use carbontrace_core::{Cell, Hydrology};

/// One catchment cell and the fraction of the source's mass it receives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowTarget {
    /// Receiving cell.
    pub cell: Cell,
    /// Overlap fraction in `(0, 1]`.
    pub weight: f64,
}

/// The outflow of one cell for one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowTargets {
    /// Existing catchment cells with non-zero overlap, in A, B, C, D order.
    pub targets: SmallVec<[FlowTarget; 4]>,
    /// Whether the displacement exceeds one cell on either axis. Such
    /// flows jump over the cells in between.
    pub overshoots: bool,
}

impl FlowTargets {
    /// Total fraction leaving toward the targets.
    pub fn pushed(&self) -> f64 {
        self.targets.iter().map(|t| t.weight).sum()
    }

    /// Fraction that stays in the source cell on top of any target that is
    /// the source cell itself. Never negative.
    pub fn stationary(&self) -> f64 {
        (1.0 - self.pushed()).max(0.0)
    }
}

/// Displacement in cells for `velocity` (m/s) over one step.
pub fn displacement(velocity: [f64; 2], cells_per_unit_velocity: f64) -> [f64; 2] {
    [
        velocity[0] * cells_per_unit_velocity,
        velocity[1] * cells_per_unit_velocity,
    ]
}

/// Compute where `origin`'s water lands after moving by `displacement`
/// cells.
///
/// Candidates outside the grid or for which the hydrology reports no patch
/// are omitted; their share becomes part of the stationary remainder.
/// Candidates whose overlap clamps to zero are omitted as well.
///
/// `displacement` must be finite. Non-finite input yields no targets.
pub fn flow_targets<H: Hydrology + ?Sized>(
    hydrology: &H,
    origin: Cell,
    displacement: [f64; 2],
) -> FlowTargets {
    let [dx, dy] = displacement;
    if !dx.is_finite() || !dy.is_finite() {
        return FlowTargets::default();
    }

    let (width, height) = (hydrology.width(), hydrology.height());
    let mut out = FlowTargets {
        targets: SmallVec::new(),
        overshoots: dx.abs() > 1.0 || dy.abs() > 1.0,
    };

    let px = f64::from(origin.x) + dx;
    let py = f64::from(origin.y) + dy;
    let ax = px.floor();
    let ay = py.floor();
    // A corner at -1 still reaches column or row 0 through B, C or D.
    if ax < -1.0 || ay < -1.0 || ax >= f64::from(width) || ay >= f64::from(height) {
        return out;
    }
    // Fractional position of the landed corner inside cell A.
    let fx = px - ax;
    let fy = py - ay;

    // Bounded by the grid extent above, so the casts are exact.
    let (ax, ay) = (ax as i64, ay as i64);
    let candidates = [
        (ax, ay, (1.0 - fx) * (1.0 - fy)),
        (ax + 1, ay, fx * (1.0 - fy)),
        (ax, ay + 1, (1.0 - fx) * fy),
        (ax + 1, ay + 1, fx * fy),
    ];

    for (cx, cy, overlap) in candidates {
        let weight = clamp_overlap(overlap);
        if weight == 0.0 {
            continue;
        }
        let Some(cell) = Cell::from_signed_within(cx, cy, width, height) else {
            continue;
        };
        if hydrology.patch_exists(cell) {
            out.targets.push(FlowTarget { cell, weight });
        }
    }
    out
}

/// Negative or NaN overlaps become 0.
fn clamp_overlap(overlap: f64) -> f64 {
    if overlap > 0.0 {
        overlap
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbontrace_core::HydroGrid;

    fn c(x: u32, y: u32) -> Cell {
        Cell::new(x, y)
    }

    fn weight_of(t: &FlowTargets, cell: Cell) -> Option<f64> {
        t.targets.iter().find(|t| t.cell == cell).map(|t| t.weight)
    }

    #[test]
    fn displacement_scales_velocity() {
        // 0.125 m/s over 60 s on a 30 m cell is a quarter cell.
        assert_eq!(displacement([0.125, -0.25], 2.0), [0.25, -0.5]);
    }

    #[test]
    fn zero_displacement_targets_self_only() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(1, 1), [0.0, 0.0]);
        assert_eq!(t.targets.len(), 1);
        assert_eq!(t.targets[0], FlowTarget { cell: c(1, 1), weight: 1.0 });
        assert_eq!(t.pushed(), 1.0);
        assert_eq!(t.stationary(), 0.0);
        assert!(!t.overshoots);
    }

    #[test]
    fn quarter_cell_east_splits_three_to_one() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(1, 1), [0.25, 0.0]);
        assert_eq!(weight_of(&t, c(1, 1)), Some(0.75));
        assert_eq!(weight_of(&t, c(2, 1)), Some(0.25));
        // C and D have zero overlap and are omitted.
        assert_eq!(t.targets.len(), 2);
    }

    #[test]
    fn diagonal_shift_uses_all_four() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(0, 0), [0.5, 0.5]);
        assert_eq!(t.targets.len(), 4);
        for cell in [c(0, 0), c(1, 0), c(0, 1), c(1, 1)] {
            assert_eq!(weight_of(&t, cell), Some(0.25));
        }
        assert_eq!(t.pushed(), 1.0);
    }

    #[test]
    fn westward_shift_floors_into_neighbour() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(1, 1), [-0.25, 0.0]);
        assert_eq!(weight_of(&t, c(0, 1)), Some(0.25));
        assert_eq!(weight_of(&t, c(1, 1)), Some(0.75));
    }

    #[test]
    fn missing_candidate_becomes_stationary() {
        let mut h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        h.set_dry(c(2, 1));
        let t = flow_targets(&h, c(1, 1), [0.25, 0.0]);
        assert_eq!(t.targets.len(), 1);
        assert_eq!(t.pushed(), 0.75);
        assert_eq!(t.stationary(), 0.25);
    }

    #[test]
    fn catchment_outside_grid_pushes_nothing() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(2, 2), [1.5, 1.5]);
        assert!(t.targets.is_empty());
        assert_eq!(t.pushed(), 0.0);
        assert_eq!(t.stationary(), 1.0);
        assert!(t.overshoots);
    }

    #[test]
    fn negative_corner_outside_grid() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(0, 0), [-0.5, 0.0]);
        // A = (-1, 0) is outside; B = (0, 0) keeps half.
        assert_eq!(t.targets.len(), 1);
        assert_eq!(weight_of(&t, c(0, 0)), Some(0.5));
        assert_eq!(t.stationary(), 0.5);
    }

    #[test]
    fn long_displacement_lands_far_away() {
        let h = HydroGrid::uniform(8, 1, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(0, 0), [3.0, 0.0]);
        assert!(t.overshoots);
        assert_eq!(t.targets.len(), 1);
        assert_eq!(weight_of(&t, c(3, 0)), Some(1.0));
    }

    #[test]
    fn huge_finite_displacement_leaves_grid() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        for shift in [[1e20, 0.0], [-1e20, 0.0], [0.0, 1e20], [f64::MAX, f64::MAX]] {
            let t = flow_targets(&h, c(1, 1), shift);
            assert!(t.targets.is_empty(), "{shift:?}");
            assert_eq!(t.stationary(), 1.0);
            assert!(t.overshoots);
        }
    }

    #[test]
    fn corner_just_west_of_grid_still_reaches_column_zero() {
        let h = HydroGrid::uniform(3, 3, 0.0, 0.0).unwrap();
        let t = flow_targets(&h, c(0, 0), [-0.75, 0.0]);
        assert_eq!(weight_of(&t, c(0, 0)), Some(0.25));
        assert_eq!(t.targets.len(), 1);
    }

    #[test]
    fn clamp_overlap_rejects_nan_and_negative() {
        assert_eq!(clamp_overlap(f64::NAN), 0.0);
        assert_eq!(clamp_overlap(-1e-18), 0.0);
        assert_eq!(clamp_overlap(0.5), 0.5);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn weights_are_a_partition(
                x in 0u32..6,
                y in 0u32..6,
                dx in -0.99f64..0.99,
                dy in -0.99f64..0.99,
            ) {
                let h = HydroGrid::uniform(6, 6, 0.0, 0.0).unwrap();
                let t = flow_targets(&h, c(x, y), [dx, dy]);
                prop_assert!(t.targets.len() <= 4);
                for target in &t.targets {
                    prop_assert!(target.weight > 0.0 && target.weight <= 1.0);
                }
                let pushed = t.pushed();
                prop_assert!(pushed <= 1.0 + 1e-12);
                prop_assert!((pushed + t.stationary() - 1.0).abs() < 1e-12);
            }
        }
    }
}
