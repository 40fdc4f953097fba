//! Test utilities and mock types for carbontrace development.
//!
//! Provides hydrology fixtures (see [`fixtures`]), a call-counting
//! [`MockHydrology`], and float assertion helpers shared by the
//! integration tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell as CallCounter;

use carbontrace_core::{Cell, HydroGrid, Hydrology};
use carbontrace_ledger::{CompactedSourceTable, Source};

/// Default tolerance for accumulated floating-point error.
pub const EPS: f64 = 1e-9;

/// Panics unless `a` and `b` differ by at most `eps`.
#[track_caller]
pub fn assert_close(a: f64, b: f64, eps: f64) {
    assert!(
        (a - b).abs() <= eps,
        "expected {b}, got {a} (|diff| = {} > {eps})",
        (a - b).abs()
    );
}

/// Sum of the amounts in `sources`.
pub fn mass(sources: &[Source]) -> f64 {
    sources.iter().map(|s| s.amount).sum()
}

/// The amount attributed to `origin` in `sources`, or 0 if absent.
pub fn amount_from(sources: &[Source], origin: Cell) -> f64 {
    sources
        .iter()
        .find(|s| s.origin == origin)
        .map_or(0.0, |s| s.amount)
}

/// Collect `cell`'s attributions from a table.
pub fn table_sources(table: &CompactedSourceTable, cell: Cell) -> Vec<Source> {
    table.sources_at(cell).collect()
}

/// Mock [`Hydrology`] that wraps a [`HydroGrid`] and counts calls.
///
/// Used to check that the engine reads velocities once per run rather
/// than once per step.
pub struct MockHydrology {
    inner: HydroGrid,
    exists_calls: CallCounter<usize>,
    vector_calls: CallCounter<usize>,
}

impl MockHydrology {
    pub fn new(inner: HydroGrid) -> Self {
        Self {
            inner,
            exists_calls: CallCounter::new(0),
            vector_calls: CallCounter::new(0),
        }
    }

    /// Number of `patch_exists` calls so far.
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.get()
    }

    /// Number of `flow_vector` calls so far.
    pub fn vector_calls(&self) -> usize {
        self.vector_calls.get()
    }
}

impl Hydrology for MockHydrology {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn patch_exists(&self, cell: Cell) -> bool {
        self.exists_calls.set(self.exists_calls.get() + 1);
        self.inner.patch_exists(cell)
    }

    fn flow_vector(&self, cell: Cell) -> [f64; 2] {
        self.vector_calls.set(self.vector_calls.get() + 1);
        self.inner.flow_vector(cell)
    }
}
