//! carbontrace: carbon provenance tracking over hydrological flow grids.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all carbontrace sub-crates. For most users, adding `carbontrace` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use carbontrace::prelude::*;
//!
//! // 3x3 patches of water, each moving 0.125 m/s east: a quarter of a
//! // 30 m cell per 60 s step.
//! let hydro = HydroGrid::uniform(3, 3, 0.125, 0.0).unwrap();
//! let table = trace(&hydro, 2).unwrap();
//!
//! let centre: Vec<Source> = table.sources_at(Cell::new(1, 1)).collect();
//! assert_eq!(centre.len(), 2);
//! assert_eq!(table.retained_mass(Cell::new(1, 1)), 0.9375);
//!
//! for line in table.dump().lines().take(3) {
//!     println!("{line}");
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `carbontrace-core` | `Cell`, `Grid`, the `Hydrology` trait, `HydroGrid` |
//! | [`ledger`] | `carbontrace-ledger` | Source ledgers, ping-pong pair, compacted table |
//! | [`engine`] | `carbontrace-engine` | Configuration, geometry, routing plan, engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the hydrology collaborator trait (`carbontrace-core`).
///
/// Implement [`types::Hydrology`] to route over your own velocity data, or
/// fill a [`types::HydroGrid`].
pub use carbontrace_core as types;

/// Provenance storage (`carbontrace-ledger`).
///
/// [`ledger::CompactedSourceTable`] is the exported result of a run.
pub use carbontrace_ledger as ledger;

/// Flow routing (`carbontrace-engine`).
///
/// [`engine::FlowRoutingEngine`] for stepwise runs, [`engine::trace`] for
/// one-call runs with the default geometry.
pub use carbontrace_engine as engine;

/// Common imports for typical carbontrace usage.
///
/// ```rust
/// use carbontrace::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use carbontrace_core::{Cell, FlowCell, Grid, HydroGrid, Hydrology};

    // Results
    pub use carbontrace_ledger::{CompactedSourceTable, Source, SourceCollection};

    // Engine
    pub use carbontrace_engine::{
        trace, FlowRoutingEngine, RoutingConfig, RunMetrics, RunOutput,
    };

    // Errors
    pub use carbontrace_core::GridError;
    pub use carbontrace_engine::{ConfigError, RoutingError};
    pub use carbontrace_ledger::LedgerError;
}
