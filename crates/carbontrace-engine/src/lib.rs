//! Flow-routing engine for carbon provenance.
//!
//! Given a [`Hydrology`](carbontrace_core::Hydrology) velocity field, the
//! engine moves every wet patch's water across the grid for a fixed number
//! of steps and records, for every patch, what fraction of its current
//! contents came from each origin patch.
//!
//! # Pipeline
//!
//! ```text
//! RoutingConfig ──validate──┐
//! Hydrology ──compile──> RoutingPlan (inflows by destination)
//!                           │
//!                 FlowRoutingEngine
//!                 ├── step() × iterations   gather into staging ledger
//!                 └── finish()              trim once, compact
//!                           │
//!                  CompactedSourceTable + RunMetrics
//! ```
//!
//! The engine is single-threaded and never blocks. The library emits
//! diagnostics through the `log` facade and never installs a logger.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod plan;

pub use config::{ConfigError, RoutingConfig, RoutingConfigBuilder};
pub use engine::{trace, FlowRoutingEngine, RunOutput};
pub use error::RoutingError;
pub use geometry::{flow_targets, FlowTarget, FlowTargets};
pub use metrics::RunMetrics;
pub use plan::{Inflow, RoutingPlan};
