//! Core types for the carbontrace provenance router.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! dense [`Grid`] container, the [`Cell`] coordinate, and the
//! [`Hydrology`] collaborator trait through which the routing engine
//! reads grid extent, patch existence, and velocity.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod grid;
pub mod hydrology;

pub use cell::Cell;
pub use error::GridError;
pub use grid::Grid;
pub use hydrology::{FlowCell, HydroGrid, Hydrology};
