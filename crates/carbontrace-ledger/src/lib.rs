//! Provenance storage for the carbontrace flow router.
//!
//! Holds the per-cell attribution ledgers that the routing engine fills
//! each pass, and the compacted table it exports when a run finishes.
//!
//! # Architecture
//!
//! ```text
//! LedgerPair (orchestrator)
//! ├── SourceLedger × 2 (alternating published/staging)
//! │   ├── Grid<Span>      per-cell (offset, len)
//! │   └── Vec<Source>     one contiguous entry buffer
//! └── generation counter
//!
//! CompactedSourceTable (export)
//! ├── Grid<u32> offsets, Grid<u32> sizes
//! └── xs / ys / amounts   parallel flat arrays
//! ```
//!
//! [`SourceCollection`] is the owned, per-cell form of a ledger span, used
//! as an accumulator while a destination cell gathers its inflows.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ledger;
pub mod pingpong;
pub mod source;
pub mod table;

pub use error::LedgerError;
pub use ledger::{SourceLedger, Span};
pub use pingpong::{LedgerPair, PassGuard};
pub use source::{Source, SourceCollection, Trimmed};
pub use table::CompactedSourceTable;
