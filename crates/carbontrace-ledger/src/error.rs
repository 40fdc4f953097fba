//! Ledger-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while building or compacting provenance storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// The allocator refused to grow an entry buffer.
    AllocationFailed {
        /// Number of entries the buffer needed to hold.
        requested: usize,
    },
    /// An entry count no longer fits in the 32-bit offsets used by spans
    /// and compacted tables.
    SpanOverflow {
        /// The count that overflowed.
        entries: usize,
    },
    /// `publish()` was called on a [`LedgerPair`](crate::LedgerPair)
    /// without a preceding `begin_pass()`.
    NoPassInProgress,
    /// The pass counter reached `u32::MAX`.
    GenerationOverflow,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { requested } => {
                write!(f, "failed to allocate room for {requested} source entries")
            }
            Self::SpanOverflow { entries } => {
                write!(f, "{entries} source entries exceed the 32-bit offset range")
            }
            Self::NoPassInProgress => {
                write!(f, "publish() called without a preceding begin_pass()")
            }
            Self::GenerationOverflow => {
                write!(f, "pass counter overflow (u32::MAX passes reached)")
            }
        }
    }
}

impl Error for LedgerError {}
