//! Double-buffered ledger pair.
//!
//! [`LedgerPair`] holds two [`SourceLedger`]s that alternate between the
//! "published" role (the previous pass, read-only) and the "staging" role
//! (the pass being built). Routing never reads what it writes within a pass.
//!
//! The lifecycle per pass is:
//! 1. `begin_pass()`: clear the staging ledger, hand out a [`PassGuard`]
//! 2. The caller reads `guard.previous` and pushes into `guard.next`
//! 3. `publish()`: staging becomes published, generation advances

use carbontrace_core::Cell;

use crate::error::LedgerError;
use crate::ledger::SourceLedger;

/// Split borrows into both ledgers for the duration of one pass.
///
/// Created by [`LedgerPair::begin_pass()`] and dropped before
/// [`LedgerPair::publish()`].
#[must_use]
pub struct PassGuard<'a> {
    /// The published ledger from the previous pass.
    pub previous: &'a SourceLedger,
    /// The cleared staging ledger to fill.
    pub next: &'a mut SourceLedger,
}

/// Two ledgers with ping-pong swap.
///
/// ```text
/// ledger_a  ←─── staging (even passes) / published (odd)
/// ledger_b  ←─── published (even passes) / staging (odd)
/// ```
#[derive(Debug)]
pub struct LedgerPair {
    ledger_a: SourceLedger,
    ledger_b: SourceLedger,
    /// Completed passes.
    generation: u32,
    /// Whether `begin_pass()` was called and `publish()` not yet.
    pass_in_progress: bool,
    /// Which ledger is currently staging (false = A staging, true = B staging).
    b_is_staging: bool,
}

impl LedgerPair {
    /// A pair whose published ledger is seeded with identity entries for
    /// every cell `exists` accepts.
    pub fn seeded(
        width: u32,
        height: u32,
        exists: impl Fn(Cell) -> bool,
    ) -> Result<Self, LedgerError> {
        let ledger_a = SourceLedger::new(width, height);
        let mut ledger_b = SourceLedger::new(width, height);
        ledger_b.seed_identity(exists)?;
        Ok(Self {
            ledger_a,
            ledger_b,
            generation: 0,
            pass_in_progress: false,
            b_is_staging: false,
        })
    }

    /// Begin a pass: clear the staging ledger and return split borrows.
    pub fn begin_pass(&mut self) -> Result<PassGuard<'_>, LedgerError> {
        if self.generation == u32::MAX {
            return Err(LedgerError::GenerationOverflow);
        }
        self.pass_in_progress = true;
        let (previous, next) = if self.b_is_staging {
            (&self.ledger_a, &mut self.ledger_b)
        } else {
            (&self.ledger_b, &mut self.ledger_a)
        };
        next.clear();
        Ok(PassGuard { previous, next })
    }

    /// Make the staging ledger the published one.
    ///
    /// Returns `Err(LedgerError::NoPassInProgress)` if `begin_pass()` was
    /// not called first, or if `publish()` is called twice in a row.
    pub fn publish(&mut self) -> Result<(), LedgerError> {
        if !self.pass_in_progress {
            return Err(LedgerError::NoPassInProgress);
        }
        self.pass_in_progress = false;
        self.b_is_staging = !self.b_is_staging;
        self.generation += 1;
        Ok(())
    }

    /// The most recently published ledger.
    pub fn published(&self) -> &SourceLedger {
        if self.b_is_staging {
            &self.ledger_a
        } else {
            &self.ledger_b
        }
    }

    /// Number of passes published so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Memory held by both ledgers, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.ledger_a.memory_bytes() + self.ledger_b.memory_bytes()
    }

    /// Consume the pair, keeping only the published ledger.
    pub fn into_published(self) -> SourceLedger {
        if self.b_is_staging {
            self.ledger_a
        } else {
            self.ledger_b
        }
    }
}
