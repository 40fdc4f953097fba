//! Read-only export of a finished provenance run.
//!
//! A [`CompactedSourceTable`] stores every retained attribution in three
//! parallel flat arrays (`xs`, `ys`, `amounts`) with per-cell offset and
//! size grids indexing into them. Cells are laid out in column-major scan
//! order (x outer, y inner).

use std::fmt;

use carbontrace_core::{Cell, Grid};

use crate::error::LedgerError;
use crate::ledger::SourceLedger;
use crate::source::Source;

/// Flat, randomly-indexable attribution table.
///
/// Immutable after construction. For each cell, `offsets[cell]` and
/// `sizes[cell]` select that cell's slice of the flat arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactedSourceTable {
    offsets: Grid<u32>,
    sizes: Grid<u32>,
    xs: Vec<u32>,
    ys: Vec<u32>,
    amounts: Vec<f64>,
}

impl CompactedSourceTable {
    /// Compact `ledger` into flat arrays.
    ///
    /// The flat arrays are sized exactly from the ledger's entry count
    /// before any copying. Fails if that allocation is refused or the
    /// count does not fit a `u32` offset.
    pub fn from_ledger(ledger: &SourceLedger) -> Result<Self, LedgerError> {
        let total = ledger.entry_count();
        if u32::try_from(total).is_err() {
            return Err(LedgerError::SpanOverflow { entries: total });
        }

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut amounts = Vec::new();
        for reserve in [
            xs.try_reserve_exact(total),
            ys.try_reserve_exact(total),
            amounts.try_reserve_exact(total),
        ] {
            reserve.map_err(|_| LedgerError::AllocationFailed { requested: total })?;
        }

        let spans = ledger.spans();
        let mut offsets = Grid::new(spans.width(), spans.height());
        let mut sizes = Grid::new(spans.width(), spans.height());
        for cell in spans.cells() {
            let sources = ledger.sources(cell);
            // Both bounded by `total`, checked above.
            offsets[cell] = xs.len() as u32;
            sizes[cell] = sources.len() as u32;
            for s in sources {
                xs.push(s.origin.x);
                ys.push(s.origin.y);
                amounts.push(s.amount);
            }
        }

        Ok(Self {
            offsets,
            sizes,
            xs,
            ys,
            amounts,
        })
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.offsets.width()
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.offsets.height()
    }

    /// Number of retained attributions across all cells.
    pub fn total_sources(&self) -> usize {
        self.amounts.len()
    }

    /// `(offset, size)` of `cell`'s slice of the flat arrays.
    pub fn span(&self, cell: Cell) -> (usize, usize) {
        (self.offsets[cell] as usize, self.sizes[cell] as usize)
    }

    /// The attributions recorded for `cell`.
    pub fn sources_at(&self, cell: Cell) -> impl ExactSizeIterator<Item = Source> + '_ {
        let (offset, size) = self.span(cell);
        (offset..offset + size)
            .map(move |i| Source::new(Cell::new(self.xs[i], self.ys[i]), self.amounts[i]))
    }

    /// Sum of `cell`'s retained amounts.
    pub fn retained_mass(&self, cell: Cell) -> f64 {
        let (offset, size) = self.span(cell);
        self.amounts[offset..offset + size].iter().sum()
    }

    /// Per-cell offsets into the flat arrays.
    pub fn offsets(&self) -> &Grid<u32> {
        &self.offsets
    }

    /// Per-cell entry counts.
    pub fn sizes(&self) -> &Grid<u32> {
        &self.sizes
    }

    /// Origin x coordinates.
    pub fn xs(&self) -> &[u32] {
        &self.xs
    }

    /// Origin y coordinates.
    pub fn ys(&self) -> &[u32] {
        &self.ys
    }

    /// Attributed amounts.
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// Write the diagnostic dump: one line per attribution, in scan order,
    /// formatted as `(x,y) receives P% from (sx,sy)`.
    ///
    /// `P` is printed with six significant digits and trailing zeros
    /// removed, switching to exponent notation below `1e-4` (`33.3333`,
    /// `100`, `1.5e-05`).
    pub fn write_dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for cell in self.offsets.cells() {
            for s in self.sources_at(cell) {
                let percent = Significant(s.amount * 100.0);
                writeln!(out, "{cell} receives {percent}% from {}", s.origin)?;
            }
        }
        Ok(())
    }

    /// The diagnostic dump as a string.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CompactedSourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_dump(f)
    }
}

/// Six significant digits, shortest form.
struct Significant(f64);

impl Significant {
    const DIGITS: i32 = 6;
}

impl fmt::Display for Significant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v == 0.0 || !v.is_finite() {
            return write!(f, "{v}");
        }
        // Round first so that e.g. 99.99999 reports exponent 2, not 1.
        let sci = format!("{:.*e}", (Self::DIGITS - 1) as usize, v);
        let (mantissa, exp) = match sci.split_once('e') {
            Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
            None => (sci.as_str(), 0),
        };
        if exp < -4 || exp >= Self::DIGITS {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{sign}{:02}", strip_zeros(mantissa), exp.abs())
        } else {
            let fixed = format!("{:.*}", (Self::DIGITS - 1 - exp) as usize, v);
            f.write_str(strip_zeros(&fixed))
        }
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
