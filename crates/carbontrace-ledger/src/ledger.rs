//! Contiguous per-grid provenance storage.
//!
//! A [`SourceLedger`] stores the provenance of every cell of a grid in one
//! growable `Vec<Source>`, with a [`Grid<Span>`] recording where each cell's
//! entries start and how many there are. Rebuilding a ledger each routing
//! pass reuses the same entry buffer, so the steady state does no per-cell
//! allocation.
//!
//! # Layout invariant
//!
//! Spans are stored in linear-index order: for cells `a < b` (by linear
//! index), `span(a).end() <= span(b).offset`. [`SourceLedger::push_cell`]
//! enforces this in debug builds, and [`SourceLedger::trim`] relies on it to
//! compact entries in place.

use carbontrace_core::{Cell, Grid};

use crate::error::LedgerError;
use crate::source::{Source, SourceCollection, Trimmed};

/// Location of one cell's entries inside a ledger's entry buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// Index of the first entry.
    pub offset: u32,
    /// Number of entries.
    pub len: u32,
}

impl Span {
    /// One past the last entry.
    pub fn end(self) -> usize {
        self.offset as usize + self.len as usize
    }

    fn range(self) -> std::ops::Range<usize> {
        self.offset as usize..self.end()
    }
}

/// All cells' provenance entries in one contiguous buffer.
#[derive(Clone, Debug)]
pub struct SourceLedger {
    spans: Grid<Span>,
    entries: Vec<Source>,
    /// Linear index of the last cell pushed since the last `clear()`.
    last_pushed: Option<usize>,
}

impl SourceLedger {
    /// An empty ledger covering a `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            spans: Grid::new(width, height),
            entries: Vec::new(),
            last_pushed: None,
        }
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.spans.width()
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.spans.height()
    }

    /// Seed every cell for which `exists` returns `true` with an identity
    /// entry (its full mass attributed to itself). Other cells stay empty.
    ///
    /// Counts first, reserves exactly, then fills.
    pub fn seed_identity(&mut self, exists: impl Fn(Cell) -> bool) -> Result<(), LedgerError> {
        self.clear();
        let count = (0..self.spans.size())
            .filter(|&i| exists(self.spans.cell_at(i)))
            .count();
        self.reserve(count)?;
        for i in 0..self.spans.size() {
            let cell = self.spans.cell_at(i);
            if exists(cell) {
                self.push_cell(cell, &[Source::new(cell, 1.0)])?;
            }
        }
        Ok(())
    }

    /// Empty every cell, keeping the entry buffer's allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.spans.reset();
        self.last_pushed = None;
    }

    /// Reserve room for `additional` more entries.
    ///
    /// Returns `Err(LedgerError::AllocationFailed)` if the allocator refuses.
    pub fn reserve(&mut self, additional: usize) -> Result<(), LedgerError> {
        self.entries
            .try_reserve(additional)
            .map_err(|_| LedgerError::AllocationFailed {
                requested: self.entries.len().saturating_add(additional),
            })
    }

    /// Append `cell`'s entries.
    ///
    /// Cells must be pushed in increasing linear-index order after a
    /// [`clear`](Self::clear), each at most once. `sources` must be
    /// duplicate-free.
    pub fn push_cell(&mut self, cell: Cell, sources: &[Source]) -> Result<(), LedgerError> {
        let idx = self.spans.index_of(cell);
        debug_assert!(
            self.last_pushed.is_none_or(|last| last < idx),
            "cell {cell} pushed out of linear-index order"
        );
        debug_assert!(crate::source::is_duplicate_free(sources));

        let offset = u32::try_from(self.entries.len()).map_err(|_| LedgerError::SpanOverflow {
            entries: self.entries.len(),
        })?;
        let len = u32::try_from(sources.len()).map_err(|_| LedgerError::SpanOverflow {
            entries: sources.len(),
        })?;
        self.reserve(sources.len())?;
        self.entries.extend_from_slice(sources);
        self.spans[idx] = Span { offset, len };
        self.last_pushed = Some(idx);
        Ok(())
    }

    /// The entries recorded for `cell`.
    pub fn sources(&self, cell: Cell) -> &[Source] {
        &self.entries[self.spans[cell].range()]
    }

    /// The entries recorded for the cell at linear index `i`.
    pub fn sources_at_index(&self, i: usize) -> &[Source] {
        &self.entries[self.spans[i].range()]
    }

    /// Copy `cell`'s entries into an owned [`SourceCollection`].
    pub fn collection(&self, cell: Cell) -> SourceCollection {
        let mut out = SourceCollection::with_capacity(self.spans[cell].len as usize);
        out.add_sources(self.sources(cell));
        out
    }

    /// Span of `cell`.
    pub fn span(&self, cell: Cell) -> Span {
        self.spans[cell]
    }

    /// Sum of `cell`'s amounts.
    pub fn mass(&self, cell: Cell) -> f64 {
        self.sources(cell).iter().map(|s| s.amount).sum()
    }

    /// Total number of entries across all cells.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Memory held by the entry buffer, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<Source>()
            + self.spans.size() * std::mem::size_of::<Span>()
    }

    /// Drop every entry whose amount is `<= threshold`, compacting the
    /// buffer in place.
    pub fn trim(&mut self, threshold: f64) -> Trimmed {
        let mut trimmed = Trimmed::default();
        let mut write = 0usize;
        for i in 0..self.spans.size() {
            let span = self.spans[i];
            let start = write;
            for read in span.range() {
                let entry = self.entries[read];
                if entry.amount > threshold {
                    self.entries[write] = entry;
                    write += 1;
                } else {
                    trimmed.entries += 1;
                    trimmed.mass += entry.amount;
                }
            }
            // `start <= span.offset` by the layout invariant, and both fit in
            // u32 because the buffer only shrinks here.
            self.spans[i] = Span {
                offset: start as u32,
                len: (write - start) as u32,
            };
        }
        self.entries.truncate(write);
        trimmed
    }

    /// Exchange contents with `other` in O(1).
    ///
    /// # Panics
    ///
    /// Panics if the ledgers cover different grid dimensions.
    pub fn swap(&mut self, other: &mut SourceLedger) {
        self.spans.swap(&mut other.spans);
        std::mem::swap(&mut self.entries, &mut other.entries);
        std::mem::swap(&mut self.last_pushed, &mut other.last_pushed);
    }

    /// The per-cell span grid.
    pub fn spans(&self) -> &Grid<Span> {
        &self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u32, y: u32) -> Cell {
        Cell::new(x, y)
    }

    #[test]
    fn new_ledger_is_empty() {
        let l = SourceLedger::new(3, 2);
        assert_eq!(l.entry_count(), 0);
        assert!(l.sources(c(2, 1)).is_empty());
    }

    #[test]
    fn seed_identity_skips_missing_cells() {
        let mut l = SourceLedger::new(3, 3);
        l.seed_identity(|cell| cell != c(1, 1)).unwrap();
        assert_eq!(l.entry_count(), 8);
        assert!(l.sources(c(1, 1)).is_empty());
        assert_eq!(l.sources(c(2, 0)), &[Source::new(c(2, 0), 1.0)]);
        assert_eq!(l.mass(c(0, 2)), 1.0);
    }

    #[test]
    fn push_cell_records_spans() {
        let mut l = SourceLedger::new(2, 2);
        l.push_cell(c(1, 0), &[Source::new(c(0, 0), 0.5), Source::new(c(1, 0), 0.5)])
            .unwrap();
        l.push_cell(c(1, 1), &[Source::new(c(1, 1), 1.0)]).unwrap();
        assert_eq!(l.span(c(1, 0)), Span { offset: 0, len: 2 });
        assert_eq!(l.span(c(1, 1)), Span { offset: 2, len: 1 });
        assert_eq!(l.span(c(0, 0)), Span::default());
        assert_eq!(l.collection(c(1, 0)).get(c(0, 0)), Some(0.5));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut l = SourceLedger::new(4, 4);
        l.seed_identity(|_| true).unwrap();
        let bytes = l.memory_bytes();
        l.clear();
        assert_eq!(l.entry_count(), 0);
        assert_eq!(l.memory_bytes(), bytes);
        assert!(l.sources(c(3, 3)).is_empty());
    }

    #[test]
    fn trim_compacts_in_place() {
        let mut l = SourceLedger::new(3, 1);
        l.push_cell(
            c(0, 0),
            &[Source::new(c(0, 0), 0.00001), Source::new(c(1, 0), 0.9)],
        )
        .unwrap();
        l.push_cell(c(1, 0), &[Source::new(c(1, 0), 0.00002)]).unwrap();
        l.push_cell(
            c(2, 0),
            &[Source::new(c(2, 0), 0.7), Source::new(c(0, 0), 0.3)],
        )
        .unwrap();

        let t = l.trim(0.0001);
        assert_eq!(t.entries, 2);
        assert_eq!(l.entry_count(), 3);
        assert_eq!(l.sources(c(0, 0)), &[Source::new(c(1, 0), 0.9)]);
        assert!(l.sources(c(1, 0)).is_empty());
        assert_eq!(
            l.sources(c(2, 0)),
            &[Source::new(c(2, 0), 0.7), Source::new(c(0, 0), 0.3)]
        );
        assert_eq!(l.span(c(2, 0)), Span { offset: 1, len: 2 });
    }

    #[test]
    fn trim_twice_is_trim_once() {
        let mut l = SourceLedger::new(2, 1);
        l.push_cell(
            c(0, 0),
            &[Source::new(c(0, 0), 0.00001), Source::new(c(1, 0), 0.5)],
        )
        .unwrap();
        l.trim(0.0001);
        let snapshot: Vec<Source> = l.sources(c(0, 0)).to_vec();
        assert_eq!(l.trim(0.0001), Trimmed::default());
        assert_eq!(l.sources(c(0, 0)), snapshot.as_slice());
    }

    #[test]
    fn swap_exchanges_ledgers() {
        let mut a = SourceLedger::new(2, 2);
        a.seed_identity(|_| true).unwrap();
        let mut b = SourceLedger::new(2, 2);
        a.swap(&mut b);
        assert_eq!(a.entry_count(), 0);
        assert_eq!(b.entry_count(), 4);
        assert_eq!(b.mass(c(1, 1)), 1.0);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn swap_rejects_mismatched_ledgers() {
        let mut a = SourceLedger::new(2, 2);
        let mut b = SourceLedger::new(4, 1);
        a.swap(&mut b);
    }
}
