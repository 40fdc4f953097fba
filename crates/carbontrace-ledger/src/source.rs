//! Provenance entries and the per-cell collection that merges them.
//!
//! A [`Source`] attributes a fraction of a cell's carbon to an origin
//! cell. A [`SourceCollection`] holds at most one entry per origin;
//! every insertion path merges by summation, so the collection never
//! contains duplicate origins.

use carbontrace_core::Cell;

/// One provenance entry: `amount` of a cell's mass came from `origin`.
///
/// `amount` is a fraction of one cell's initial mass. It is never clamped;
/// only [`SourceCollection::trim`] removes small entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Source {
    /// The cell this carbon originated from.
    pub origin: Cell,
    /// Fraction of the origin cell's initial mass.
    pub amount: f64,
}

impl Source {
    /// Create a new entry.
    pub const fn new(origin: Cell, amount: f64) -> Self {
        Self { origin, amount }
    }
}

/// Entries and mass removed by a trim pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Trimmed {
    /// Number of entries dropped.
    pub entries: usize,
    /// Sum of the dropped amounts.
    pub mass: f64,
}

/// A duplicate-free set of [`Source`] entries for one cell.
///
/// Lookup is a linear scan. Collections stay small: their size is bounded
/// by the number of distinct origins reachable within the configured
/// iteration count.
///
/// # Examples
///
/// ```
/// use carbontrace_core::Cell;
/// use carbontrace_ledger::SourceCollection;
///
/// let mut sources = SourceCollection::identity(Cell::new(2, 3));
/// sources.add_source(Cell::new(1, 3), 0.25);
/// sources.add_source(Cell::new(2, 3), 0.5);
/// assert_eq!(sources.len(), 2);
/// assert_eq!(sources.get(Cell::new(2, 3)), Some(1.5));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceCollection {
    sources: Vec<Source>,
}

impl SourceCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty collection with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sources: Vec::with_capacity(capacity),
        }
    }

    /// The seed state of an existing cell: all of its mass is its own.
    pub fn identity(cell: Cell) -> Self {
        Self {
            sources: vec![Source::new(cell, 1.0)],
        }
    }

    /// Add `amount` attributed to `origin`, merging with an existing entry
    /// for the same origin.
    pub fn add_source(&mut self, origin: Cell, amount: f64) {
        match self.sources.iter_mut().find(|s| s.origin == origin) {
            Some(existing) => existing.amount += amount,
            None => self.sources.push(Source::new(origin, amount)),
        }
    }

    /// Merge every entry of `sources` into this collection.
    ///
    /// The result does not depend on the order of `sources`.
    pub fn add_sources(&mut self, sources: &[Source]) {
        for s in sources {
            self.add_source(s.origin, s.amount);
        }
    }

    /// Merge every entry of `sources`, each scaled by `fraction`.
    ///
    /// Equivalent to `self.add_sources(scaled.as_slice())` where `scaled`
    /// is a [`scaled_copy`](Self::scaled_copy), without the intermediate
    /// allocation.
    pub fn add_scaled(&mut self, sources: &[Source], fraction: f64) {
        for s in sources {
            self.add_source(s.origin, s.amount * fraction);
        }
    }

    /// Replace the contents with `sources` scaled by `fraction`.
    ///
    /// `sources` must be duplicate-free (any slice taken from a collection
    /// or a ledger is). Skips the merge scan, so it is the cheap way to
    /// seed an accumulator with its first contribution.
    pub fn assign_scaled(&mut self, sources: &[Source], fraction: f64) {
        debug_assert!(is_duplicate_free(sources), "assign_scaled input has duplicate origins");
        self.sources.clear();
        self.sources.extend_from_slice(sources);
        self.scale_in_place(fraction);
    }

    /// A new collection with every amount multiplied by `fraction`.
    pub fn scaled_copy(&self, fraction: f64) -> SourceCollection {
        SourceCollection {
            sources: self
                .sources
                .iter()
                .map(|s| Source::new(s.origin, s.amount * fraction))
                .collect(),
        }
    }

    /// Multiply every amount by `fraction` in place.
    pub fn scale_in_place(&mut self, fraction: f64) {
        for s in &mut self.sources {
            s.amount *= fraction;
        }
    }

    /// Remove `fraction` of the mass from every entry.
    pub fn remove_fraction(&mut self, fraction: f64) {
        self.scale_in_place(1.0 - fraction);
    }

    /// Drop every entry whose amount is `<= threshold`.
    ///
    /// Applied once, after the final routing iteration.
    pub fn trim(&mut self, threshold: f64) -> Trimmed {
        let mut trimmed = Trimmed::default();
        self.sources.retain(|s| {
            if s.amount > threshold {
                true
            } else {
                trimmed.entries += 1;
                trimmed.mass += s.amount;
                false
            }
        });
        trimmed
    }

    /// Amount attributed to `origin`, if present.
    pub fn get(&self, origin: Cell) -> Option<f64> {
        self.sources
            .iter()
            .find(|s| s.origin == origin)
            .map(|s| s.amount)
    }

    /// Sum of all amounts.
    pub fn total(&self) -> f64 {
        self.sources.iter().map(|s| s.amount).sum()
    }

    /// Number of distinct origins.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Remove all entries, keeping the allocation.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// The entries, in insertion order.
    pub fn as_slice(&self) -> &[Source] {
        &self.sources
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }
}

impl<'a> IntoIterator for &'a SourceCollection {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

pub(crate) fn is_duplicate_free(sources: &[Source]) -> bool {
    sources
        .iter()
        .enumerate()
        .all(|(i, a)| sources[i + 1..].iter().all(|b| b.origin != a.origin))
}
