//! Dense, fixed-size 2D storage addressed by cell or linear index.
//!
//! [`Grid<T>`] owns `width * height` elements in a single `Vec<T>` laid out
//! row-major (`index = y * width + x`). Two grids of identical dimensions
//! can exchange their backing storage in O(1) via [`Grid::swap`], which is
//! how the routing engine ping-pongs between source and destination state
//! without copying elements.

use std::ops::{Index, IndexMut};

use crate::cell::Cell;
use crate::error::GridError;

/// A dense 2D grid of `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Default> Grid<T> {
    /// Create a grid with every cell set to `T::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let mut data = Vec::with_capacity(len);
        data.resize_with(len, T::default);
        Self {
            width,
            height,
            data,
        }
    }

    /// Reset every cell to `T::default()` without reallocating.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|v| *v = T::default());
    }
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to a clone of `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer.
    ///
    /// Returns `Err(GridError::LengthMismatch)` if `data.len()` is not
    /// `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Result<Self, GridError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid width (number of columns).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (number of rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells (`width * height`).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid holds zero cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the signed coordinate `(x, y)` lies inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        Cell::from_signed_within(x, y, self.width, self.height).is_some()
    }

    /// Linear index of `cell`.
    ///
    /// Out-of-range cells are a programming error; debug builds assert.
    #[inline]
    pub fn index_of(&self, cell: Cell) -> usize {
        debug_assert!(
            cell.x < self.width && cell.y < self.height,
            "cell {cell} outside {}x{} grid",
            self.width,
            self.height
        );
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// Cell addressed by linear index `i`.
    #[inline]
    pub fn cell_at(&self, i: usize) -> Cell {
        debug_assert!(i < self.data.len(), "index {i} outside grid of {}", self.data.len());
        let w = self.width as usize;
        Cell::new((i % w) as u32, (i / w) as u32)
    }

    /// Shared reference to the element at `cell`.
    #[inline]
    pub fn get(&self, cell: Cell) -> &T {
        &self.data[self.index_of(cell)]
    }

    /// Mutable reference to the element at `cell`.
    #[inline]
    pub fn get_mut(&mut self, cell: Cell) -> &mut T {
        let i = self.index_of(cell);
        &mut self.data[i]
    }

    /// Exchange backing storage with `other` in O(1).
    ///
    /// # Panics
    ///
    /// Panics if the two grids do not have identical dimensions.
    pub fn swap(&mut self, other: &mut Grid<T>) {
        assert!(
            self.width == other.width && self.height == other.height,
            "grid swap dimension mismatch: {}x{} vs {}x{}",
            self.width,
            self.height,
            other.width,
            other.height
        );
        std::mem::swap(&mut self.data, &mut other.data);
    }

    /// Row-major view of all elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major view of all elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over all cells in column-major order: `x` outer, `y` inner.
    ///
    /// This is the scan order used for compaction and diagnostic output.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let h = self.height;
        (0..self.width).flat_map(move |x| (0..h).map(move |y| Cell::new(x, y)))
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        self.get(cell)
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        self.get_mut(cell)
    }
}

impl<T> Index<(u32, u32)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (u32, u32)) -> &T {
        self.get(Cell::new(x, y))
    }
}

impl<T> IndexMut<(u32, u32)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut T {
        self.get_mut(Cell::new(x, y))
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Grid<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}
