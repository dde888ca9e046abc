//! Grid module - occupancy matrix and the row-clearing sweep
//!
//! The grid is a `width x height` matrix of booleans stored row-major in one
//! flat buffer. Coordinates: (x, y) where x ranges 0..width (left to right)
//! and y ranges 0..height (top to bottom).

use tracing::debug;

use crate::types::Point;

/// The playfield occupancy matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<bool>,
    /// Total rows cleared since creation
    rows_cleared: u32,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid must not be empty");
        Self {
            width,
            height,
            cells: vec![false; width * height],
            rows_cleared: 0,
        }
    }

    /// Build a grid whose bottom rows follow `rows`, top to bottom.
    ///
    /// `#` marks an occupied cell, anything else an empty one. Rows above the
    /// pattern are empty.
    ///
    /// ```
    /// use blockfall_core::Grid;
    ///
    /// let grid = Grid::from_pattern(4, 6, &["#..#", "####"]);
    /// assert!(grid.is_occupied(0, 4));
    /// assert!(!grid.is_occupied(1, 4));
    /// assert_eq!(grid.row_count(5), 4);
    /// ```
    pub fn from_pattern(width: usize, height: usize, rows: &[&str]) -> Self {
        assert!(rows.len() <= height, "pattern taller than grid");
        let mut grid = Self::new(width, height);
        let top = height - rows.len();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.chars().count(), width, "pattern row {i} has wrong width");
            for (x, ch) in row.chars().enumerate() {
                grid.cells[(top + i) * width + x] = ch == '#';
            }
        }
        grid
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_outside(x, y) {
            return None;
        }
        Some((y as usize) * self.width + (x as usize))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total rows cleared by every sweep so far
    pub fn rows_cleared(&self) -> u32 {
        self.rows_cleared
    }

    /// True when (x, y) lies outside `[0, width) x [0, height)`.
    ///
    /// Negative `y` counts as outside here; callers that allow pieces above
    /// the screen clamp `y` first or skip such cells.
    pub fn is_outside(&self, x: i32, y: i32) -> bool {
        x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height
    }

    /// True when (x, y) is inside the grid and filled
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|idx| self.cells[idx])
    }

    /// Set a cell; returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, occupied: bool) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = occupied;
                true
            }
            None => false,
        }
    }

    /// Number of occupied cells in row `y`
    pub fn row_count(&self, y: usize) -> usize {
        self.row(y).iter().filter(|&&cell| cell).count()
    }

    /// Cells of row `y`
    pub fn row(&self, y: usize) -> &[bool] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Mark every on-screen cell of `body` occupied and sweep from the lowest
    /// row it touched.
    ///
    /// Cells above the screen are dropped. Returns the rows cleared by the
    /// sweep.
    pub fn merge(&mut self, body: &[Point]) -> u32 {
        let mut lowest: Option<usize> = None;
        for &(x, y) in body {
            if self.set(x, y, true) {
                let y = y as usize;
                lowest = Some(lowest.map_or(y, |l| l.max(y)));
            }
        }
        match lowest {
            Some(row) => self.clear_from(row),
            None => 0,
        }
    }

    /// Clear full rows from `row` upward, compacting partial rows above them.
    ///
    /// Scanning stops at the first empty row. Each partial row met after a
    /// clear moves down by the number of rows cleared so far. Returns the
    /// number of rows cleared by this sweep.
    pub fn clear_from(&mut self, row: usize) -> u32 {
        assert!(row < self.height, "sweep start row {row} outside grid");
        let width = self.width;
        let mut cleared = 0usize;

        for y in (0..=row).rev() {
            let count = self.row_count(y);
            if count == 0 {
                break;
            }

            let start = y * width;
            if count == width {
                self.cells[start..start + width].fill(false);
                cleared += 1;
            } else if cleared > 0 {
                let dst = (y + cleared) * width;
                self.cells.copy_within(start..start + width, dst);
                self.cells[start..start + width].fill(false);
            }
        }

        if cleared > 0 {
            debug!(from_row = row, cleared, "rows cleared");
        }
        self.rows_cleared += cleared as u32;
        cleared as u32
    }

    /// Copy the occupancy into `out`, reusing its allocation
    pub fn write_cells_into(&self, out: &mut Vec<bool>) {
        out.clear();
        out.extend_from_slice(&self.cells);
    }
}
