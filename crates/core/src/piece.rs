//! Piece module - geometric state of the falling piece and its shared handle
//!
//! [`Piece`] is plain data plus the movement rules, evaluated against a
//! borrowed [`Grid`]. [`PieceHandle`] is the only way the rest of the engine
//! touches a live piece: every operation takes the piece lock and then the
//! grid lock, performs one logical step, and releases both.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arrayvec::ArrayVec;
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::collision::{blocked, fall_distance, overlaps, rotation_blocked};
use crate::grid::Grid;
use crate::shapes::{get_shape, piece_color, place, rotation_count};
use crate::types::{Direction, PieceKind, Point, Rgb, Rotation, PIECE_SIZE};

/// Result of a piece locking into the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub kind: PieceKind,
    /// Center cell at the moment of the merge
    pub center: Point,
    /// Rows cleared by the sweep that followed the merge
    pub rows_cleared: u32,
}

/// Outcome of one descend step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still falling; nothing merged
    Falling,
    /// Blocked below: merged into the grid and locked
    Landed(Landing),
    /// The free flag was already cleared by someone else
    Released,
}

/// Geometric state of one piece
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    kind: PieceKind,
    rotation: u8,
    center_x: i32,
    /// Continuous vertical position, allows sub-cell speeds
    center_y: f32,
    center_cell_y: i32,
    /// Cells per descend cycle
    speed: f32,
    body: ArrayVec<Point, PIECE_SIZE>,
    free: bool,
}

impl Piece {
    /// Create a piece centered at the top of a grid `grid_width` wide.
    ///
    /// The body stays empty until first use.
    pub fn new(kind: PieceKind, grid_width: usize, speed: f32) -> Self {
        let center_x = (grid_width / 2) as i32 - 1;
        Self {
            kind,
            rotation: 0,
            center_x,
            center_y: 0.0,
            center_cell_y: 0,
            speed,
            body: ArrayVec::new(),
            free: true,
        }
    }

    /// Create a piece at an explicit rotation and center cell
    pub fn placed(kind: PieceKind, rotation: u8, center: Point, speed: f32) -> Self {
        assert!(
            rotation < rotation_count(kind),
            "{} has no rotation {}",
            kind.name(),
            rotation
        );
        let mut piece = Self {
            kind,
            rotation,
            center_x: center.0,
            center_y: center.1 as f32,
            center_cell_y: center.1,
            speed,
            body: ArrayVec::new(),
            free: true,
        };
        piece.init_body();
        piece
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn color(&self) -> Rgb {
        piece_color(self.kind)
    }

    /// Center cell `(x, y)`
    pub fn center(&self) -> Point {
        (self.center_x, self.center_cell_y)
    }

    /// True while the piece still accepts moves, rotations, drops and descent
    pub fn is_free(&self) -> bool {
        self.free
    }

    /// Current body; empty before first use
    pub fn body(&self) -> &[Point] {
        &self.body
    }

    /// Cells the piece covers, computed from kind, rotation and center
    pub fn cells(&self) -> [Point; PIECE_SIZE] {
        place(&get_shape(self.kind, self.rotation), self.center())
    }

    /// Fill the body from the shape registry if it is still empty
    pub fn init_body(&mut self) {
        if self.body.is_empty() {
            self.update_body();
        }
    }

    fn update_body(&mut self) {
        self.body.clear();
        self.body.extend(self.cells());
    }

    pub fn is_blocked(&self, grid: &Grid, direction: Direction) -> bool {
        blocked(grid, &self.body, direction)
    }

    /// True when the body already sits on filled cells (spawn failure)
    pub fn overlaps(&self, grid: &Grid) -> bool {
        overlaps(grid, &self.cells())
    }

    /// Clear the free flag; returns whether the piece was still free
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.free, false)
    }

    /// Shift one cell left or right.
    ///
    /// Returns false (and changes nothing) when the piece is locked or the
    /// way is blocked.
    ///
    /// # Panics
    ///
    /// Panics on [`Direction::Down`]; pieces only go down by descending or
    /// dropping.
    pub fn try_move(&mut self, grid: &Grid, direction: Direction) -> bool {
        let dx = match direction {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Down => panic!("a piece cannot be moved down; descend or drop it"),
        };
        if !self.free {
            return false;
        }
        self.init_body();
        if self.is_blocked(grid, direction) {
            trace!(piece = self.kind.name(), dir = direction.as_str(), "move blocked");
            return false;
        }
        self.center_x += dx;
        self.update_body();
        trace!(
            piece = self.kind.name(),
            dir = direction.as_str(),
            x = self.center_x,
            y = self.center_cell_y,
            "moved"
        );
        true
    }

    /// Step to the next rotation of the kind's table.
    ///
    /// Rejected when any cell of the candidate shape, evaluated at the
    /// current center, is filled or lies beside or below the grid. Poking
    /// above the top row is allowed.
    pub fn try_rotate(&mut self, grid: &Grid, rotation: Rotation) -> bool {
        if !self.free {
            return false;
        }
        self.init_body();
        let next = rotation.apply(self.rotation, rotation_count(self.kind));
        if next == self.rotation {
            return false;
        }

        let candidate = place(&get_shape(self.kind, next), self.center());
        if let Some(&(x, y)) = candidate.iter().find(|&&(x, y)| rotation_blocked(grid, x, y)) {
            trace!(
                piece = self.kind.name(),
                dir = rotation.as_str(),
                x,
                y,
                "rotation blocked"
            );
            return false;
        }

        self.rotation = next;
        self.update_body();
        true
    }

    /// Fall straight down as far as possible, then lock and merge.
    ///
    /// Returns `None` when the piece was already locked.
    pub fn drop_onto(&mut self, grid: &mut Grid) -> Option<Landing> {
        if !self.free {
            return None;
        }
        self.init_body();
        let distance = self
            .body
            .iter()
            .filter(|&&(x, y)| !grid.is_outside(x, y))
            .map(|&(x, y)| fall_distance(grid, x, y))
            .min()
            .unwrap_or(0);

        self.center_y += distance as f32;
        self.center_cell_y += distance;
        self.update_body();
        debug!(
            piece = self.kind.name(),
            distance,
            x = self.center_x,
            y = self.center_cell_y,
            "dropped"
        );
        Some(self.lock(grid))
    }

    /// First step of a descent: lock at once if nothing can fall.
    pub fn begin_descent(&mut self, grid: &mut Grid) -> Tick {
        if !self.free {
            return Tick::Released;
        }
        self.init_body();
        if self.is_blocked(grid, Direction::Down) {
            return Tick::Landed(self.lock(grid));
        }
        Tick::Falling
    }

    /// Advance by one descend cycle.
    ///
    /// The continuous position grows by `speed`; each whole row crossed is
    /// applied one at a time and the piece locks as soon as it cannot go
    /// lower.
    pub fn descend(&mut self, grid: &mut Grid) -> Tick {
        if !self.free {
            return Tick::Released;
        }
        self.init_body();
        self.center_y += self.speed;
        let target = self.center_y.floor() as i32;

        while self.center_cell_y < target {
            if self.is_blocked(grid, Direction::Down) {
                return Tick::Landed(self.lock(grid));
            }
            self.center_cell_y += 1;
            self.update_body();
            if self.is_blocked(grid, Direction::Down) {
                return Tick::Landed(self.lock(grid));
            }
        }
        Tick::Falling
    }

    fn lock(&mut self, grid: &mut Grid) -> Landing {
        self.free = false;
        let rows_cleared = grid.merge(&self.body);
        debug!(
            piece = self.kind.name(),
            x = self.center_x,
            y = self.center_cell_y,
            rows_cleared,
            "locked"
        );
        Landing {
            kind: self.kind,
            center: self.center(),
            rows_cleared,
        }
    }
}

struct Shared {
    piece: Mutex<Piece>,
    grid: Arc<Mutex<Grid>>,
    released: Notify,
}

/// Synchronized handle to a live piece and the grid it falls into.
///
/// Clones share the same piece. Locks are always taken piece first, grid
/// second.
#[derive(Clone)]
pub struct PieceHandle {
    shared: Arc<Shared>,
}

impl PieceHandle {
    pub fn new(mut piece: Piece, grid: Arc<Mutex<Grid>>) -> Self {
        piece.init_body();
        Self {
            shared: Arc::new(Shared {
                piece: Mutex::new(piece),
                grid,
                released: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> (MutexGuard<'_, Piece>, MutexGuard<'_, Grid>) {
        let piece = lock_unpoisoned(&self.shared.piece);
        let grid = lock_unpoisoned(&self.shared.grid);
        (piece, grid)
    }

    /// Run `f` with both locks held, for consistent reads.
    pub fn read<R>(&self, f: impl FnOnce(&Piece, &Grid) -> R) -> R {
        let (piece, grid) = self.lock();
        f(&piece, &grid)
    }

    pub fn kind(&self) -> PieceKind {
        lock_unpoisoned(&self.shared.piece).kind()
    }

    pub fn is_free(&self) -> bool {
        lock_unpoisoned(&self.shared.piece).is_free()
    }

    /// Copy of the current piece state
    pub fn piece(&self) -> Piece {
        lock_unpoisoned(&self.shared.piece).clone()
    }

    pub fn move_piece(&self, direction: Direction) -> bool {
        let (mut piece, grid) = self.lock();
        piece.try_move(&grid, direction)
    }

    pub fn rotate(&self, rotation: Rotation) -> bool {
        let (mut piece, grid) = self.lock();
        piece.try_rotate(&grid, rotation)
    }

    /// Drop, lock and merge synchronously, then wake the descend task so it
    /// can exit.
    pub fn drop_piece(&self) -> Option<Landing> {
        let landing = {
            let (mut piece, mut grid) = self.lock();
            piece.drop_onto(&mut grid)
        };
        if landing.is_some() {
            self.shared.released.notify_one();
        }
        landing
    }

    pub fn begin_descent(&self) -> Tick {
        let (mut piece, mut grid) = self.lock();
        piece.begin_descent(&mut grid)
    }

    pub fn descend(&self) -> Tick {
        let (mut piece, mut grid) = self.lock();
        piece.descend(&mut grid)
    }

    /// True when the body already sits on filled cells
    pub fn overlaps_grid(&self) -> bool {
        let (piece, grid) = self.lock();
        piece.overlaps(&grid)
    }

    /// Clear the free flag and wake the descend task.
    ///
    /// Returns whether the piece was still free.
    pub fn release(&self) -> bool {
        let was_free = lock_unpoisoned(&self.shared.piece).release();
        self.shared.released.notify_one();
        was_free
    }

    /// Resolves once the piece has been released or dropped
    pub async fn released(&self) {
        self.shared.released.notified().await;
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(grid: Grid) -> Arc<Mutex<Grid>> {
        Arc::new(Mutex::new(grid))
    }

    #[test]
    fn new_piece_spawns_centered_with_empty_body() {
        let piece = Piece::new(PieceKind::T, 10, 0.1);
        assert_eq!(piece.center(), (4, 0));
        assert_eq!(piece.rotation(), 0);
        assert!(piece.is_free());
        assert!(piece.body().is_empty());
    }

    #[test]
    fn first_use_fills_body() {
        let grid = Grid::new(10, 20);
        let mut piece = Piece::new(PieceKind::I, 10, 0.1);
        assert!(piece.try_move(&grid, Direction::Left));
        assert_eq!(piece.body(), &[(2, 0), (3, 0), (4, 0), (5, 0)]);
    }

    #[test]
    fn descend_accumulates_sub_cell_speed() {
        let mut grid = Grid::new(10, 20);
        let mut piece = Piece::placed(PieceKind::O, 0, (4, 0), 0.25);
        for _ in 0..3 {
            assert_eq!(piece.descend(&mut grid), Tick::Falling);
            assert_eq!(piece.center(), (4, 0));
        }
        assert_eq!(piece.descend(&mut grid), Tick::Falling);
        assert_eq!(piece.center(), (4, 1));
        assert_eq!(piece.body(), &[(4, 1), (5, 1), (4, 2), (5, 2)]);
    }

    #[test]
    fn fast_descent_cannot_pass_through_stack() {
        let mut grid = Grid::from_pattern(4, 8, &["####", "####"]);
        let mut piece = Piece::placed(PieceKind::O, 0, (1, 0), 10.0);
        let tick = piece.descend(&mut grid);
        let Tick::Landed(landing) = tick else {
            panic!("expected landing, got {tick:?}");
        };
        // Square rests on row 6: its cells cover rows 4 and 5.
        assert_eq!(landing.center, (1, 4));
        assert!(grid.is_occupied(1, 4) && grid.is_occupied(2, 5));
    }

    #[test]
    fn grounded_piece_locks_on_next_row_step_without_moving() {
        let mut grid = Grid::from_pattern(4, 6, &["...#"]);
        // Slides over the filled cell, then the next crossed row locks it.
        let mut piece = Piece::placed(PieceKind::O, 0, (1, 3), 1.0);
        assert!(piece.try_move(&grid, Direction::Right));
        let tick = piece.descend(&mut grid);
        assert!(matches!(tick, Tick::Landed(_)));
        assert_eq!(piece.center(), (2, 3));
    }

    #[test]
    fn release_is_reported_once() {
        let mut piece = Piece::new(PieceKind::S, 10, 0.1);
        assert!(piece.release());
        assert!(!piece.release());
        let mut grid = Grid::new(10, 20);
        assert_eq!(piece.descend(&mut grid), Tick::Released);
        assert_eq!(piece.begin_descent(&mut grid), Tick::Released);
    }

    #[test]
    fn handle_drop_wakes_released_waiter() {
        let grid = shared(Grid::new(10, 20));
        let handle = PieceHandle::new(Piece::new(PieceKind::T, 10, 0.1), grid.clone());
        let landing = handle.drop_piece().expect("free piece drops");
        assert_eq!(landing.center, (4, 18));
        assert!(!handle.is_free());
        assert!(handle.drop_piece().is_none());

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        // Permit stored by the drop resolves the waiter immediately.
        rt.block_on(handle.released());
        assert!(grid.lock().unwrap().is_occupied(4, 19));
    }
}
