use crate::piece::Piece;
use crate::types::{PieceKind, Point, Rgb, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, PIECE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
    pub center: Point,
    pub body: [Point; PIECE_SIZE],
    pub color: Rgb,
    pub free: bool,
}

impl From<&Piece> for ActiveSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind(),
            rotation: value.rotation(),
            center: value.center(),
            body: value.cells(),
            color: value.color(),
            free: value.is_free(),
        }
    }
}

/// Read-only per-frame view of the game for the display backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major occupancy, `height * width` cells
    pub cells: Vec<bool>,
    pub active: Option<ActiveSnapshot>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub pieces: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    /// Empty snapshot of a `width x height` grid
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
            active: None,
            score: 0,
            level: 1,
            lines: 0,
            pieces: 0,
            game_over: false,
        }
    }

    /// True when the locked cell at (x, y) is filled
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Mark a locked cell; out-of-range writes are ignored
    pub fn fill(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = true;
        }
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::empty(DEFAULT_GRID_WIDTH as usize, DEFAULT_GRID_HEIGHT as usize)
    }
}
