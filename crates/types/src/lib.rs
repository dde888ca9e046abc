//! Shared types and constants.
//!
//! Pure data with no dependencies, usable by the engine, the input mapper and
//! the terminal renderer alike.
//!
//! # Grid Dimensions
//!
//! The default playfield is 10 columns by 20 rows. Coordinates are `(x, y)`
//! with `x` growing to the right and `y` growing downward; row 0 is the top of
//! the visible area. Negative `y` is legal for a freshly spawned piece that
//! still pokes above the screen.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_FRAME_MS` | 16 | Target frame duration of the render loop |
//! | `DESCEND_CYCLE_MS` | 100 | Wake-up interval of the descend task |
//! | `BASE_DESCEND_SPEED` | 0.1 | Cells advanced per cycle at level 1 |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{PieceKind, Rotation};
//!
//! assert_eq!(PieceKind::ALL.len(), 7);
//! assert_eq!(PieceKind::T.name(), "T-piece");
//! assert_eq!(Rotation::Forward.step(), 1);
//! ```

/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: u8 = 10;

/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: u8 = 20;

/// Smallest accepted grid side; every shape must fit at spawn.
pub const MIN_GRID_SIDE: u8 = 4;

/// Default frame duration of the render loop (16ms ≈ 60 FPS)
pub const DEFAULT_FRAME_MS: u32 = 16;

/// Interval between two wake-ups of the descend task
pub const DESCEND_CYCLE_MS: u32 = 100;

/// Descend speed at level 1, in cells per cycle
pub const BASE_DESCEND_SPEED: f32 = 0.1;

/// Score needed to advance one level
pub const SCORE_PER_LEVEL: u32 = 10;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 5;

/// Number of cells in every piece body
pub const PIECE_SIZE: usize = 4;

/// A grid coordinate `(x, y)`
pub type Point = (i32, i32);

/// The seven piece kinds.
///
/// - **I**: long bar, red
/// - **O**: square, yellow (does not rotate)
/// - **J**: blue
/// - **L**: orange
/// - **S**: pink
/// - **T**: cyan
/// - **Z**: green
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    J,
    L,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds, in generator order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Human readable name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::I => "long piece",
            PieceKind::O => "square piece",
            PieceKind::J => "J-piece",
            PieceKind::L => "L-piece",
            PieceKind::S => "S-piece",
            PieceKind::T => "T-piece",
            PieceKind::Z => "Z-piece",
        }
    }
}

/// Direction of a one-cell displacement.
///
/// `Down` only appears in collision queries and the descend step; moving a
/// piece by command accepts `Left` and `Right` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    Left,
    Right,
}

impl Direction {
    /// Cell offset `(dx, dy)` of one step in this direction
    pub fn offset(&self) -> Point {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Rotation direction through a kind's rotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Forward,
    Backward,
}

impl Rotation {
    /// Signed step through the rotation index
    pub fn step(&self) -> i32 {
        match self {
            Rotation::Forward => 1,
            Rotation::Backward => -1,
        }
    }

    /// Next rotation index for a table of `count` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::Forward.apply(3, 4), 0);
    /// assert_eq!(Rotation::Backward.apply(0, 4), 3);
    /// assert_eq!(Rotation::Forward.apply(0, 1), 0);
    /// ```
    pub fn apply(&self, index: u8, count: u8) -> u8 {
        assert!(count > 0, "rotation table must not be empty");
        assert!(index < count, "rotation index {index} out of range 0..{count}");
        (i32::from(index) + self.step()).rem_euclid(i32::from(count)) as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Forward => "forward",
            Rotation::Backward => "backward",
        }
    }
}

/// Symbolic commands consumed by the engine.
///
/// These are produced by the input mapper; the engine never sees raw device
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece one step forward through its table
    RotateForward,
    /// Rotate piece one step backward through its table
    RotateBackward,
    /// Drop piece to its landing row and lock it
    Drop,
    /// Leave the game
    Quit,
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
