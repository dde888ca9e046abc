//! Shape registry - per-kind rotation tables and colors
//!
//! Each kind maps a rotation index to four `(dx, dy)` offsets around the
//! piece center. Tables are static data; nothing here depends on the grid.

use crate::types::{PieceKind, Point, Rgb, PIECE_SIZE};

/// Offset of a single cell relative to the piece center
pub type CellOffset = Point;

/// Shape of a piece - 4 cell offsets from the center
pub type PieceShape = [CellOffset; PIECE_SIZE];

const I_SHAPES: [PieceShape; 2] = [
    [(-1, 0), (0, 0), (1, 0), (2, 0)],
    [(0, -2), (0, -1), (0, 0), (0, 1)],
];

const O_SHAPES: [PieceShape; 1] = [[(0, 0), (1, 0), (0, 1), (1, 1)]];

const J_SHAPES: [PieceShape; 4] = [
    [(-1, 0), (0, 0), (1, 0), (1, 1)],
    [(0, -1), (0, 0), (0, 1), (-1, 1)],
    [(-1, -1), (-1, 0), (0, 0), (1, 0)],
    [(1, -1), (0, -1), (0, 0), (0, 1)],
];

const L_SHAPES: [PieceShape; 4] = [
    [(-1, 1), (-1, 0), (0, 0), (1, 0)],
    [(-1, -1), (0, -1), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (1, -1)],
    [(0, -1), (0, 0), (0, 1), (1, 1)],
];

const S_SHAPES: [PieceShape; 2] = [
    [(0, 0), (1, 0), (-1, 1), (0, 1)],
    [(-1, -1), (-1, 0), (0, 0), (0, 1)],
];

const T_SHAPES: [PieceShape; 4] = [
    [(-1, 0), (0, 0), (1, 0), (0, 1)],
    [(0, -1), (-1, 0), (0, 0), (0, 1)],
    [(0, 0), (-1, 1), (0, 1), (1, 1)],
    [(0, -1), (0, 0), (1, 0), (0, 1)],
];

const Z_SHAPES: [PieceShape; 2] = [
    [(-1, 0), (0, 0), (0, 1), (1, 1)],
    [(1, -1), (0, 0), (1, 0), (0, 1)],
];

fn table(kind: PieceKind) -> &'static [PieceShape] {
    match kind {
        PieceKind::I => &I_SHAPES,
        PieceKind::O => &O_SHAPES,
        PieceKind::J => &J_SHAPES,
        PieceKind::L => &L_SHAPES,
        PieceKind::S => &S_SHAPES,
        PieceKind::T => &T_SHAPES,
        PieceKind::Z => &Z_SHAPES,
    }
}

/// Number of distinct rotations of a kind (the square has one)
pub fn rotation_count(kind: PieceKind) -> u8 {
    table(kind).len() as u8
}

/// Get the cell offsets for a kind and rotation index.
///
/// # Panics
///
/// Panics if `rotation` is not below [`rotation_count`] for `kind`.
pub fn get_shape(kind: PieceKind, rotation: u8) -> PieceShape {
    let shapes = table(kind);
    match shapes.get(rotation as usize) {
        Some(shape) => *shape,
        None => panic!(
            "{} has no rotation {} (count {})",
            kind.name(),
            rotation,
            shapes.len()
        ),
    }
}

/// Display color of a kind
pub fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(255, 0, 0),
        PieceKind::O => Rgb::new(255, 255, 0),
        PieceKind::J => Rgb::new(0, 0, 255),
        PieceKind::L => Rgb::new(255, 165, 0),
        PieceKind::S => Rgb::new(255, 0, 255),
        PieceKind::T => Rgb::new(0, 255, 255),
        PieceKind::Z => Rgb::new(0, 255, 0),
    }
}

/// Absolute cells of a shape placed at `center`
pub fn place(shape: &PieceShape, center: Point) -> [Point; PIECE_SIZE] {
    shape.map(|(dx, dy)| (center.0 + dx, center.1 + dy))
}
