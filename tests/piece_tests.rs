//! Piece tests - movement, rotation and drop rules

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use blockfall::core::{get_shape, rotation_count, Grid, Piece, PieceHandle, Tick};
use blockfall::types::{Direction, PieceKind, Rotation};

fn assert_valid_body(piece: &Piece, grid: &Grid) {
    let cells: HashSet<_> = piece.body().iter().copied().collect();
    assert_eq!(cells.len(), 4, "body cells must be distinct: {:?}", piece.body());
    for &(x, y) in piece.body() {
        assert!(!grid.is_occupied(x, y), "body overlaps grid at ({x}, {y})");
    }
}

#[test]
fn test_spawn_position() {
    for kind in PieceKind::ALL {
        let piece = Piece::new(kind, 10, 0.1);
        assert_eq!(piece.center(), (4, 0));
        assert_eq!(piece.rotation(), 0);
        assert!(piece.is_free());
    }
    assert_eq!(Piece::new(PieceKind::O, 7, 0.1).center(), (2, 0));
}

#[test]
fn test_move_keeps_body_valid_until_wall() {
    let grid = Grid::from_pattern(10, 20, &["#.........", "#.........", "#........."]);
    let mut piece = Piece::placed(PieceKind::T, 0, (4, 17), 0.1);

    let mut moves = 0;
    while piece.try_move(&grid, Direction::Left) {
        assert_valid_body(&piece, &grid);
        moves += 1;
    }
    // T covers x-1..x+1; the filled column 0 stops it at center 2.
    assert_eq!(moves, 2);
    assert_eq!(piece.center(), (2, 17));

    while piece.try_move(&grid, Direction::Right) {
        assert_valid_body(&piece, &grid);
    }
    assert_eq!(piece.center(), (8, 17));
}

#[test]
fn test_move_with_cells_above_screen() {
    let grid = Grid::new(10, 20);
    // Vertical I at the top: two cells above the screen.
    let mut piece = Piece::placed(PieceKind::I, 1, (0, 0), 0.1);
    assert!(!piece.try_move(&grid, Direction::Left));
    assert!(piece.try_move(&grid, Direction::Right));
    assert_eq!(piece.body(), &[(1, -2), (1, -1), (1, 0), (1, 1)]);
}

#[test]
#[should_panic(expected = "cannot be moved down")]
fn test_move_down_panics() {
    let grid = Grid::new(10, 20);
    let mut piece = Piece::new(PieceKind::O, 10, 0.1);
    piece.try_move(&grid, Direction::Down);
}

#[test]
fn test_rotation_rejected_at_floor_leaves_state() {
    let grid = Grid::new(10, 20);
    let mut piece = Piece::placed(PieceKind::I, 0, (4, 19), 0.1);
    let before = piece.clone();

    assert!(!piece.try_rotate(&grid, Rotation::Forward));
    assert_eq!(piece, before);
}

#[test]
fn test_rotation_rejected_by_occupied_cell() {
    let mut grid = Grid::new(10, 20);
    grid.set(4, 11, true);
    let mut piece = Piece::placed(PieceKind::I, 0, (4, 10), 0.1);
    let before = piece.clone();

    assert!(!piece.try_rotate(&grid, Rotation::Backward));
    assert_eq!(piece, before);
}

#[test]
fn test_rotation_allowed_above_screen() {
    let grid = Grid::new(10, 20);
    let mut piece = Piece::new(PieceKind::I, 10, 0.1);
    assert!(piece.try_rotate(&grid, Rotation::Forward));
    assert_eq!(piece.rotation(), 1);
    assert_eq!(piece.body(), &[(4, -2), (4, -1), (4, 0), (4, 1)]);
}

#[test]
fn test_rotation_cycles_through_table() {
    let grid = Grid::new(10, 20);
    for kind in PieceKind::ALL {
        let mut piece = Piece::placed(kind, 0, (4, 10), 0.1);
        let count = rotation_count(kind);
        for step in 1..=count {
            let rotated = piece.try_rotate(&grid, Rotation::Forward);
            assert_eq!(rotated, count > 1, "{kind:?}");
            assert_eq!(piece.rotation(), step % count);
            let expected = get_shape(kind, piece.rotation()).map(|(dx, dy)| (4 + dx, 10 + dy));
            assert_eq!(piece.cells(), expected);
        }
    }
}

#[test]
fn test_square_never_rotates() {
    let grid = Grid::new(10, 20);
    let mut piece = Piece::placed(PieceKind::O, 0, (4, 10), 0.1);
    assert!(!piece.try_rotate(&grid, Rotation::Forward));
    assert!(!piece.try_rotate(&grid, Rotation::Backward));
    assert_eq!(piece.rotation(), 0);
}

#[test]
fn test_drop_uses_minimum_fall_distance() {
    let mut grid = Grid::from_pattern(10, 20, &["....#....."]);
    let mut piece = Piece::new(PieceKind::T, 10, 0.1);

    let landing = piece.drop_onto(&mut grid).expect("free piece drops");

    // The stem over column 4 stops first.
    assert_eq!(landing.center, (4, 17));
    assert_eq!(landing.rows_cleared, 0);
    for (x, y) in [(3, 17), (4, 17), (5, 17), (4, 18), (4, 19)] {
        assert!(grid.is_occupied(x, y), "({x}, {y}) should be filled");
    }
}

#[test]
fn test_locked_piece_ignores_everything() {
    let mut grid = Grid::new(10, 20);
    let mut piece = Piece::new(PieceKind::L, 10, 0.1);
    piece.drop_onto(&mut grid);
    let locked = piece.clone();
    let merged = grid.clone();

    assert!(!piece.is_free());
    assert!(!piece.try_move(&grid, Direction::Left));
    assert!(!piece.try_rotate(&grid, Rotation::Forward));
    assert!(piece.drop_onto(&mut grid).is_none());
    assert_eq!(piece.descend(&mut grid), Tick::Released);
    assert_eq!(piece, locked);
    assert_eq!(grid, merged);
}

#[test]
fn test_drop_with_whole_body_above_screen_stays_put() {
    let mut grid = Grid::new(10, 20);
    let mut piece = Piece::placed(PieceKind::I, 1, (4, -2), 0.1);

    let landing = piece.drop_onto(&mut grid).expect("free piece drops");

    assert_eq!(landing.center, (4, -2));
    assert!(grid.cells().iter().all(|&c| !c));
}

#[test]
fn test_handle_serializes_moves_and_drop() {
    let grid = Arc::new(Mutex::new(Grid::new(10, 20)));
    let handle = PieceHandle::new(Piece::new(PieceKind::J, 10, 0.1), grid.clone());
    let other = handle.clone();

    assert!(handle.move_piece(Direction::Right));
    assert_eq!(other.piece().center(), (5, 0));
    assert!(other.drop_piece().is_some());
    assert!(!handle.move_piece(Direction::Left));
    assert!(!handle.rotate(Rotation::Forward));

    let snapshot = handle.read(|piece, grid| (piece.cells(), grid.rows_cleared()));
    assert_eq!(snapshot.0, [(4, 18), (5, 18), (6, 18), (6, 19)]);
    assert_eq!(snapshot.1, 0);
}
