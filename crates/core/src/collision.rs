//! Collision queries over a grid and a set of candidate cells.
//!
//! Two notions of "outside" coexist. For occupancy the grid bounds are strict
//! and a negative row is outside. For blocking, body cells still above the
//! screen are exempt: they neither block a move nor get blocked.

use crate::grid::Grid;
use crate::types::{Direction, Point};

/// True when (x, y) is outside the grid, negative rows included
pub fn outside_screen(grid: &Grid, x: i32, y: i32) -> bool {
    grid.is_outside(x, y)
}

/// True when (x, y) is inside the grid and filled
pub fn occupied(grid: &Grid, x: i32, y: i32) -> bool {
    grid.is_occupied(x, y)
}

/// True when any on-screen body cell cannot step one cell in `direction`.
pub fn blocked(grid: &Grid, body: &[Point], direction: Direction) -> bool {
    let (dx, dy) = direction.offset();
    body.iter()
        .filter(|&&(x, y)| !outside_screen(grid, x, y))
        .any(|&(x, y)| {
            let (nx, ny) = (x + dx, y + dy);
            outside_screen(grid, nx, ny) || occupied(grid, nx, ny)
        })
}

/// True when a candidate rotation cell may not be entered.
///
/// Rows above the screen are allowed, so `y` is clamped to 0 for the bounds
/// test while occupancy uses the real row.
pub fn rotation_blocked(grid: &Grid, x: i32, y: i32) -> bool {
    outside_screen(grid, x, y.max(0)) || occupied(grid, x, y)
}

/// True when any body cell sits on an already occupied grid cell
pub fn overlaps(grid: &Grid, body: &[Point]) -> bool {
    body.iter().any(|&(x, y)| occupied(grid, x, y))
}

/// Rows `(x, y)` may still fall before hitting the floor or a filled cell.
///
/// Scans strictly below the cell. `y` must be on screen.
pub fn fall_distance(grid: &Grid, x: i32, y: i32) -> i32 {
    let floor = grid.height() as i32;
    let obstruction = ((y + 1)..floor)
        .find(|&row| occupied(grid, x, row))
        .unwrap_or(floor);
    obstruction - y - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_screen_cells_never_block() {
        let grid = Grid::new(4, 4);
        // Only the above-screen cell sits at the left wall.
        assert!(!blocked(&grid, &[(0, -1), (1, 0)], Direction::Left));
        assert!(!blocked(&grid, &[(3, -1), (2, 0)], Direction::Right));
        assert!(blocked(&grid, &[(0, -1), (0, 0)], Direction::Left));
    }

    #[test]
    fn floor_blocks_down() {
        let grid = Grid::new(4, 4);
        assert!(blocked(&grid, &[(1, 3)], Direction::Down));
        assert!(!blocked(&grid, &[(1, 2)], Direction::Down));
    }

    #[test]
    fn occupied_neighbour_blocks() {
        let grid = Grid::from_pattern(4, 4, &[".#..", "...."]);
        assert!(blocked(&grid, &[(1, 1)], Direction::Down));
        assert!(blocked(&grid, &[(0, 2)], Direction::Right));
        assert!(blocked(&grid, &[(2, 2)], Direction::Left));
        assert!(!blocked(&grid, &[(2, 2)], Direction::Right));
    }

    #[test]
    fn rotation_may_poke_above_screen_but_not_sideways() {
        let grid = Grid::new(4, 4);
        assert!(!rotation_blocked(&grid, 1, -2));
        assert!(rotation_blocked(&grid, -1, 0));
        assert!(rotation_blocked(&grid, 4, 0));
        assert!(rotation_blocked(&grid, 0, 4));
    }

    #[test]
    fn fall_distance_stops_above_obstruction() {
        let grid = Grid::from_pattern(3, 6, &["#..", "...", "..."]);
        assert_eq!(fall_distance(&grid, 0, 0), 2);
        assert_eq!(fall_distance(&grid, 1, 0), 5);
        assert_eq!(fall_distance(&grid, 1, 5), 0);
    }
}
