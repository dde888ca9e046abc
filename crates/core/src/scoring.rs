//! Scoring module - score, level and descend speed rules
//!
//! - Each completed piece adds the square of the rows it cleared.
//! - The level starts at 1, rises every `SCORE_PER_LEVEL` points and stops
//!   at `MAX_LEVEL`.
//! - New pieces fall at the base speed multiplied by the level.

use crate::types::{MAX_LEVEL, SCORE_PER_LEVEL};

/// Points for clearing `rows` rows with one piece
pub fn calculate_score(rows: u32) -> u32 {
    rows.saturating_mul(rows)
}

/// Level reached with `score` points
pub fn calculate_level(score: u32) -> u32 {
    (1 + score / SCORE_PER_LEVEL).min(MAX_LEVEL)
}

/// Descend speed (cells per cycle) of pieces spawned at `level`
pub fn descend_speed(base_speed: f32, level: u32) -> f32 {
    base_speed * level as f32
}
