//! Core engine - piece descent, collision rules and the clearing sweep
//!
//! Everything here is independent of the terminal. The only concurrency is
//! the per-piece descend task, which runs on a tokio runtime owned by
//! [`Game`]; all other calls are synchronous.
//!
//! # Module Structure
//!
//! - [`shapes`]: per-kind rotation tables and colors
//! - [`grid`]: occupancy matrix and the row clearing sweep
//! - [`collision`]: outside/occupied/blocked queries
//! - [`piece`]: piece geometry, movement rules and the shared [`PieceHandle`]
//! - [`descend`]: background descent task and its completion signal
//! - [`game`]: the coordinator driven by the frame loop
//! - [`rng`]: seeded and scripted piece generators
//! - [`scoring`]: score, level and speed rules
//! - [`snapshot`]: read-only view for the display backend
//! - [`config`]: defaults and environment overrides
//!
//! # Example
//!
//! ```
//! use blockfall_core::{Game, GameConfig, Grid, PieceGenerator};
//! use blockfall_core::types::{Command, PieceKind};
//!
//! let config = GameConfig::default();
//! let grid = Grid::new(10, 20);
//! let mut game = Game::with_parts(config, grid, PieceGenerator::scripted([PieceKind::O])).unwrap();
//! assert!(game.start().is_none());
//!
//! let _ = game.apply(Command::Drop);
//! let event = game.poll().unwrap();
//! assert!(event.is_some());
//! assert_eq!(game.pieces(), 2);
//! ```

pub mod collision;
pub mod config;
pub mod descend;
pub mod error;
pub mod game;
pub mod grid;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod shapes;
pub mod snapshot;

pub use blockfall_types as types;

pub use config::GameConfig;
pub use descend::{Completion, DescendTask, TaskGauge};
pub use error::{ConfigError, EngineError};
pub use game::{Game, GameEvent, GameStatus};
pub use grid::Grid;
pub use piece::{Landing, Piece, PieceHandle, Tick};
pub use rng::{PieceGenerator, SimpleRng};
pub use scoring::{calculate_level, calculate_score, descend_speed};
pub use shapes::{get_shape, piece_color, rotation_count};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
