//! Terminal input module.
//!
//! Maps `crossterm` key events into [`crate::types::Command`]. The engine
//! only ever sees the symbolic commands.

pub mod map;

pub use blockfall_types as types;

pub use map::{handle_key_event, should_quit};
