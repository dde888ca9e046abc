//! Terminal display backend.
//!
//! Game snapshots are drawn into a [`FrameBuffer`] by [`GameView`] and
//! flushed to the terminal by [`TerminalRenderer`], which only sends the
//! cells that changed since the last frame.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer};
pub use game_view::{AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
