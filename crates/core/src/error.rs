//! Error types of the engine.
//!
//! Rejected moves are not errors; these cover the conditions that stop a game
//! from making progress at all.

use thiserror::Error;

/// Fatal engine failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start the descend runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("descend task ended without locking its piece")]
    DescendTaskLost,

    #[error("descend task panicked")]
    DescendTaskPanicked,
}

/// Invalid startup configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    InvalidValue { key: &'static str, value: String },

    #[error("grid {width}x{height} is too small (minimum side is {min})")]
    GridTooSmall { width: u8, height: u8, min: u8 },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("base descend speed {0} must be finite and positive")]
    Speed(f32),
}
