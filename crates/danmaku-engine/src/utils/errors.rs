//! Error types for the overlay engine

use danmaku_core::ParseError;
use thiserror::Error;

/// Engine error types
///
/// None of these are fatal to the host page: a failed load degrades to an
/// empty overlay, a rejected tick leaves state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Playback rate must be finite and positive
    #[error("Invalid playback rate: {0}")]
    InvalidPlaybackRate(f64),

    /// Container dimensions must be finite and non-negative
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport {
        /// Reported width
        width: f32,
        /// Reported height
        height: f32,
    },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The subtitle file could not be used
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl EngineError {
    /// Whether the host can keep ticking after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

/// Result alias for engine operations
pub type Result<T> = core::result::Result<T, EngineError>;
