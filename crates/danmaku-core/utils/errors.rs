//! Core error type for danmaku-core operations
//!
//! Field-level failures that the parser and classifier recover from
//! internally. Structural failures of a whole file are
//! [`ParseError`](crate::ParseError)s.

use thiserror::Error;

/// Main error type for core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Time format parsing errors
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Malformed override directive arguments
    #[error("Invalid directive: {0}")]
    InvalidDirective(String),
}

impl CoreError {
    /// Field-level errors are absorbed by the parser, which drops the line.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidTime(_) | Self::InvalidDirective(_))
    }
}
