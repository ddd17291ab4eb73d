//! Parser error and issue types
//!
//! - [`ParseError`]: structural failures that leave no usable cue set
//! - [`ParseIssue`]: recoverable per-line problems, collected on the `CueSet`

use core::fmt;

use thiserror::Error;

/// Structural parse failure
///
/// Hosts treat any of these as "captions unavailable"; nothing here is fatal
/// to playback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or whitespace only
    #[error("Subtitle file is empty")]
    EmptyInput,

    /// No `[Events]` section header was found
    #[error("No [Events] section found in subtitle file")]
    MissingEventsSection,
}

/// Issue categories for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IssueCategory {
    /// Section header problems
    Structure,
    /// Field count or empty text
    Format,
    /// Unparseable or inverted timestamps
    Timing,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "structure"),
            Self::Format => write!(f, "format"),
            Self::Timing => write!(f, "timing"),
        }
    }
}

/// Line that was skipped while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseIssue {
    /// Issue category for filtering/grouping
    pub category: IssueCategory,
    /// Human-readable message
    pub message: String,
    /// Line number where the issue occurred (1-based)
    pub line: usize,
}

impl ParseIssue {
    /// Record a skipped line
    #[must_use]
    pub fn warning(category: IssueCategory, message: String, line: usize) -> Self {
        Self {
            category,
            message,
            line,
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "warning [{}] line {}: {}",
            self.category, self.line, self.message
        )
    }
}
