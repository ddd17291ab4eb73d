//! # danmaku-core
//!
//! Tolerant parser for the dialogue events of ASS (Advanced `SubStation` Alpha)
//! subtitle files, plus the motion classifier and override-tag helpers used by
//! the danmaku overlay engine.
//!
//! ## Features
//!
//! - **Tolerant parsing**: malformed dialogue lines are dropped and recorded as
//!   [`ParseIssue`]s instead of failing the whole file
//! - **Comma-safe text**: fields from the tenth onward are kept as free text
//! - **Stable ordering**: cues are sorted by start time, ties keep file order
//! - **Motion classification**: `\move(...)` directives become [`ExplicitPath`]s,
//!   everything else scrolls
//!
//! ## Quick Start
//!
//! ```rust
//! use danmaku_core::{classify, CueSet, Motion};
//!
//! let source = r"
//! [Script Info]
//! Title: Example
//!
//! [Events]
//! Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
//! Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,Hello\, world
//! Dialogue: 0,0:00:02.00,0:00:04.00,Default,,0,0,0,,{\move(10,20,300,20)}Sliding
//! ";
//!
//! let cues = CueSet::parse(source)?;
//! assert_eq!(cues.len(), 2);
//! assert_eq!(cues[0].text, "Hello, world");
//! assert!(matches!(classify(&cues[1]), Motion::Explicit(_)));
//! # Ok::<(), danmaku_core::ParseError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

pub mod classifier;
pub mod parser;
pub mod tags;
pub mod utils;

pub use classifier::{classify, classify_text, ExplicitPath, Motion};
pub use parser::{
    format_ass_time, parse_ass_time, Cue, CueId, CueSet, IssueCategory, ParseError, ParseIssue,
};
pub use tags::{strip_tags, Rgb, TextStyle};
pub use utils::CoreError;

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for core operations, using the crate's unified `CoreError`.
pub type Result<T> = core::result::Result<T, CoreError>;
