//! Cue parser for the `[Events]` section of ASS subtitle files.
//!
//! Only `Dialogue:` lines inside `[Events]` become cues; any other section
//! header closes the section. Field-level problems never fail the parse: the
//! offending line is dropped and a [`ParseIssue`] is recorded instead.
//!
//! # Example
//!
//! ```rust
//! use danmaku_core::CueSet;
//!
//! let cues = CueSet::parse("[Events]\nDialogue: 0,0:00:01.00,0:00:03.00,Default,,,,,,Hi")?;
//! assert_eq!(cues[0].start, 1.0);
//! # Ok::<(), danmaku_core::ParseError>(())
//! ```

mod cue;
pub mod errors;
mod events;
mod time;

pub use cue::{Cue, CueId, CueSet};
pub use errors::{IssueCategory, ParseError, ParseIssue};
pub use time::{format_ass_time, parse_ass_time};
