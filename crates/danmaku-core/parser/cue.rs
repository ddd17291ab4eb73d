//! Cue records and the ordered cue set produced by a parse session

use core::fmt;
use core::ops::Index;

use crate::classifier::{classify, ExplicitPath};
use crate::parser::{errors::ParseIssue, events::EventsParser, ParseError};
use crate::tags::{strip_tags, TextStyle};

/// Stable cue identity: the cue's index in its start-ordered set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CueId(pub usize);

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cue-{}", self.0)
    }
}

/// One timed caption entry
///
/// Text keeps its override blocks (`{\move(...)}`, `{\b1}`, ...) so later
/// stages can interpret them; use [`Cue::display_text`] for the visible text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cue {
    /// Index in the owning [`CueSet`]
    pub id: CueId,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, always greater than `start`
    pub end: f64,
    /// Caption text with escapes normalised and override blocks intact
    pub text: String,
    /// Style name, opaque to the engine
    pub style: String,
}

impl Cue {
    /// Create a cue with the `Default` style. The id is assigned when the cue
    /// joins a [`CueSet`].
    #[must_use]
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: CueId(0),
            start,
            end,
            text: text.into(),
            style: String::from("Default"),
        }
    }

    /// Replace the style tag
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Nominal on-screen duration in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `time` falls inside `[start, end]`
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Text with every override block removed
    #[must_use]
    pub fn display_text(&self) -> String {
        strip_tags(&self.text).trim().to_string()
    }

    /// Presentation hints carried by override tags
    #[must_use]
    pub fn text_style(&self) -> TextStyle {
        TextStyle::from_text(&self.text)
    }

    /// Authored motion path, if the text carries a `\move` directive
    #[must_use]
    pub fn explicit_path(&self) -> Option<ExplicitPath> {
        classify(self).explicit_path()
    }
}

/// Start-ordered cues from one parse session
///
/// A new file replaces the whole set; cues are never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueSet {
    cues: Vec<Cue>,
    issues: Vec<ParseIssue>,
}

impl CueSet {
    /// Parse subtitle text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyInput`] for blank input and
    /// [`ParseError::MissingEventsSection`] when no `[Events]` header exists.
    /// Malformed dialogue lines are not errors; see [`CueSet::issues`].
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let (cues, issues) = EventsParser::new(source).parse()?;
        let set = Self::from_parts(cues, issues);
        tracing::debug!(
            cues = set.cues.len(),
            dropped = set.issues.len(),
            "parsed subtitle events"
        );
        Ok(set)
    }

    /// An empty set, used when captions are unavailable
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from cues constructed in code.
    ///
    /// Cues with `end <= start` are discarded, the rest are stably sorted by
    /// start time and renumbered.
    #[must_use]
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let cues = cues.into_iter().filter(|c| c.end > c.start).collect();
        Self::from_parts(cues, Vec::new())
    }

    fn from_parts(mut cues: Vec<Cue>, issues: Vec<ParseIssue>) -> Self {
        // `sort_by` is stable, so equal starts keep file order
        cues.sort_by(|a, b| a.start.total_cmp(&b.start));
        for (index, cue) in cues.iter_mut().enumerate() {
            cue.id = CueId(index);
        }
        Self { cues, issues }
    }

    /// Number of cues
    #[must_use]
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the set holds no cues
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Look up a cue by id
    #[must_use]
    pub fn get(&self, id: CueId) -> Option<&Cue> {
        self.cues.get(id.0)
    }

    /// Iterate in start order
    pub fn iter(&self) -> core::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    /// Lines dropped during parsing
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Cues whose `[start, end]` window contains `time`, in start order
    pub fn active_at(&self, time: f64) -> impl Iterator<Item = &Cue> + '_ {
        let started = self.cues.partition_point(|cue| cue.start <= time);
        self.cues[..started].iter().filter(move |cue| cue.end >= time)
    }
}

impl Index<usize> for CueSet {
    type Output = Cue;

    fn index(&self, index: usize) -> &Cue {
        &self.cues[index]
    }
}

impl<'a> IntoIterator for &'a CueSet {
    type Item = &'a Cue;
    type IntoIter = core::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}
