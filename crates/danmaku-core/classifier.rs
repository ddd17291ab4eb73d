//! Trajectory classification
//!
//! A cue either scrolls right-to-left through a lane chosen by the engine, or
//! follows the path authored with a `\move(x1,y1,x2,y2[,t1,t2])` directive.
//! Coordinates are in the script's logical space; `t1`/`t2` are millisecond
//! offsets relative to the cue start.

use crate::parser::Cue;
use crate::tags::directive_args;
use crate::utils::CoreError;
use crate::Result;

/// Authored start-to-end motion in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplicitPath {
    /// Start x
    pub x1: f32,
    /// Start y
    pub y1: f32,
    /// End x
    pub x2: f32,
    /// End y
    pub y2: f32,
    /// Motion start offset in milliseconds (0 when omitted)
    pub t1: f64,
    /// Motion end offset in milliseconds (0 when omitted)
    pub t2: f64,
}

impl ExplicitPath {
    /// Parse the argument list of a `\move(...)` directive.
    ///
    /// Accepts four coordinates optionally followed by `t1` and `t2`; empty
    /// timing slots read as zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDirective`] for a wrong argument count or
    /// non-numeric coordinates.
    pub fn from_directive(args: &str) -> Result<Self> {
        let fields: Vec<&str> = args.split(',').map(str::trim).collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(CoreError::InvalidDirective(format!(
                "move expects 4 or 6 arguments, got {}",
                fields.len()
            )));
        }

        let coord = |index: usize| -> Result<f32> {
            fields[index]
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    CoreError::InvalidDirective(format!("invalid move coordinate: {}", fields[index]))
                })
        };
        let timing = |index: usize| -> Result<f64> {
            match fields.get(index) {
                None | Some(&"") => Ok(0.0),
                Some(raw) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        CoreError::InvalidDirective(format!("invalid move timing: {raw}"))
                    }),
            }
        };

        Ok(Self {
            x1: coord(0)?,
            y1: coord(1)?,
            x2: coord(2)?,
            y2: coord(3)?,
            t1: timing(4)?,
            t2: timing(5)?,
        })
    }

    /// Path duration in seconds.
    ///
    /// Uses the directive's own `t2 - t1` window when it is positive, the
    /// cue's duration otherwise.
    #[must_use]
    pub fn duration_secs(&self, cue_duration: f64) -> f64 {
        if self.t2 > self.t1 {
            (self.t2 - self.t1) / 1000.0
        } else {
            cue_duration
        }
    }
}

/// How a cue moves on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Right-to-left scroll through an engine-assigned lane
    Scrolling,
    /// Authored path that bypasses lane assignment
    Explicit(ExplicitPath),
}

impl Motion {
    /// The explicit path, if any
    #[must_use]
    pub const fn explicit_path(self) -> Option<ExplicitPath> {
        match self {
            Self::Explicit(path) => Some(path),
            Self::Scrolling => None,
        }
    }
}

/// Classify a cue by its text
#[must_use]
pub fn classify(cue: &Cue) -> Motion {
    classify_text(&cue.text)
}

/// Classify raw caption text.
///
/// A malformed `\move` directive is ignored and the cue scrolls.
#[must_use]
pub fn classify_text(text: &str) -> Motion {
    let Some(args) = directive_args(text, "move") else {
        return Motion::Scrolling;
    };
    match ExplicitPath::from_directive(args) {
        Ok(path) => Motion::Explicit(path),
        Err(err) => {
            tracing::trace!(%err, "ignoring malformed move directive");
            Motion::Scrolling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_argument_move_uses_cue_duration() {
        let Motion::Explicit(path) = classify_text("{\\move(10,20,300,40)}hi") else {
            panic!("expected explicit path");
        };
        assert_eq!((path.x1, path.y1, path.x2, path.y2), (10.0, 20.0, 300.0, 40.0));
        assert_eq!(path.duration_secs(4.0), 4.0);
    }

    #[test]
    fn timed_move_uses_its_own_window() {
        let path = classify_text("{\\move(0,0,100,100,500,2500)}x")
            .explicit_path()
            .expect("explicit");
        assert!((path.duration_secs(10.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_or_empty_timing_falls_back() {
        let inverted = classify_text("{\\move(0,0,1,1,900,100)}").explicit_path().unwrap();
        assert_eq!(inverted.duration_secs(3.0), 3.0);

        let empty = classify_text("{\\move(0,0,1,1,,)}").explicit_path().unwrap();
        assert_eq!((empty.t1, empty.t2), (0.0, 0.0));
    }

    #[test]
    fn malformed_or_absent_directives_scroll() {
        assert_eq!(classify_text("plain text"), Motion::Scrolling);
        assert_eq!(classify_text("{\\move(1,2,3)}"), Motion::Scrolling);
        assert_eq!(classify_text("{\\move(a,2,3,4)}"), Motion::Scrolling);
        assert_eq!(classify_text("{\\move(1,2,3,4"), Motion::Scrolling);
    }

    #[test]
    fn directive_errors_carry_context() {
        let err = ExplicitPath::from_directive("1,2").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidDirective("move expects 4 or 6 arguments, got 2".into())
        );
    }
}
