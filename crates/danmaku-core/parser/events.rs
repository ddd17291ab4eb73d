//! Line scanner for the `[Events]` section.
//!
//! Dialogue lines carry ten comma-separated fields. The first nine are fixed
//! position; everything from the tenth onward is free text and may itself
//! contain commas, so the line is split at most nine times.

use crate::parser::{
    cue::Cue,
    errors::{IssueCategory, ParseError, ParseIssue},
    time::parse_ass_time,
};
use crate::utils::strip_bom;

/// Number of comma-separated fields in a dialogue line
const DIALOGUE_FIELDS: usize = 10;
const START_FIELD: usize = 1;
const END_FIELD: usize = 2;
const STYLE_FIELD: usize = 3;
const TEXT_FIELD: usize = 9;

/// Scanner state for one parse session
pub(crate) struct EventsParser<'a> {
    source: &'a str,
    issues: Vec<ParseIssue>,
}

impl<'a> EventsParser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source: strip_bom(source),
            issues: Vec::new(),
        }
    }

    /// Scan the whole source, returning cues in file order plus dropped-line issues.
    pub(crate) fn parse(mut self) -> Result<(Vec<Cue>, Vec<ParseIssue>), ParseError> {
        if self.source.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut cues = Vec::new();
        let mut in_events = false;
        let mut saw_events = false;

        for (index, raw) in self.source.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();

            if line.starts_with('[') {
                let closed = line.ends_with(']');
                in_events = closed && is_events_header(line);
                saw_events |= in_events;
                if !closed {
                    self.issues.push(ParseIssue::warning(
                        IssueCategory::Structure,
                        format!("Unclosed section header: {line}"),
                        line_number,
                    ));
                }
                continue;
            }

            if !in_events {
                continue;
            }

            if let Some(data) = line.strip_prefix("Dialogue:") {
                if let Some(cue) = self.parse_dialogue(data, line_number) {
                    cues.push(cue);
                }
            }
        }

        if !saw_events {
            return Err(ParseError::MissingEventsSection);
        }

        Ok((cues, self.issues))
    }

    fn parse_dialogue(&mut self, data: &str, line_number: usize) -> Option<Cue> {
        let fields: Vec<&str> = data.splitn(DIALOGUE_FIELDS, ',').collect();
        if fields.len() < DIALOGUE_FIELDS {
            self.issues.push(ParseIssue::warning(
                IssueCategory::Format,
                format!(
                    "Dialogue line has {} fields, expected at least {DIALOGUE_FIELDS}",
                    fields.len()
                ),
                line_number,
            ));
            return None;
        }

        let start = self.parse_time_field(fields[START_FIELD], "start", line_number);
        let end = self.parse_time_field(fields[END_FIELD], "end", line_number);
        let (start, end) = (start?, end?);

        if end <= start {
            self.issues.push(ParseIssue::warning(
                IssueCategory::Timing,
                format!("End time {end} is not after start time {start}"),
                line_number,
            ));
            return None;
        }

        let text = normalize_escapes(fields[TEXT_FIELD]);
        let text = text.trim();
        if text.is_empty() {
            self.issues.push(ParseIssue::warning(
                IssueCategory::Format,
                "Dialogue line has empty text".to_string(),
                line_number,
            ));
            return None;
        }

        Some(Cue::new(start, end, text).with_style(fields[STYLE_FIELD].trim()))
    }

    fn parse_time_field(&mut self, field: &str, name: &str, line_number: usize) -> Option<f64> {
        match parse_ass_time(field) {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                tracing::trace!(line = line_number, field = name, %err, "dropping dialogue with bad time");
                self.issues.push(ParseIssue::warning(
                    IssueCategory::Timing,
                    format!("Unparseable {name} time: {err}"),
                    line_number,
                ));
                None
            }
        }
    }
}

fn is_events_header(line: &str) -> bool {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|name| name.trim().eq_ignore_ascii_case("Events"))
}

/// Normalise text escapes: `\N`/`\n` become newlines, `\h` a non-breaking
/// space and `\,` a literal comma. Other backslash sequences are override
/// tags and pass through untouched.
fn normalize_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('N' | 'n') => {
                chars.next();
                out.push('\n');
            }
            Some('h') => {
                chars.next();
                out.push('\u{a0}');
            }
            Some(',') => {
                chars.next();
                out.push(',');
            }
            _ => out.push('\\'),
        }
    }
    out
}
