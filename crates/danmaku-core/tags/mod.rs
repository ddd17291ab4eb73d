//! Override-tag helpers
//!
//! Caption text keeps `{...}` override blocks after parsing. These helpers
//! remove them for display and measurement, locate directive arguments, and
//! read the handful of style tags the overlay honours.

mod style;

pub use style::{Rgb, TextStyle};

/// Remove every `{...}` override block.
///
/// An unmatched `{` is kept as literal text.
///
/// # Example
///
/// ```rust
/// use danmaku_core::strip_tags;
///
/// assert_eq!(strip_tags("{\\b1}bold{\\b0} text"), "bold text");
/// ```
#[must_use]
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Contents of each `{...}` override block, braces excluded
pub fn override_blocks(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    core::iter::from_fn(move || {
        let open = rest.find('{')?;
        let close = rest[open..].find('}')?;
        let block = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];
        Some(block)
    })
}

/// Arguments of the first `\name(...)` directive anywhere in `text`
///
/// Returns the text between the parentheses, or `None` when the directive is
/// absent or its parenthesis is never closed.
#[must_use]
pub fn directive_args<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("\\{name}(");
    let start = text.find(&needle)? + needle.len();
    let len = text[start..].find(')')?;
    Some(&text[start..start + len])
}
