//! Shared utilities: the crate error type and input normalisation helpers.

mod errors;

pub use errors::CoreError;

/// UTF-8 byte order mark as it appears after decoding.
const BOM: char = '\u{feff}';

/// Strip a leading UTF-8 byte order mark, if present.
///
/// Hand-authored subtitle files are frequently saved with a BOM by desktop
/// editors; it must not leak into the first section header.
#[must_use]
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix(BOM).unwrap_or(source)
}
