//! Text measurement seam
//!
//! The engine never rasterises text. Hosts supply a [`TextMeasure`] backed by
//! whatever font metrics they have; [`MonospaceMeasure`] is a deterministic
//! fallback for tests and offline tools.

use unicode_width::UnicodeWidthStr;

/// Rendered width of a single line of display text
pub trait TextMeasure {
    /// Width in pixels of `text` rendered at `font_size`
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> f32,
{
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

/// Fixed-advance measurement based on Unicode display width
///
/// Each display column advances `font_size * advance_ratio` pixels, so
/// full-width CJK glyphs count twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance of one column as a fraction of the font size
    pub advance_ratio: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance_ratio: 0.55,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let columns = text.width() as f32;
        columns * font_size * self.advance_ratio
    }
}

/// Width of the widest line of `text`
pub fn widest_line<M: TextMeasure + ?Sized>(measure: &M, text: &str, font_size: f32) -> f32 {
    text.lines()
        .map(|line| measure.measure(line, font_size))
        .fold(0.0, f32::max)
}

/// Number of rendered lines in `text`, never less than one
#[must_use]
pub fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}
