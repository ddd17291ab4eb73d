//! Presentation hints read from override tags

use super::override_blocks;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Decode an ASS `BBGGRR` hex value
    #[must_use]
    pub fn from_bgr_hex(hex: &str) -> Option<Self> {
        if hex.is_empty() || hex.len() > 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        })
    }

    /// CSS `rgb(...)` notation
    #[must_use]
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Style flags honoured by the overlay
///
/// Later tags win, so `{\b1}...{\b0}` ends up not bold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// `\b1`
    pub bold: bool,
    /// `\i1`
    pub italic: bool,
    /// `\u1`
    pub underline: bool,
    /// `\s1`
    pub strike_out: bool,
    /// `\c&HBBGGRR&` or `\1c&HBBGGRR&`
    pub color: Option<Rgb>,
    /// `\alpha&HAA&`, as opacity in `0.0..=1.0`
    pub opacity: Option<f32>,
}

impl TextStyle {
    /// Collect style tags from every override block in `text`
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut style = Self::default();
        for block in override_blocks(text) {
            for tag in block.split('\\').filter(|t| !t.is_empty()) {
                style.apply(tag.trim());
            }
        }
        style
    }

    fn apply(&mut self, tag: &str) {
        match tag {
            "b1" => self.bold = true,
            "b0" => self.bold = false,
            "i1" => self.italic = true,
            "i0" => self.italic = false,
            "u1" => self.underline = true,
            "u0" => self.underline = false,
            "s1" => self.strike_out = true,
            "s0" => self.strike_out = false,
            _ => {
                if let Some(hex) = tag.strip_prefix("alpha").and_then(hex_payload) {
                    if let Ok(alpha) = u8::from_str_radix(hex, 16) {
                        self.opacity = Some(f32::from(255 - alpha) / 255.0);
                    }
                } else if let Some(hex) = tag
                    .strip_prefix("1c")
                    .or_else(|| tag.strip_prefix('c'))
                    .and_then(hex_payload)
                {
                    if let Some(color) = Rgb::from_bgr_hex(hex) {
                        self.color = Some(color);
                    }
                }
            }
        }
    }
}

/// Extract `XX` from `&HXX&` (trailing `&` optional)
fn hex_payload(value: &str) -> Option<&str> {
    let hex = value.strip_prefix("&H").or_else(|| value.strip_prefix("&h"))?;
    Some(hex.strip_suffix('&').unwrap_or(hex))
}
