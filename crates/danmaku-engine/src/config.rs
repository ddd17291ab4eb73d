//! Engine configuration
//!
//! Every tunable constant of the scheduler lives here so that layout presets
//! differ only in data, never in algorithm.

use crate::utils::{EngineError, Result};

/// Viewport width at or below which [`EngineConfig::for_viewport_width`]
/// picks the compact preset
pub const COMPACT_BREAKPOINT: f32 = 768.0;

/// Tunables for lane derivation, collision checks, pacing and lifecycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Lane-count floor; line spacing shrinks before lanes do
    pub min_lanes: usize,
    /// Preferred lane spacing in pixels
    pub line_height: f32,
    /// Vertical space excluded from lane derivation
    pub top_margin: f32,
    /// Y coordinate of lane 0
    pub lane_top_offset: f32,
    /// Rendered text height, used for explicit-path occupied areas
    pub text_height: f32,
    /// Font size handed to the text measure
    pub font_size: f32,
    /// Horizontal padding added to every scrolling caption's box
    pub collision_padding: f32,
    /// Minimum gap between the right edge and a same-lane predecessor's left edge
    pub min_distance: f32,
    /// A lane rejects captions faster than its commitment by more than this fraction
    pub speed_tolerance: f32,
    /// Base scrolling speed
    pub pixels_per_second: f32,
    /// Extra travel past the left edge so captions fully leave the screen
    pub travel_buffer: f32,
    /// Absolute lower bound for a scroll duration
    pub min_duration_secs: f64,
    /// Lower duration bound as a fraction of the cue's own duration
    pub min_duration_ratio: f64,
    /// Upper duration bound as a multiple of the cue's own duration
    pub max_duration_ratio: f64,
    /// Extra visibility after a cue's nominal end
    pub grace_secs: f64,
    /// How long duplicate-suppression keys are kept
    pub retention_secs: f64,
    /// A jump in media time larger than this counts as a seek
    pub seek_threshold_secs: f64,
    /// Logical width of explicit-path coordinates
    pub base_width: f32,
    /// Logical height of explicit-path coordinates
    pub base_height: f32,
    /// Explicit paths start at least this far left of the right edge
    pub explicit_margin_right: f32,
    /// Explicit paths stay at least this far above the bottom edge
    pub explicit_margin_bottom: f32,
    /// How far left of zero an explicit path may end
    pub explicit_exit_overshoot: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_lanes: 8,
            line_height: 20.0,
            top_margin: 40.0,
            lane_top_offset: 20.0,
            text_height: 20.0,
            font_size: 16.0,
            collision_padding: 15.0,
            min_distance: 120.0,
            speed_tolerance: 0.03,
            pixels_per_second: 180.0,
            travel_buffer: 50.0,
            min_duration_secs: 3.0,
            min_duration_ratio: 0.8,
            max_duration_ratio: 2.5,
            grace_secs: 0.5,
            retention_secs: 10.0,
            seek_threshold_secs: 1.0,
            base_width: 640.0,
            base_height: 360.0,
            explicit_margin_right: 100.0,
            explicit_margin_bottom: 30.0,
            explicit_exit_overshoot: 200.0,
        }
    }
}

impl EngineConfig {
    /// Preset for narrow (mobile) containers
    #[must_use]
    pub fn compact() -> Self {
        Self {
            line_height: 10.0,
            text_height: 16.0,
            font_size: 14.0,
            pixels_per_second: 150.0,
            base_width: 360.0,
            base_height: 200.0,
            ..Self::default()
        }
    }

    /// Default preset for wide containers, compact at or below the breakpoint
    #[must_use]
    pub fn for_viewport_width(width: f32) -> Self {
        if width > COMPACT_BREAKPOINT {
            Self::default()
        } else {
            Self::compact()
        }
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn positive_f32(name: &str, value: f32) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )))
            }
        }

        if self.min_lanes == 0 {
            return Err(EngineError::InvalidConfig(
                "min_lanes must be at least 1".to_string(),
            ));
        }
        positive_f32("line_height", self.line_height)?;
        positive_f32("text_height", self.text_height)?;
        positive_f32("font_size", self.font_size)?;
        positive_f32("pixels_per_second", self.pixels_per_second)?;
        positive_f32("base_width", self.base_width)?;
        positive_f32("base_height", self.base_height)?;
        for (name, value) in [
            ("top_margin", self.top_margin),
            ("lane_top_offset", self.lane_top_offset),
            ("collision_padding", self.collision_padding),
            ("min_distance", self.min_distance),
            ("speed_tolerance", self.speed_tolerance),
            ("travel_buffer", self.travel_buffer),
            ("explicit_margin_right", self.explicit_margin_right),
            ("explicit_margin_bottom", self.explicit_margin_bottom),
            ("explicit_exit_overshoot", self.explicit_exit_overshoot),
        ] {
            non_negative(name, f64::from(value))?;
        }
        non_negative("min_duration_secs", self.min_duration_secs)?;
        non_negative("grace_secs", self.grace_secs)?;
        non_negative("retention_secs", self.retention_secs)?;
        non_negative("seek_threshold_secs", self.seek_threshold_secs)?;
        if !(self.min_duration_ratio.is_finite() && self.min_duration_ratio > 0.0) {
            return Err(EngineError::InvalidConfig(
                "min_duration_ratio must be positive".to_string(),
            ));
        }
        if !(self.max_duration_ratio.is_finite() && self.max_duration_ratio > 0.0) {
            return Err(EngineError::InvalidConfig(
                "max_duration_ratio must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
