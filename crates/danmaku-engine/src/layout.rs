//! Trajectory planning for scrolling and explicit-path cues

use danmaku_core::ExplicitPath;

use crate::config::EngineConfig;
use crate::utils::{clamp_floor_wins, lerp};

/// Overlay container dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Container width
    pub width: f32,
    /// Container height
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether both sides are finite and non-negative
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Straight-line motion from a start point to an end point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    /// Start X
    pub start_x: f32,
    /// Start Y
    pub start_y: f32,
    /// End X
    pub end_x: f32,
    /// End Y
    pub end_y: f32,
    /// Planned duration in milliseconds
    pub duration_ms: f64,
}

impl Trajectory {
    /// Position at `progress` in `0.0..=1.0`; the end point once finished
    #[must_use]
    pub fn point_at(&self, progress: f64) -> (f32, f32) {
        if progress >= 1.0 {
            return (self.end_x, self.end_y);
        }
        #[allow(clippy::cast_possible_truncation)]
        let t = progress.max(0.0) as f32;
        (
            lerp(self.start_x, self.end_x, t),
            lerp(self.start_y, self.end_y, t),
        )
    }

    /// Horizontal speed in pixels per second
    #[must_use]
    pub fn speed(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let secs = (self.duration_ms / 1000.0) as f32;
        (self.start_x - self.end_x).abs() / secs
    }
}

/// Planned right-to-left scroll for one cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    /// Clamped animation duration in seconds
    pub duration_secs: f64,
    /// Horizontal speed in pixels per second
    pub speed: f32,
    /// Entry X (the container's right edge)
    pub start_x: f32,
    /// Exit X, fully past the left edge
    pub end_x: f32,
}

impl ScrollPlan {
    /// Trajectory along lane row `y`
    #[must_use]
    pub fn trajectory(&self, y: f32) -> Trajectory {
        Trajectory {
            start_x: self.start_x,
            start_y: y,
            end_x: self.end_x,
            end_y: y,
            duration_ms: self.duration_secs * 1000.0,
        }
    }
}

/// Plan the scroll of a cue `text_width` pixels wide across a container
/// `container_width` pixels wide.
///
/// The duration derived from the base speed is bounded to
/// `[max(min_duration, min_ratio * cue), max_ratio * cue]`; when the bounds
/// cross, the floor wins.
#[must_use]
pub fn plan_scroll(
    config: &EngineConfig,
    container_width: f32,
    text_width: f32,
    cue_duration: f64,
) -> ScrollPlan {
    let distance = container_width + text_width + config.travel_buffer;
    let computed = f64::from(distance) / f64::from(config.pixels_per_second);
    let floor = config
        .min_duration_secs
        .max(config.min_duration_ratio * cue_duration);
    let ceiling = config.max_duration_ratio * cue_duration;
    let duration_secs = computed.min(ceiling).max(floor);

    #[allow(clippy::cast_possible_truncation)]
    let speed = if duration_secs > 0.0 {
        (f64::from(distance) / duration_secs) as f32
    } else {
        0.0
    };

    ScrollPlan {
        duration_secs,
        speed,
        start_x: container_width,
        end_x: -(text_width + config.travel_buffer),
    }
}

/// Map an explicit path from the logical coordinate space into `viewport`.
///
/// X and Y scale independently. The start stays inside the container minus
/// the right and bottom insets; the end may leave through the left edge by up
/// to the configured overshoot.
#[must_use]
pub fn map_explicit(
    config: &EngineConfig,
    viewport: Viewport,
    path: &ExplicitPath,
    cue_duration: f64,
) -> Trajectory {
    let scale_x = viewport.width / config.base_width;
    let scale_y = viewport.height / config.base_height;
    let max_x = viewport.width - config.explicit_margin_right;
    let max_y = viewport.height - config.explicit_margin_bottom;

    Trajectory {
        start_x: clamp_floor_wins(path.x1 * scale_x, 0.0, max_x),
        start_y: clamp_floor_wins(path.y1 * scale_y, 0.0, max_y),
        end_x: clamp_floor_wins(
            path.x2 * scale_x,
            -config.explicit_exit_overshoot,
            viewport.width,
        ),
        end_y: clamp_floor_wins(path.y2 * scale_y, 0.0, max_y),
        duration_ms: path.duration_secs(cue_duration) * 1000.0,
    }
}
