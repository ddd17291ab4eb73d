//! Utility types and helper functions

mod errors;

pub use errors::{EngineError, Result};

/// Linear interpolation between `from` and `to`
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// `value` bounded to `[lo, hi]`, with `lo` winning when the bounds cross.
///
/// Unlike `f32::clamp` this never panics, which matters for containers smaller
/// than the configured margins.
#[must_use]
pub fn clamp_floor_wins(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}
