//! Time sources and the rate-scaled animation clock
//!
//! Two clocks feed the engine. The media clock ([`MediaClock`]) reports the
//! player's `currentTime` in seconds and drives cue activation and expiry. The
//! wall clock ([`WallClock`]) reports monotonic milliseconds and drives the
//! animation of each placement, scaled by the playback rate.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond clock used for animation progress
pub trait WallClock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> f64;
}

/// Source of the player's current media time
pub trait MediaClock {
    /// Current media time in seconds
    fn current_time(&self) -> f64;
}

impl<F> MediaClock for F
where
    F: Fn() -> f64,
{
    fn current_time(&self) -> f64 {
        self()
    }
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven wall clock for tests and offline simulation
///
/// Clones share the same time, so a host can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Start at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward; negative steps are ignored
    pub fn advance_ms(&self, delta_ms: f64) {
        if delta_ms > 0.0 {
            self.now.set(self.now.get() + delta_ms);
        }
    }

    /// Jump to an absolute time
    pub fn set_ms(&self, now_ms: f64) {
        self.now.set(now_ms);
    }
}

impl WallClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Per-placement animation clock
///
/// Scaled elapsed time is integrated sample by sample: each interval since
/// the previous committed sample is multiplied by the rate current at the
/// time it is observed. With a constant rate this is exactly
/// `(now - activation) * rate`; when the rate changes, only future intervals
/// see the new value, so progress never moves backward and positions stay
/// continuous. The activation timestamp itself is never rewritten, not even
/// across seeks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    activation_wall_ms: f64,
    last_sample_ms: f64,
    scaled_elapsed_ms: f64,
}

impl AnimationClock {
    /// Start animating at `now_ms`
    #[must_use]
    pub fn start(now_ms: f64) -> Self {
        Self {
            activation_wall_ms: now_ms,
            last_sample_ms: now_ms,
            scaled_elapsed_ms: 0.0,
        }
    }

    /// Wall-clock time at which the placement was activated
    #[must_use]
    pub fn activation_wall_ms(&self) -> f64 {
        self.activation_wall_ms
    }

    /// Rate-scaled milliseconds of animation at `now_ms`
    #[must_use]
    pub fn elapsed_at(&self, now_ms: f64, rate: f64) -> f64 {
        let interval = (now_ms - self.last_sample_ms).max(0.0);
        self.scaled_elapsed_ms + interval * rate
    }

    /// Progress in `0.0..=1.0` for an animation lasting `duration_ms`
    #[must_use]
    pub fn progress_at(&self, now_ms: f64, rate: f64, duration_ms: f64) -> f64 {
        if duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_at(now_ms, rate) / duration_ms).min(1.0)
    }

    /// Fold the interval up to `now_ms` into the clock at `rate`.
    ///
    /// Called once per tick so that a later rate change only affects time
    /// after this sample.
    pub fn commit(&mut self, now_ms: f64, rate: f64) {
        self.scaled_elapsed_ms = self.elapsed_at(now_ms, rate);
        self.last_sample_ms = self.last_sample_ms.max(now_ms);
    }
}
