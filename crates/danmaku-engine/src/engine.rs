//! The overlay engine façade
//!
//! [`OverlayEngine`] ties the cue set, the lifecycle manager, the host's text
//! measurement and a wall clock together behind a single per-frame
//! [`advance`](OverlayEngine::advance) call. Hosts must serialise ticks; the
//! engine holds no locks and spawns nothing.

use core::mem;

use danmaku_core::{CueId, CueSet};

use crate::clock::{MediaClock, SystemClock, WallClock};
use crate::config::EngineConfig;
use crate::lanes::LaneGeometry;
use crate::layout::Viewport;
use crate::lifecycle::LifecycleManager;
use crate::measure::TextMeasure;
use crate::placement::{ActivePlacement, PlacementEvent};
use crate::utils::{EngineError, Result};

/// Inputs sampled by the host for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Media time in seconds
    pub current_time: f64,
    /// Overlay container size
    pub viewport: Viewport,
    /// Playback rate, finite and positive
    pub playback_rate: f64,
}

impl Tick {
    /// Bundle one frame's inputs
    #[must_use]
    pub const fn new(current_time: f64, viewport: Viewport, playback_rate: f64) -> Self {
        Self {
            current_time,
            viewport,
            playback_rate,
        }
    }
}

/// Caption overlay engine for one player instance
pub struct OverlayEngine<M, C = SystemClock> {
    cues: CueSet,
    lifecycle: LifecycleManager,
    measure: M,
    clock: C,
    visible: bool,
    pending: Vec<PlacementEvent>,
}

impl<M: TextMeasure, C: WallClock> OverlayEngine<M, C> {
    /// Create an engine with no cues loaded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EngineConfig, measure: M, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cues: CueSet::empty(),
            lifecycle: LifecycleManager::new(config),
            measure,
            clock,
            visible: true,
            pending: Vec::new(),
        })
    }

    /// Parse `source` and replace the loaded cues, returning the cue count.
    ///
    /// Placements of the previous cue set are retired; their `Exit` events
    /// are delivered by the next [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parse`] when the file has no usable structure.
    /// The engine then holds an empty cue set and keeps working.
    pub fn load(&mut self, source: &str) -> Result<usize> {
        match CueSet::parse(source) {
            Ok(cues) => {
                for issue in cues.issues() {
                    tracing::debug!(%issue, "subtitle line skipped");
                }
                tracing::info!(
                    cues = cues.len(),
                    skipped = cues.issues().len(),
                    "captions loaded"
                );
                let count = cues.len();
                self.set_cues(cues);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(%err, "captions unavailable");
                self.set_cues(CueSet::empty());
                Err(err.into())
            }
        }
    }

    /// Replace the loaded cues with an already-built set
    pub fn set_cues(&mut self, cues: CueSet) {
        let exits = self.lifecycle.clear(self.clock.now_ms());
        self.pending.extend(exits);
        self.cues = cues;
    }

    /// Loaded cues
    #[must_use]
    pub fn cues(&self) -> &CueSet {
        &self.cues
    }

    /// Advance the overlay by one frame.
    ///
    /// Hidden overlays and zero-area containers produce no placements; any
    /// `Exit` events still owed from an earlier `load` or `set_cues` are
    /// returned first.
    ///
    /// # Errors
    ///
    /// Rejects a non-finite or non-positive playback rate and a non-finite or
    /// negative container size. State is left untouched in both cases.
    pub fn advance(&mut self, tick: Tick) -> Result<Vec<PlacementEvent>> {
        let Tick {
            current_time,
            viewport,
            playback_rate,
        } = tick;

        if !playback_rate.is_finite() || playback_rate <= 0.0 {
            return Err(EngineError::InvalidPlaybackRate(playback_rate));
        }
        if !viewport.is_valid() {
            return Err(EngineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let mut events = mem::take(&mut self.pending);
        if !current_time.is_finite() {
            tracing::warn!(current_time, "ignoring tick with non-finite media time");
            return Ok(events);
        }
        if !self.visible || viewport.is_empty() {
            return Ok(events);
        }

        let now_ms = self.clock.now_ms();
        events.extend(self.lifecycle.tick(
            &self.cues,
            current_time,
            viewport,
            playback_rate,
            now_ms,
            &self.measure,
        ));
        Ok(events)
    }

    /// Sample `media` once and advance by one frame.
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance).
    pub fn advance_from<T: MediaClock + ?Sized>(
        &mut self,
        media: &T,
        viewport: Viewport,
        playback_rate: f64,
    ) -> Result<Vec<PlacementEvent>> {
        self.advance(Tick::new(media.current_time(), viewport, playback_rate))
    }

    /// Retire every placement, returning their `Exit` events
    pub fn clear(&mut self) -> Vec<PlacementEvent> {
        let mut events = mem::take(&mut self.pending);
        events.extend(self.lifecycle.clear(self.clock.now_ms()));
        events
    }

    /// Show or hide the overlay.
    ///
    /// Hiding retires every placement and suspends admissions; the returned
    /// events are the resulting exits.
    pub fn set_visible(&mut self, visible: bool) -> Vec<PlacementEvent> {
        if self.visible == visible {
            return Vec::new();
        }
        self.visible = visible;
        tracing::debug!(visible, "overlay visibility changed");
        if visible {
            Vec::new()
        } else {
            self.clear()
        }
    }

    /// Whether the overlay is shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Active placements in cue order
    pub fn active_placements(&self) -> impl Iterator<Item = &ActivePlacement> + '_ {
        self.lifecycle.placements()
    }

    /// Placement for `cue_id`, if active
    #[must_use]
    pub fn placement(&self, cue_id: CueId) -> Option<&ActivePlacement> {
        self.lifecycle.placement(cue_id)
    }

    /// Lane layout used on the latest tick
    #[must_use]
    pub fn lane_geometry(&self) -> Option<&LaneGeometry> {
        self.lifecycle.geometry()
    }

    /// Lifecycle state, for inspection
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.lifecycle.config()
    }

    /// Wall clock driving animations
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<M, C> core::fmt::Debug for OverlayEngine<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayEngine")
            .field("cues", &self.cues.len())
            .field("active", &self.lifecycle.active_count())
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
