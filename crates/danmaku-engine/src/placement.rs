//! Active placements and the events emitted for them

use danmaku_core::CueId;

use crate::clock::AnimationClock;
use crate::collision::BoundingBox;
use crate::layout::Trajectory;

/// On-screen state of one active cue
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePlacement {
    /// Cue being shown
    pub cue_id: CueId,
    /// Lane held by a scrolling cue; `None` for explicit paths
    pub lane: Option<usize>,
    /// Planned motion
    pub trajectory: Trajectory,
    /// Rate-scaled animation clock
    pub clock: AnimationClock,
    /// Horizontal speed in pixels per second
    pub speed: f32,
    /// Collision width, padding included
    pub width: f32,
    /// Collision height
    pub height: f32,
    /// End time of the backing cue, in media seconds
    pub cue_end: f64,
    /// Placed in the last lane because no lane was free
    pub forced: bool,
    /// Media time at admission
    pub admitted_at: f64,
}

impl ActivePlacement {
    /// Animation progress at wall time `now_ms` under `rate`
    #[must_use]
    pub fn progress_at(&self, now_ms: f64, rate: f64) -> f64 {
        self.clock
            .progress_at(now_ms, rate, self.trajectory.duration_ms)
    }

    /// Top-left position at wall time `now_ms` under `rate`
    #[must_use]
    pub fn position_at(&self, now_ms: f64, rate: f64) -> (f32, f32) {
        self.trajectory.point_at(self.progress_at(now_ms, rate))
    }

    /// Collision box at wall time `now_ms` under `rate`
    #[must_use]
    pub fn bounds_at(&self, now_ms: f64, rate: f64) -> BoundingBox {
        let (x, y) = self.position_at(now_ms, rate);
        BoundingBox::new(x, y, self.width, self.height)
    }

    pub(crate) fn event(&self, action: PlacementAction, now_ms: f64, rate: f64) -> PlacementEvent {
        let (x, y) = self.position_at(now_ms, rate);
        PlacementEvent {
            cue_id: self.cue_id,
            action,
            x,
            y,
            duration_ms: (action == PlacementAction::Enter).then_some(self.trajectory.duration_ms),
            lane: self.lane,
        }
    }
}

/// What happened to a placement on this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlacementAction {
    /// Cue became visible
    Enter,
    /// Cue moved
    Update,
    /// Cue was retired
    Exit,
}

/// Instruction for the presentation layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementEvent {
    /// Cue the event refers to
    pub cue_id: CueId,
    /// Kind of change
    pub action: PlacementAction,
    /// Left edge in container pixels
    pub x: f32,
    /// Top edge in container pixels
    pub y: f32,
    /// Planned animation duration, present on `Enter`
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub duration_ms: Option<f64>,
    /// Lane of a scrolling cue
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub lane: Option<usize>,
}
