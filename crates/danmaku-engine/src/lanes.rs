//! Lane geometry and the speed-first lane allocator
//!
//! Scrolling cues move right to left along horizontal lanes. A lane is
//! admissible for a new cue when
//!
//! 1. the cue is not faster than the lane's speed commitment (plus
//!    tolerance), so it can never catch up with a slower cue ahead of it,
//! 2. every occupant of the lane has travelled at least `min_distance`
//!    pixels in from the right edge, and
//! 3. the cue's entry box overlaps no occupied area, in any lane.
//!
//! A cue with several lines reserves a block of consecutive lanes and every
//! lane in the block must be admissible. Blocks are swept top-down. When none
//! is admissible the cue is forced into the lowest block so that it is still
//! shown.

use std::collections::BTreeMap;

use ahash::AHashMap;
use danmaku_core::CueId;

use crate::collision::{BoundingBox, OccupiedArea};
use crate::config::EngineConfig;
use crate::layout::Viewport;
use crate::placement::ActivePlacement;

/// Upper bound on the lane count, whatever the container height
pub const MAX_LANES: usize = 4096;

/// Lane layout for one container height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    /// Number of lanes
    pub max_lanes: usize,
    /// Vertical distance between lanes
    pub line_height: f32,
    /// Y of lane 0
    pub top_offset: f32,
}

impl LaneGeometry {
    /// Derive the lane layout for a container `container_height` pixels tall.
    ///
    /// The lane count never drops below `min_lanes`; when the preferred line
    /// height cannot fit that many lanes, the spacing is compressed instead.
    /// It never exceeds [`MAX_LANES`].
    #[must_use]
    pub fn derive(config: &EngineConfig, container_height: f32) -> Self {
        let usable = (container_height - config.top_margin).max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ideal = ((usable / config.line_height).floor() as usize).min(MAX_LANES);

        if ideal >= config.min_lanes {
            return Self {
                max_lanes: ideal,
                line_height: config.line_height,
                top_offset: config.lane_top_offset,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let compressed = (usable / config.min_lanes as f32).floor().max(1.0);
        Self {
            max_lanes: config.min_lanes,
            line_height: compressed,
            top_offset: config.lane_top_offset,
        }
    }

    /// Y of `lane`
    #[must_use]
    pub fn lane_y(&self, lane: usize) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let index = lane as f32;
        self.top_offset + index * self.line_height
    }

    /// Index of the last lane
    #[must_use]
    pub fn last_lane(&self) -> usize {
        self.max_lanes.saturating_sub(1)
    }

    /// Lanes a cue of `line_count` lines reserves, at most `max_lanes`
    #[must_use]
    pub fn span(&self, line_count: usize) -> usize {
        line_count.clamp(1, self.max_lanes.max(1))
    }

    /// Height of a block of `line_count` lines
    #[must_use]
    pub fn block_height(&self, line_count: usize) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let lines = line_count.max(1) as f32;
        lines * self.line_height
    }
}

/// Scrolling cue asking for a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCandidate {
    /// Cue asking
    pub cue_id: CueId,
    /// Measured text width, padding excluded
    pub text_width: f32,
    /// Planned speed in pixels per second
    pub speed: f32,
    /// Rendered lines; each needs its own lane
    pub line_count: usize,
}

/// Result of a lane admission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneAssignment {
    /// First lane of the chosen block
    pub lane: usize,
    /// Y of the first lane
    pub y: f32,
    /// Lanes reserved, starting at `lane`
    pub span: usize,
    /// Height of the reserved block
    pub height: f32,
    /// No lane was admissible and the last lane was used anyway
    pub forced: bool,
}

#[derive(Debug, Clone, Copy)]
struct Occupant {
    area: OccupiedArea,
    speed: Option<f32>,
}

/// Lane speed commitments and occupied areas
///
/// Every active placement registers an area here. Scrolling placements also
/// feed their lane's speed commitment, which is the slowest speed among the
/// lane's current occupants.
#[derive(Debug, Clone, Default)]
pub struct LaneAllocator {
    commitments: AHashMap<usize, f32>,
    occupants: AHashMap<CueId, Occupant>,
}

impl LaneAllocator {
    /// Empty allocator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a lane for `candidate` and register it there.
    ///
    /// `placements` supplies the current positions of registered occupants,
    /// sampled at wall time `now_ms` under `rate`.
    #[allow(clippy::too_many_arguments)]
    pub fn admit_scrolling(
        &mut self,
        candidate: &ScrollCandidate,
        viewport: Viewport,
        geometry: &LaneGeometry,
        config: &EngineConfig,
        placements: &BTreeMap<CueId, ActivePlacement>,
        now_ms: f64,
        rate: f64,
    ) -> LaneAssignment {
        let width = candidate.text_width + config.collision_padding;
        let span = geometry.span(candidate.line_count);
        let height = geometry.block_height(candidate.line_count);
        let lowest = geometry.max_lanes.saturating_sub(span);
        let chosen = (0..=lowest).find(|&first| {
            let entry = BoundingBox::new(viewport.width, geometry.lane_y(first), width, height);
            (first..first + span).all(|lane| {
                self.lane_admits(candidate, lane, viewport, config, placements, now_ms, rate)
            }) && !self.overlaps_occupant(&entry, placements, now_ms, rate)
        });

        let (lane, forced) = match chosen {
            Some(lane) => (lane, false),
            None => {
                tracing::debug!(cue = %candidate.cue_id, lane = lowest, span, "no free lane, forcing placement");
                (lowest, true)
            }
        };
        let assignment = LaneAssignment {
            lane,
            y: geometry.lane_y(lane),
            span,
            height,
            forced,
        };

        self.occupants.insert(
            candidate.cue_id,
            Occupant {
                area: OccupiedArea {
                    lane: Some(lane),
                    span,
                    width,
                    height,
                },
                speed: Some(candidate.speed),
            },
        );
        for held in lane..lane + span {
            let commitment = self.commitments.entry(held).or_insert(candidate.speed);
            *commitment = commitment.min(candidate.speed);
        }

        tracing::trace!(
            cue = %candidate.cue_id,
            lane = assignment.lane,
            span,
            speed = candidate.speed,
            "lane assigned"
        );
        assignment
    }

    #[allow(clippy::too_many_arguments)]
    fn lane_admits(
        &self,
        candidate: &ScrollCandidate,
        lane: usize,
        viewport: Viewport,
        config: &EngineConfig,
        placements: &BTreeMap<CueId, ActivePlacement>,
        now_ms: f64,
        rate: f64,
    ) -> bool {
        if let Some(&committed) = self.commitments.get(&lane) {
            if candidate.speed > committed * (1.0 + config.speed_tolerance) {
                tracing::trace!(
                    cue = %candidate.cue_id,
                    lane,
                    speed = candidate.speed,
                    committed,
                    "lane rejected by speed commitment"
                );
                return false;
            }
        }

        self.occupants
            .iter()
            .filter(|(_, occupant)| occupant.area.covers(lane))
            .filter_map(|(id, _)| placements.get(id))
            .all(|placement| {
                let (x, _) = placement.position_at(now_ms, rate);
                viewport.width - x >= config.min_distance
            })
    }

    fn overlaps_occupant(
        &self,
        entry: &BoundingBox,
        placements: &BTreeMap<CueId, ActivePlacement>,
        now_ms: f64,
        rate: f64,
    ) -> bool {
        self.occupants.iter().any(|(id, occupant)| {
            placements.get(id).is_some_and(|placement| {
                let (x, y) = placement.position_at(now_ms, rate);
                entry.intersects(&occupant.area.at(x, y))
            })
        })
    }

    /// Register the occupied area of an explicit-path placement.
    ///
    /// Explicit paths take part in overlap checks but hold no lane and no
    /// speed commitment.
    pub fn register_explicit(&mut self, cue_id: CueId, width: f32, height: f32) {
        self.occupants.insert(
            cue_id,
            Occupant {
                area: OccupiedArea {
                    lane: None,
                    span: 0,
                    width,
                    height,
                },
                speed: None,
            },
        );
    }

    /// Forget `cue_id`, recomputing or clearing the speed commitment of every
    /// lane it held
    pub fn release(&mut self, cue_id: CueId) {
        let Some(occupant) = self.occupants.remove(&cue_id) else {
            return;
        };
        let Some(first) = occupant.area.lane else {
            return;
        };

        for lane in first..first + occupant.area.span {
            let remaining = self
                .occupants
                .values()
                .filter(|other| other.area.covers(lane))
                .filter_map(|other| other.speed)
                .reduce(f32::min);
            match remaining {
                Some(speed) => {
                    self.commitments.insert(lane, speed);
                }
                None => {
                    self.commitments.remove(&lane);
                    tracing::trace!(lane, "lane speed commitment cleared");
                }
            }
        }
    }

    /// Drop all bookkeeping, e.g. after a container resize
    pub fn clear(&mut self) {
        self.commitments.clear();
        self.occupants.clear();
    }

    /// Speed commitment currently held by `lane`
    #[must_use]
    pub fn speed_commitment(&self, lane: usize) -> Option<f32> {
        self.commitments.get(&lane).copied()
    }

    /// First lane registered for `cue_id`
    #[must_use]
    pub fn lane_of(&self, cue_id: CueId) -> Option<usize> {
        self.occupants.get(&cue_id).and_then(|o| o.area.lane)
    }

    /// Number of registered occupied areas
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupants.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AnimationClock;
    use crate::layout::Trajectory;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport::new(800.0, 400.0);

    fn scrolling(id: usize, lane: usize, width: f32, speed: f32, now_ms: f64) -> ActivePlacement {
        scrolling_block(id, lane, 1, width, speed, now_ms)
    }

    fn scrolling_block(
        id: usize,
        lane: usize,
        lines: usize,
        width: f32,
        speed: f32,
        now_ms: f64,
    ) -> ActivePlacement {
        let geometry = LaneGeometry::derive(&EngineConfig::default(), VIEWPORT.height);
        let y = geometry.lane_y(lane);
        let distance = VIEWPORT.width + width + 50.0;
        ActivePlacement {
            cue_id: CueId(id),
            lane: Some(lane),
            trajectory: Trajectory {
                start_x: VIEWPORT.width,
                start_y: y,
                end_x: -(width + 50.0),
                end_y: y,
                duration_ms: f64::from(distance / speed) * 1000.0,
            },
            clock: AnimationClock::start(now_ms),
            speed,
            width: width + 15.0,
            height: geometry.block_height(lines),
            cue_end: 10.0,
            forced: false,
            admitted_at: 0.0,
        }
    }

    fn admit(
        allocator: &mut LaneAllocator,
        placements: &mut BTreeMap<CueId, ActivePlacement>,
        id: usize,
        width: f32,
        speed: f32,
        now_ms: f64,
    ) -> LaneAssignment {
        admit_lines(allocator, placements, id, 1, width, speed, now_ms)
    }

    fn admit_lines(
        allocator: &mut LaneAllocator,
        placements: &mut BTreeMap<CueId, ActivePlacement>,
        id: usize,
        lines: usize,
        width: f32,
        speed: f32,
        now_ms: f64,
    ) -> LaneAssignment {
        let config = EngineConfig::default();
        let geometry = LaneGeometry::derive(&config, VIEWPORT.height);
        let candidate = ScrollCandidate {
            cue_id: CueId(id),
            text_width: width,
            speed,
            line_count: lines,
        };
        let assignment = allocator.admit_scrolling(
            &candidate, VIEWPORT, &geometry, &config, placements, now_ms, 1.0,
        );
        placements.insert(
            CueId(id),
            scrolling_block(id, assignment.lane, lines, width, speed, now_ms),
        );
        assignment
    }

    #[test]
    fn geometry_uses_preferred_spacing_when_tall_enough() {
        let geometry = LaneGeometry::derive(&EngineConfig::default(), 720.0);
        assert_eq!(geometry.max_lanes, 34);
        assert_eq!(geometry.line_height, 20.0);
        assert_eq!(geometry.lane_y(0), 20.0);
        assert_eq!(geometry.lane_y(3), 80.0);
    }

    #[test]
    fn geometry_compresses_to_honor_floor() {
        let geometry = LaneGeometry::derive(&EngineConfig::default(), 120.0);
        assert_eq!(geometry.max_lanes, 8);
        assert_eq!(geometry.line_height, 10.0);

        let tiny = LaneGeometry::derive(&EngineConfig::default(), 10.0);
        assert_eq!(tiny.max_lanes, 8);
        assert_eq!(tiny.line_height, 1.0);
    }

    #[test]
    fn geometry_caps_lane_count_for_huge_containers() {
        let geometry = LaneGeometry::derive(&EngineConfig::default(), 1e30);
        assert_eq!(geometry.max_lanes, MAX_LANES);

        let mut allocator = LaneAllocator::new();
        let placements = BTreeMap::new();
        let candidate = ScrollCandidate {
            cue_id: CueId(0),
            text_width: 100.0,
            speed: 180.0,
            line_count: 1,
        };
        let config = EngineConfig::default();
        let assignment = allocator.admit_scrolling(
            &candidate,
            Viewport::new(800.0, 1e30),
            &geometry,
            &config,
            &placements,
            0.0,
            1.0,
        );
        assert_eq!(assignment.lane, 0);
    }

    #[test]
    fn simultaneous_cue_takes_next_lane() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        let first = admit(&mut allocator, &mut placements, 0, 600.0, 180.0, 0.0);
        let second = admit(&mut allocator, &mut placements, 1, 600.0, 180.0, 0.0);
        assert_eq!(first.lane, 0);
        assert_eq!(second.lane, 1);
        assert!(!second.forced);
    }

    #[test]
    fn multi_line_cue_reserves_consecutive_lanes() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        let block = admit_lines(&mut allocator, &mut placements, 0, 3, 200.0, 180.0, 0.0);
        assert_eq!((block.lane, block.span), (0, 3));
        assert_eq!(block.height, 60.0);
        assert_eq!(allocator.speed_commitment(2), Some(180.0));

        // lanes 1 and 2 are held by the block, so the next cue goes below it
        let next = admit(&mut allocator, &mut placements, 1, 200.0, 180.0, 0.0);
        assert_eq!(next.lane, 3);
        assert!(next.y >= block.y + block.height);

        allocator.release(CueId(0));
        assert_eq!(allocator.speed_commitment(0), None);
        assert_eq!(allocator.speed_commitment(2), None);
        assert_eq!(allocator.speed_commitment(3), Some(180.0));
    }

    #[test]
    fn multi_line_cue_skips_block_with_busy_lane() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        admit(&mut allocator, &mut placements, 0, 200.0, 180.0, 0.0);
        let second = admit(&mut allocator, &mut placements, 1, 200.0, 180.0, 1000.0);
        assert_eq!(second.lane, 1);

        // at 1.5 s lane 0 has cleared but lane 1 has not
        let block = admit_lines(&mut allocator, &mut placements, 2, 2, 200.0, 180.0, 1500.0);
        assert_eq!((block.lane, block.span), (2, 2));
        assert!(!block.forced);
    }

    #[test]
    fn lane_reopens_after_clearance() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        admit(&mut allocator, &mut placements, 0, 100.0, 200.0, 0.0);

        // 0.5 s in: head is 100 px in, short of the 120 px clearance
        let early = admit(&mut allocator, &mut placements, 1, 100.0, 200.0, 500.0);
        assert_eq!(early.lane, 1);

        // 1.5 s in: head 300 px in, tail 185 px in
        let late = admit(&mut allocator, &mut placements, 2, 100.0, 200.0, 1500.0);
        assert_eq!(late.lane, 0);
    }

    #[test]
    fn faster_cue_is_kept_off_slower_lane() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        admit(&mut allocator, &mut placements, 0, 50.0, 100.0, 0.0);

        let fast = admit(&mut allocator, &mut placements, 1, 50.0, 300.0, 5000.0);
        assert_eq!(fast.lane, 1);

        let within_tolerance = admit(&mut allocator, &mut placements, 2, 50.0, 102.0, 5000.0);
        assert_eq!(within_tolerance.lane, 0);
        assert_eq!(allocator.speed_commitment(0), Some(100.0));
    }

    #[test]
    fn release_recomputes_then_clears_commitment() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        admit(&mut allocator, &mut placements, 0, 50.0, 100.0, 0.0);
        admit(&mut allocator, &mut placements, 1, 50.0, 90.0, 5000.0);
        assert_eq!(allocator.speed_commitment(0), Some(90.0));

        allocator.release(CueId(1));
        assert_eq!(allocator.speed_commitment(0), Some(100.0));
        allocator.release(CueId(0));
        assert_eq!(allocator.speed_commitment(0), None);
        assert_eq!(allocator.occupied_count(), 0);
    }

    #[test]
    fn full_container_forces_last_lane() {
        let config = EngineConfig::default();
        let geometry = LaneGeometry::derive(&config, VIEWPORT.height);
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        for id in 0..geometry.max_lanes {
            let assignment = admit(&mut allocator, &mut placements, id, 300.0, 180.0, 0.0);
            assert!(!assignment.forced);
        }
        let overflow = admit(
            &mut allocator,
            &mut placements,
            geometry.max_lanes,
            300.0,
            180.0,
            0.0,
        );
        assert!(overflow.forced);
        assert_eq!(overflow.lane, geometry.last_lane());
        assert_eq!(overflow.y, geometry.lane_y(geometry.last_lane()));
    }

    #[test]
    fn explicit_area_blocks_overlapping_lanes() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        let mut explicit = scrolling(9, 0, 200.0, 0.0, 0.0);
        explicit.lane = None;
        explicit.trajectory = Trajectory {
            start_x: 700.0,
            start_y: 15.0,
            end_x: 700.0,
            end_y: 15.0,
            duration_ms: 4000.0,
        };
        placements.insert(CueId(9), explicit);
        allocator.register_explicit(CueId(9), 215.0, 30.0);

        // box spans y 15..45, covering lanes 0 (20..40) and 1 (40..60)
        let assignment = admit(&mut allocator, &mut placements, 0, 100.0, 180.0, 0.0);
        assert_eq!(assignment.lane, 2);
        assert_eq!(allocator.lane_of(CueId(9)), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut allocator = LaneAllocator::new();
        let mut placements = BTreeMap::new();
        admit(&mut allocator, &mut placements, 0, 100.0, 180.0, 0.0);
        allocator.clear();
        assert_eq!(allocator.speed_commitment(0), None);
        let again = admit(&mut allocator, &mut placements, 1, 100.0, 180.0, 0.0);
        assert_eq!(again.lane, 0);
    }
}
