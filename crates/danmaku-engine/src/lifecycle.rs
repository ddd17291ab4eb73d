//! Active-cue lifecycle: activation, animation updates and expiry
//!
//! Each cue moves through `Pending -> Active -> Expired`. A cue activates on
//! the first tick whose media time falls inside its window and expires once
//! the media time passes its end plus the grace period. Activation is keyed
//! by cue identity, so repeated ticks at the same time are idempotent.

use std::collections::BTreeMap;

use ahash::AHashSet;
use danmaku_core::{classify, Cue, CueId, CueSet, Motion};
use smallvec::SmallVec;

use crate::clock::AnimationClock;
use crate::config::EngineConfig;
use crate::lanes::{LaneAllocator, LaneGeometry, ScrollCandidate};
use crate::layout::{map_explicit, plan_scroll, Viewport};
use crate::measure::{line_count, widest_line, TextMeasure};
use crate::placement::{ActivePlacement, PlacementAction, PlacementEvent};

/// Recently activated cues, bucketed by start time in tenths of a second
#[derive(Debug, Clone, Default)]
struct SuppressionLog {
    buckets: BTreeMap<i64, AHashSet<CueId>>,
}

impl SuppressionLog {
    #[allow(clippy::cast_possible_truncation)]
    fn key(start: f64) -> i64 {
        (start * 10.0).round() as i64
    }

    fn contains(&self, cue: &Cue) -> bool {
        self.buckets
            .get(&Self::key(cue.start))
            .is_some_and(|ids| ids.contains(&cue.id))
    }

    fn insert(&mut self, cue: &Cue) {
        self.buckets
            .entry(Self::key(cue.start))
            .or_default()
            .insert(cue.id);
    }

    /// Drop buckets for cues that started before `cutoff` seconds
    fn prune_before(&mut self, cutoff: f64) {
        let keep = self.buckets.split_off(&Self::key(cutoff));
        self.buckets = keep;
    }

    fn len(&self) -> usize {
        self.buckets.values().map(|ids| ids.len()).sum()
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}

/// Owner of every active placement and of the lane bookkeeping
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    config: EngineConfig,
    placements: BTreeMap<CueId, ActivePlacement>,
    allocator: LaneAllocator,
    suppression: SuppressionLog,
    viewport: Option<Viewport>,
    geometry: Option<LaneGeometry>,
    last_time: Option<f64>,
    last_rate: Option<f64>,
}

impl LifecycleManager {
    /// Create a manager with no active placements
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            placements: BTreeMap::new(),
            allocator: LaneAllocator::new(),
            suppression: SuppressionLog::default(),
            viewport: None,
            geometry: None,
            last_time: None,
            last_rate: None,
        }
    }

    /// Advance to media time `current_time`.
    ///
    /// `now_ms` is the wall clock sample shared by every placement this tick
    /// and `rate` the playback rate to apply to the interval since the
    /// previous tick. Events are returned as exits, then enters, then
    /// updates, each group in cue order.
    #[allow(clippy::too_many_arguments)]
    pub fn tick<M: TextMeasure + ?Sized>(
        &mut self,
        cues: &CueSet,
        current_time: f64,
        viewport: Viewport,
        rate: f64,
        now_ms: f64,
        measure: &M,
    ) -> Vec<PlacementEvent> {
        if self.last_rate.is_some_and(|last| last != rate) {
            tracing::debug!(rate, previous = self.last_rate, "playback rate changed");
        }
        self.last_rate = Some(rate);

        let geometry = self.sync_viewport(viewport);

        if let Some(last) = self.last_time {
            if (current_time - last).abs() > self.config.seek_threshold_secs {
                tracing::debug!(from = last, to = current_time, "seek detected");
                self.suppression.clear();
            }
        }
        self.last_time = Some(current_time);
        self.suppression
            .prune_before(current_time - self.config.retention_secs);

        let mut events = self.expire(current_time, now_ms, rate);

        for placement in self.placements.values_mut() {
            placement.clock.commit(now_ms, rate);
        }

        let mut entered: SmallVec<[CueId; 8]> = SmallVec::new();
        for cue in cues.active_at(current_time) {
            if self.placements.contains_key(&cue.id) || self.suppression.contains(cue) {
                continue;
            }
            let placement =
                self.activate(cue, current_time, viewport, &geometry, now_ms, rate, measure);
            events.push(placement.event(PlacementAction::Enter, now_ms, rate));
            self.suppression.insert(cue);
            self.placements.insert(cue.id, placement);
            entered.push(cue.id);
        }

        events.extend(
            self.placements
                .values()
                .filter(|placement| !entered.contains(&placement.cue_id))
                .map(|placement| placement.event(PlacementAction::Update, now_ms, rate)),
        );
        events
    }

    fn sync_viewport(&mut self, viewport: Viewport) -> LaneGeometry {
        match (self.viewport, self.geometry) {
            (Some(current), Some(geometry)) if current == viewport => geometry,
            (previous, _) => {
                if previous.is_some() {
                    tracing::debug!(
                        width = viewport.width,
                        height = viewport.height,
                        "container resized, lane bookkeeping invalidated"
                    );
                    self.allocator.clear();
                }
                let geometry = LaneGeometry::derive(&self.config, viewport.height);
                self.viewport = Some(viewport);
                self.geometry = Some(geometry);
                geometry
            }
        }
    }

    fn expire(&mut self, current_time: f64, now_ms: f64, rate: f64) -> Vec<PlacementEvent> {
        let grace = self.config.grace_secs;
        let expired: SmallVec<[CueId; 8]> = self
            .placements
            .values()
            .filter(|placement| current_time > placement.cue_end + grace)
            .map(|placement| placement.cue_id)
            .collect();

        let mut events = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(placement) = self.placements.remove(&id) {
                self.allocator.release(id);
                tracing::trace!(cue = %id, "placement expired");
                events.push(placement.event(PlacementAction::Exit, now_ms, rate));
            }
        }
        events
    }

    #[allow(clippy::too_many_arguments)]
    fn activate<M: TextMeasure + ?Sized>(
        &mut self,
        cue: &Cue,
        current_time: f64,
        viewport: Viewport,
        geometry: &LaneGeometry,
        now_ms: f64,
        rate: f64,
        measure: &M,
    ) -> ActivePlacement {
        let config = &self.config;
        let text = cue.display_text();
        let text_width = widest_line(measure, &text, config.font_size);
        let lines = line_count(&text);
        let width = text_width + config.collision_padding;
        let clock = AnimationClock::start(now_ms);

        match classify(cue) {
            Motion::Explicit(path) => {
                let trajectory = map_explicit(config, viewport, &path, cue.duration());
                #[allow(clippy::cast_precision_loss)]
                let height = config.text_height * lines as f32;
                self.allocator.register_explicit(cue.id, width, height);
                tracing::debug!(cue = %cue.id, x = trajectory.start_x, y = trajectory.start_y, "explicit path activated");
                ActivePlacement {
                    cue_id: cue.id,
                    lane: None,
                    speed: trajectory.speed(),
                    trajectory,
                    clock,
                    width,
                    height,
                    cue_end: cue.end,
                    forced: false,
                    admitted_at: current_time,
                }
            }
            Motion::Scrolling => {
                let plan = plan_scroll(config, viewport.width, text_width, cue.duration());
                let candidate = ScrollCandidate {
                    cue_id: cue.id,
                    text_width,
                    speed: plan.speed,
                    line_count: lines,
                };
                let assignment = self.allocator.admit_scrolling(
                    &candidate,
                    viewport,
                    geometry,
                    config,
                    &self.placements,
                    now_ms,
                    rate,
                );
                tracing::debug!(
                    cue = %cue.id,
                    lane = assignment.lane,
                    span = assignment.span,
                    forced = assignment.forced,
                    duration = plan.duration_secs,
                    "scrolling cue activated"
                );
                ActivePlacement {
                    cue_id: cue.id,
                    lane: Some(assignment.lane),
                    trajectory: plan.trajectory(assignment.y),
                    clock,
                    speed: plan.speed,
                    width,
                    height: assignment.height,
                    cue_end: cue.end,
                    forced: assignment.forced,
                    admitted_at: current_time,
                }
            }
        }
    }

    /// Retire every placement and forget all bookkeeping.
    ///
    /// Returns an `Exit` for each placement that was active.
    pub fn clear(&mut self, now_ms: f64) -> Vec<PlacementEvent> {
        let rate = self.last_rate.unwrap_or(1.0);
        let events = self
            .placements
            .values()
            .map(|placement| placement.event(PlacementAction::Exit, now_ms, rate))
            .collect();
        self.placements.clear();
        self.allocator.clear();
        self.suppression.clear();
        self.viewport = None;
        self.geometry = None;
        self.last_time = None;
        events
    }

    /// Active placements in cue order
    pub fn placements(&self) -> impl Iterator<Item = &ActivePlacement> + '_ {
        self.placements.values()
    }

    /// Placement for `cue_id`, if active
    #[must_use]
    pub fn placement(&self, cue_id: CueId) -> Option<&ActivePlacement> {
        self.placements.get(&cue_id)
    }

    /// Number of active placements
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.placements.len()
    }

    /// Lane layout derived on the latest tick
    #[must_use]
    pub fn geometry(&self) -> Option<&LaneGeometry> {
        self.geometry.as_ref()
    }

    /// Lane bookkeeping
    #[must_use]
    pub fn allocator(&self) -> &LaneAllocator {
        &self.allocator
    }

    /// Cues currently held for duplicate suppression
    #[must_use]
    pub fn suppressed_count(&self) -> usize {
        self.suppression.len()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MonospaceMeasure;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn actions(events: &[PlacementEvent]) -> Vec<(usize, PlacementAction)> {
        events.iter().map(|e| (e.cue_id.0, e.action)).collect()
    }

    fn manager() -> LifecycleManager {
        LifecycleManager::new(EngineConfig::default())
    }

    #[test]
    fn cue_enters_updates_and_exits() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 3.0, "hello")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        assert!(lifecycle.tick(&cues, 0.5, VIEWPORT, 1.0, 0.0, &measure).is_empty());

        let events = lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 500.0, &measure);
        assert_eq!(actions(&events), vec![(0, PlacementAction::Enter)]);
        assert_eq!(events[0].x, 1280.0);
        assert_eq!(events[0].lane, Some(0));

        let events = lifecycle.tick(&cues, 2.0, VIEWPORT, 1.0, 1500.0, &measure);
        assert_eq!(actions(&events), vec![(0, PlacementAction::Update)]);
        assert!(events[0].x < 1280.0);

        let events = lifecycle.tick(&cues, 3.4, VIEWPORT, 1.0, 2900.0, &measure);
        assert_eq!(actions(&events), vec![(0, PlacementAction::Update)]);

        let events = lifecycle.tick(&cues, 3.6, VIEWPORT, 1.0, 3100.0, &measure);
        assert_eq!(actions(&events), vec![(0, PlacementAction::Exit)]);
        assert_eq!(lifecycle.active_count(), 0);
        assert_eq!(lifecycle.allocator().speed_commitment(0), None);
    }

    #[test]
    fn repeated_tick_does_not_duplicate() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 3.0, "a"), Cue::new(1.0, 3.0, "b")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        let first = lifecycle.tick(&cues, 1.5, VIEWPORT, 1.0, 0.0, &measure);
        let second = lifecycle.tick(&cues, 1.5, VIEWPORT, 1.0, 0.0, &measure);
        assert_eq!(
            actions(&first),
            vec![(0, PlacementAction::Enter), (1, PlacementAction::Enter)]
        );
        assert_eq!(
            actions(&second),
            vec![(0, PlacementAction::Update), (1, PlacementAction::Update)]
        );
        assert_eq!(lifecycle.active_count(), 2);
    }

    #[test]
    fn small_rewind_after_expiry_is_suppressed() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 2.0, "blip")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        lifecycle.tick(&cues, 1.5, VIEWPORT, 1.0, 0.0, &measure);
        lifecycle.tick(&cues, 2.3, VIEWPORT, 1.0, 800.0, &measure);
        let exit = lifecycle.tick(&cues, 2.6, VIEWPORT, 1.0, 1100.0, &measure);
        assert_eq!(actions(&exit), vec![(0, PlacementAction::Exit)]);

        // a rewind smaller than the seek threshold must not replay the cue
        let rewind = lifecycle.tick(&cues, 1.9, VIEWPORT, 1.0, 1200.0, &measure);
        assert!(rewind.is_empty());
        assert_eq!(lifecycle.suppressed_count(), 1);

        // a real seek clears suppression and the cue plays again
        let seek = lifecycle.tick(&cues, 0.2, VIEWPORT, 1.0, 1300.0, &measure);
        assert!(seek.is_empty());
        assert_eq!(lifecycle.suppressed_count(), 0);
        let events = lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 1400.0, &measure);
        assert_eq!(actions(&events), vec![(0, PlacementAction::Enter)]);
    }

    #[test]
    fn suppression_is_pruned_after_retention() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 2.0, "old"), Cue::new(20.0, 21.0, "new")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        let mut now = 0.0;
        let mut time = 1.0;
        while time < 20.5 {
            lifecycle.tick(&cues, time, VIEWPORT, 1.0, now, &measure);
            time += 0.5;
            now += 500.0;
        }
        assert_eq!(lifecycle.suppressed_count(), 1);
    }

    #[test]
    fn resize_invalidates_lane_bookkeeping() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 9.0, "first"), Cue::new(1.5, 9.0, "second")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 0.0, &measure);
        assert_eq!(lifecycle.allocator().occupied_count(), 1);

        let resized = Viewport::new(640.0, 360.0);
        let events = lifecycle.tick(&cues, 1.5, resized, 1.0, 500.0, &measure);
        assert_eq!(
            actions(&events),
            vec![(1, PlacementAction::Enter), (0, PlacementAction::Update)]
        );
        // the in-flight cue was forgotten, so the newcomer takes lane 0
        assert_eq!(events[0].lane, Some(0));
        assert_eq!(events[0].x, 640.0);
        assert_eq!(lifecycle.geometry().map(|g| g.max_lanes), Some(16));
    }

    #[test]
    fn multi_line_cue_blocks_lanes_beneath_it() {
        let cues = CueSet::from_cues(vec![
            Cue::new(1.0, 5.0, "one\ntwo\nthree"),
            Cue::new(1.0, 5.0, "other"),
        ]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();
        lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 0.0, &measure);

        let first = lifecycle.placement(CueId(0)).unwrap();
        let second = lifecycle.placement(CueId(1)).unwrap();
        assert_eq!(first.height, 60.0);
        assert_eq!(second.lane, Some(3));
        assert!(second.trajectory.start_y >= first.trajectory.start_y + first.height);
        assert!(!first.bounds_at(0.0, 1.0).intersects(&second.bounds_at(0.0, 1.0)));
    }

    #[test]
    fn explicit_path_bypasses_lanes() {
        let cues = CueSet::from_cues(vec![Cue::new(
            1.0,
            3.0,
            r"{\move(320,180,0,180)}sign",
        )]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();

        let events = lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 0.0, &measure);
        assert_eq!(events[0].lane, None);
        assert_eq!((events[0].x, events[0].y), (640.0, 360.0));
        assert_eq!(events[0].duration_ms, Some(2000.0));
        assert_eq!(lifecycle.allocator().occupied_count(), 1);
        assert_eq!(lifecycle.allocator().speed_commitment(0), None);
    }

    #[test]
    fn clear_exits_everything() {
        let cues = CueSet::from_cues(vec![Cue::new(1.0, 3.0, "a"), Cue::new(1.0, 3.0, "b")]);
        let measure = MonospaceMeasure::default();
        let mut lifecycle = manager();
        lifecycle.tick(&cues, 1.0, VIEWPORT, 1.0, 0.0, &measure);

        let events = lifecycle.clear(100.0);
        assert_eq!(
            actions(&events),
            vec![(0, PlacementAction::Exit), (1, PlacementAction::Exit)]
        );
        assert_eq!(lifecycle.active_count(), 0);
        assert_eq!(lifecycle.suppressed_count(), 0);
        assert_eq!(lifecycle.allocator().occupied_count(), 0);
    }
}
