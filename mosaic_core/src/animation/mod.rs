// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tile highlight and entry sequences.
//!
//! Every arrival starts two independent sequences:
//!
//! - a **highlight pulse**, a boolean that clears after
//!   [`AnimationConfig::highlight_pulse`]. Retriggering a highlighted tile
//!   restarts the pulse instead of stacking a second expiry.
//! - an **entry sequence** that walks `spawning → measured → done`. Geometry
//!   is the only way out of `spawning`; see
//!   [`AnimationController::measure_pending`] and
//!   [`AnimationController::report_geometry`].
//!
//! Both sequences share one [`TimerQueue`] keyed by tile identity, so a
//! removal cancels everything a tile still has pending.
//!
//! An entry sequence whose timer fires before it was ever measured is
//! cancelled rather than finished: `done` is only reachable from `measured`.

mod entry;

pub use entry::{EntryPhase, EntryState, center_shift};

use alloc::collections::{BTreeMap, BTreeSet};

use kurbo::{Rect, Size};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::AnimationConfig;
use crate::submission::SubmissionId;
use crate::time::{Duration, HostTime};
use crate::timer::{TimerKind, TimerQueue};
use crate::trace::{AnimationEvent, AnimationKind, Tracer};

/// What a render surface needs to draw one tile's animation state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileVisual {
    /// Whether the highlight pulse is active.
    pub highlighted: bool,
    /// The live entry sequence, if any.
    pub entry: Option<EntryState>,
}

impl TileVisual {
    /// Whether the tile should be drawn. A tile waiting for measurement is
    /// hidden so it never flashes at its cell before the entry starts.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.entry.is_some_and(|entry| entry.is_spawning())
    }

    /// Opacity to draw the tile with.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        if self.is_visible() { 1.0 } else { 0.0 }
    }
}

/// Owns every tile's highlight and entry state.
#[derive(Debug)]
pub struct AnimationController {
    config: AnimationConfig,
    highlighted: BTreeSet<SubmissionId>,
    entries: BTreeMap<SubmissionId, EntryState>,
    timers: TimerQueue<SubmissionId>,
    rng: SmallRng,
}

impl AnimationController {
    /// Creates a controller. `seed` drives entry duration jitter and drift.
    #[must_use]
    pub fn new(config: AnimationConfig, seed: u64) -> Self {
        Self {
            config,
            highlighted: BTreeSet::new(),
            entries: BTreeMap::new(),
            timers: TimerQueue::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The timing configuration.
    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Starts the highlight pulse and entry sequence of each arrival.
    pub fn on_arrivals(&mut self, ids: &[SubmissionId], now: HostTime, tracer: &mut Tracer<'_>) {
        for id in ids {
            self.highlight(id, now, tracer);
            self.spawn_entry(id, now, tracer);
        }
    }

    /// Drops all state of removed tiles and cancels their timers.
    ///
    /// Only an entry sequence that was still live emits an event.
    pub fn on_removals(&mut self, ids: &[SubmissionId], now: HostTime, tracer: &mut Tracer<'_>) {
        for id in ids {
            self.timers.cancel_key(id);
            self.highlighted.remove(id);
            if self.entries.remove(id).is_some() {
                emit(tracer, id, AnimationKind::EntryCancelled, now);
            }
        }
    }

    /// Fires every timer due at or before `now`. Returns how many fired.
    pub fn advance(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> usize {
        let due = self.timers.pop_due(now);
        let fired = due.len();
        for (id, kind) in due {
            match kind {
                TimerKind::Highlight => {
                    if self.highlighted.remove(&id) {
                        emit(tracer, &id, AnimationKind::HighlightEnded, now);
                    }
                }
                TimerKind::Entry => {
                    let Some(state) = self.entries.remove(&id) else {
                        continue;
                    };
                    let kind = match state.phase {
                        EntryPhase::Measured => AnimationKind::EntryFinished,
                        EntryPhase::Spawning => AnimationKind::EntryCancelled,
                    };
                    emit(tracer, &id, kind, now);
                }
            }
        }
        fired
    }

    /// Whether some spawning tile still waits for a geometry pass.
    #[must_use]
    pub fn paint_requested(&self) -> bool {
        self.entries.values().any(EntryState::is_spawning)
    }

    /// Measures every spawning tile in one batch.
    ///
    /// `bounds` returns a tile's rendered rectangle, or `None` when it is not
    /// mounted yet; such tiles stay `spawning` and are retried on the next
    /// pass. Returns how many tiles moved to `measured`.
    pub fn measure_pending(
        &mut self,
        now: HostTime,
        viewport: Size,
        mut bounds: impl FnMut(&SubmissionId) -> Option<Rect>,
        tracer: &mut Tracer<'_>,
    ) -> usize {
        let mut measured = 0;
        for (id, state) in &mut self.entries {
            if !state.is_spawning() {
                continue;
            }
            let Some(tile) = bounds(id) else {
                continue;
            };
            if state.measure(now, tile, viewport) {
                measured += 1;
                emit(tracer, id, AnimationKind::EntryMeasured, now);
            }
        }
        measured
    }

    /// Measures a single tile. Reports for unknown tiles or tiles that are
    /// not spawning are ignored and return `false`.
    pub fn report_geometry(
        &mut self,
        now: HostTime,
        id: &SubmissionId,
        tile: Rect,
        viewport: Size,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let Some(state) = self.entries.get_mut(id) else {
            return false;
        };
        let measured = state.measure(now, tile, viewport);
        if measured {
            emit(tracer, id, AnimationKind::EntryMeasured, now);
        }
        measured
    }

    /// Whether the tile's highlight pulse is active.
    #[must_use]
    pub fn is_highlighted(&self, id: &SubmissionId) -> bool {
        self.highlighted.contains(id)
    }

    /// The tile's live entry sequence, if any.
    #[must_use]
    pub fn entry(&self, id: &SubmissionId) -> Option<&EntryState> {
        self.entries.get(id)
    }

    /// Everything a surface needs to draw the tile.
    #[must_use]
    pub fn visual(&self, id: &SubmissionId) -> TileVisual {
        TileVisual {
            highlighted: self.is_highlighted(id),
            entry: self.entries.get(id).copied(),
        }
    }

    /// Whether any entry sequence is live. Drives stage dimming.
    #[must_use]
    pub fn has_live_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of pending highlight and entry timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.timers.next_deadline()
    }

    /// Cancels every timer and forgets all state.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.highlighted.clear();
        self.entries.clear();
    }

    fn highlight(&mut self, id: &SubmissionId, now: HostTime, tracer: &mut Tracer<'_>) {
        self.highlighted.insert(id.clone());
        let expiry = now.saturating_add(self.config.highlight_pulse);
        self.timers.schedule(id.clone(), TimerKind::Highlight, expiry);
        emit(tracer, id, AnimationKind::HighlightStarted, now);
    }

    fn spawn_entry(&mut self, id: &SubmissionId, now: HostTime, tracer: &mut Tracer<'_>) {
        let jitter = self.config.entry_jitter.as_secs_f64() * self.rng.gen_range(0.0_f64..1.0);
        let duration = self
            .config
            .entry_base
            .saturating_add(Duration::from_secs_f64(jitter));
        let range = self.config.drift_range;
        let drift_y = if range.is_finite() && range > 0.0 {
            self.rng.gen_range(-range..range)
        } else {
            0.0
        };

        self.entries
            .insert(id.clone(), EntryState::spawn(now, duration, drift_y));
        let expiry = now.saturating_add(self.config.entry_lifetime(duration));
        self.timers.schedule(id.clone(), TimerKind::Entry, expiry);
        emit(tracer, id, AnimationKind::EntrySpawned, now);
    }
}

fn emit(tracer: &mut Tracer<'_>, id: &SubmissionId, kind: AnimationKind, at: HostTime) {
    tracer.animation(&AnimationEvent { id, kind, at });
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sid(name: &str) -> SubmissionId {
        SubmissionId::from(name)
    }

    fn controller() -> AnimationController {
        AnimationController::new(AnimationConfig::wall(), 42)
    }

    const VIEWPORT: Size = Size::new(1200.0, 800.0);

    fn tile() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn arrival_starts_both_sequences() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a")], HostTime(0), &mut tracer);

        let visual = anim.visual(&sid("a"));
        assert!(visual.highlighted);
        let entry = visual.entry.expect("entry spawned");
        assert_eq!(entry.phase, EntryPhase::Spawning);
        assert!(entry.duration >= Duration::from_secs(6));
        assert!(entry.duration < Duration::from_secs(7));
        assert!((-100.0..100.0).contains(&entry.drift_y));
        assert!(!visual.is_visible());
        assert!(anim.paint_requested());
        assert!(anim.has_live_entries());
        assert_eq!(anim.pending_timers(), 2);
    }

    #[test]
    fn highlight_clears_after_the_pulse() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a")], HostTime(0), &mut tracer);

        anim.advance(HostTime::from_millis(1799), &mut tracer);
        assert!(anim.is_highlighted(&sid("a")));
        anim.advance(HostTime::from_millis(1800), &mut tracer);
        assert!(!anim.is_highlighted(&sid("a")));
    }

    #[test]
    fn retrigger_restarts_the_pulse() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a")], HostTime(0), &mut tracer);
        anim.on_arrivals(&[sid("a")], HostTime::from_millis(1000), &mut tracer);

        anim.advance(HostTime::from_millis(1800), &mut tracer);
        assert!(anim.is_highlighted(&sid("a")));
        anim.advance(HostTime::from_millis(2800), &mut tracer);
        assert!(!anim.is_highlighted(&sid("a")));
    }

    #[test]
    fn measurement_is_the_only_way_out_of_spawning() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a"), sid("b")], HostTime(0), &mut tracer);

        anim.advance(HostTime::from_millis(100), &mut tracer);
        assert_eq!(
            anim.entry(&sid("a")).map(|e| e.phase),
            Some(EntryPhase::Spawning)
        );

        let measured = anim.measure_pending(
            HostTime::from_millis(16),
            VIEWPORT,
            |id| (id.as_str() == "a").then(tile),
            &mut tracer,
        );
        assert_eq!(measured, 1);
        let a = anim.entry(&sid("a")).expect("a is live");
        assert_eq!(a.phase, EntryPhase::Measured);
        assert_eq!(a.center_shift, kurbo::Vec2::new(550.0, 350.0));
        assert!(anim.paint_requested());

        let later = HostTime::from_millis(32);
        assert!(anim.report_geometry(later, &sid("b"), tile(), VIEWPORT, &mut tracer));
        assert!(!anim.report_geometry(later, &sid("b"), tile(), VIEWPORT, &mut tracer));
        assert!(!anim.report_geometry(later, &sid("zz"), tile(), VIEWPORT, &mut tracer));
        assert!(!anim.paint_requested());
    }

    #[test]
    fn measured_entry_finishes_and_unmeasured_is_cancelled() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a"), sid("b")], HostTime(0), &mut tracer);
        anim.report_geometry(HostTime(1), &sid("a"), tile(), VIEWPORT, &mut tracer);

        anim.advance(HostTime::from_millis(8000), &mut tracer);
        assert!(anim.entry(&sid("a")).is_none());
        assert!(anim.entry(&sid("b")).is_none());
        assert!(!anim.has_live_entries());
        assert_eq!(anim.pending_timers(), 0);
        let late = HostTime::from_millis(8001);
        assert!(!anim.report_geometry(late, &sid("b"), tile(), VIEWPORT, &mut tracer));
    }

    #[test]
    fn removal_cancels_pending_timers() {
        let mut anim = controller();
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a"), sid("b")], HostTime(0), &mut tracer);
        anim.on_removals(&[sid("a")], HostTime(10), &mut tracer);

        assert_eq!(anim.pending_timers(), 2);
        assert_eq!(anim.visual(&sid("a")), TileVisual::default());
        assert!(anim.visual(&sid("a")).is_visible());
    }

    #[test]
    fn same_seed_same_jitter() {
        let mut tracer = Tracer::none();
        let runs: Vec<Option<EntryState>> = (0..2)
            .map(|_| {
                let mut anim = controller();
                anim.on_arrivals(&[sid("a")], HostTime(0), &mut tracer);
                anim.entry(&sid("a")).copied()
            })
            .collect();
        assert_eq!(runs[0], runs[1]);
    }

    #[test]
    fn zero_drift_range_is_allowed() {
        let config = AnimationConfig {
            drift_range: 0.0,
            entry_jitter: Duration::ZERO,
            ..AnimationConfig::wall()
        };
        let mut anim = AnimationController::new(config, 0);
        let mut tracer = Tracer::none();
        anim.on_arrivals(&[sid("a")], HostTime(0), &mut tracer);
        let entry = anim.entry(&sid("a")).expect("entry spawned");
        assert!(entry.drift_y.abs() < f64::EPSILON);
        assert_eq!(entry.duration, Duration::from_secs(6));

        anim.clear();
        assert_eq!(anim.next_deadline(), None);
    }
}
