// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The wall engine: poll ticks, timers, measurement and snapshots.
//!
//! [`WallEngine`] owns the [`Reconciler`] (and through it the seen set and
//! the placement store) and the [`AnimationController`]. Nothing outside the
//! engine mutates that state; a [`RenderSurface`] reads a [`WallSnapshot`]
//! and reports geometry back through [`WallEngine::on_next_paint`] or
//! [`WallEngine::report_geometry`].
//!
//! The engine is single-threaded and cooperative. A host drives it with
//! [`WallEngine::step`] and sleeps until [`WallEngine::next_deadline`]. Each
//! poll tick runs fetch, reconcile and animation scheduling to completion
//! before the next poll is scheduled `poll_interval` after the tick ended.
//!
//! After [`WallEngine::shutdown`] every entry point is a no-op, so a late
//! callback can never touch discarded state.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::animation::{AnimationController, EntryState, TileVisual};
use crate::config::WallConfig;
use crate::error::FetchError;
use crate::grid::{GridConfig, Orientation};
use crate::placement::{LayoutCell, PlacementChanges, TileHandle};
use crate::reconcile::{PlacedTile, Reconciler, Reconciliation};
use crate::source::DataSource;
use crate::submission::{Category, CategoryStyle, Submission, SubmissionId};
use crate::surface::RenderSurface;
use crate::time::{Clock, HostTime};
use crate::trace::{
    FetchFailedEvent, GridResizeEvent, OverflowEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    PollEvent, ReconcileEvent, TickSummaryBuilder, Tracer,
};

/// Overlay text before the first successful fetch.
pub const BOOTING_MESSAGE: &str = "Booting up the mosaic...";

/// Overlay text when the feed is reachable but empty.
pub const EMPTY_MESSAGE: &str = "No tiles yet — submissions will appear live here.";

/// Overlay text for a failure whose error has no text of its own.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load wall data.";

/// Viewport assumed until the host reports a real one.
pub const FALLBACK_VIEWPORT: Size = Size::new(1920.0, 1080.0);

/// Feed health as shown on the wall.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WallStatus {
    /// No fetch has completed yet.
    #[default]
    Booting,
    /// The last fetch succeeded.
    Live,
    /// The last fetch failed; the tiles from the last success are retained.
    Failed(String),
}

/// One tile as the render surface sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct TileView {
    /// Identity.
    pub id: SubmissionId,
    /// Display text, already truncated.
    pub text: String,
    /// Category for label and accent color.
    pub category: Category,
    /// Cell and paint order.
    pub layout: LayoutCell,
    /// Stable slot handle; see [`WallEngine::layout_of`].
    pub handle: TileHandle,
    /// Highlight and entry state.
    pub visual: TileVisual,
}

impl TileView {
    /// Category label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.category.label()
    }

    /// Category accent and gradient.
    #[must_use]
    pub fn style(&self) -> CategoryStyle {
        self.category.style()
    }

    /// Whether the highlight pulse is active.
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.visual.highlighted
    }

    /// The live entry sequence, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&EntryState> {
        self.visual.entry.as_ref()
    }

    /// Whether the spawn animation has started rendering (geometry measured).
    #[must_use]
    pub fn entry_started(&self) -> bool {
        self.visual.entry.is_some_and(|entry| !entry.is_spawning())
    }

    /// Whether the tile should be drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visual.is_visible()
    }
}

/// Everything a render surface needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WallSnapshot {
    /// Grid columns.
    pub columns: u16,
    /// Grid rows.
    pub rows: u16,
    /// Scale applied to tile size and typography.
    pub density_scale: f32,
    /// Tiles in paint order.
    pub tiles: Vec<TileView>,
    /// Feed health.
    pub status: WallStatus,
    /// Whether the stage is dimmed because some tile is entering.
    pub dimmed: bool,
}

impl WallSnapshot {
    /// Text for the status overlay. Only shown while the wall has no tiles.
    #[must_use]
    pub fn overlay_message(&self) -> Option<&str> {
        if !self.tiles.is_empty() {
            return None;
        }
        Some(match &self.status {
            WallStatus::Booting => BOOTING_MESSAGE,
            WallStatus::Failed(message) => message.as_str(),
            WallStatus::Live => EMPTY_MESSAGE,
        })
    }

    /// Looks up a tile by identity.
    #[must_use]
    pub fn tile(&self, id: &SubmissionId) -> Option<&TileView> {
        self.tiles.iter().find(|tile| &tile.id == id)
    }
}

/// A live submission wall.
#[derive(Debug)]
pub struct WallEngine {
    config: WallConfig,
    reconciler: Reconciler,
    animation: AnimationController,
    tiles: Vec<PlacedTile>,
    status: WallStatus,
    viewport: Size,
    next_poll: Option<HostTime>,
    tick_index: u64,
    shut_down: bool,
}

impl WallEngine {
    /// Creates an engine. The first poll is due immediately.
    #[must_use]
    pub fn new(config: WallConfig) -> Self {
        Self {
            config,
            reconciler: Reconciler::new(config.sizer, config.seed),
            animation: AnimationController::new(config.animation, config.seed.rotate_left(32)),
            tiles: Vec::new(),
            status: WallStatus::Booting,
            viewport: FALLBACK_VIEWPORT,
            next_poll: Some(HostTime::ZERO),
            tick_index: 0,
            shut_down: false,
        }
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    /// Current feed health.
    #[must_use]
    pub fn status(&self) -> &WallStatus {
        &self.status
    }

    /// Number of tiles on the wall.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of completed poll ticks.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Read access to the highlight and entry state.
    #[must_use]
    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    /// Runs one poll tick: fetch, reconcile, then schedule animations for
    /// arrivals and cancel them for removals.
    ///
    /// A failed fetch keeps the current tiles and only updates the status.
    /// An aborted fetch is ignored. Returns whether a batch was reconciled.
    pub fn poll(
        &mut self,
        clock: impl Clock,
        source: &mut dyn DataSource,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if self.shut_down {
            return false;
        }
        let now = clock.now();
        self.tick_index += 1;
        let tick = PollEvent {
            tick_index: self.tick_index,
            now,
        };
        tracer.poll(&tick);
        let mut summary = TickSummaryBuilder::new(&tick);

        self.begin(PhaseKind::Fetch, now, &mut summary, tracer);
        let fetched = source.fetch();
        self.end(PhaseKind::Fetch, clock.now(), &mut summary, tracer);

        let reconciled = match fetched {
            Ok(batch) => {
                self.apply_batch(&clock, batch, &mut summary, tracer);
                true
            }
            Err(FetchError::Aborted) => false,
            Err(error) => {
                tracer.fetch_failed(&FetchFailedEvent {
                    tick_index: self.tick_index,
                    now: clock.now(),
                    error: &error,
                });
                let message = error.to_string();
                self.status = WallStatus::Failed(if message.is_empty() {
                    FETCH_FAILED_MESSAGE.into()
                } else {
                    message
                });
                false
            }
        };

        let finished = clock.now();
        self.next_poll = Some(finished.saturating_add(self.config.poll_interval));
        summary.set_tile_count(self.tiles.len());
        tracer.tick_summary(&summary.finish());
        reconciled
    }

    /// Fires highlight and entry timers due at or before `now`.
    pub fn advance(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> usize {
        if self.shut_down {
            return 0;
        }
        self.animation.advance(now, tracer)
    }

    /// Cooperative loop body: polls if a poll is due, then fires due timers.
    pub fn step(
        &mut self,
        clock: impl Clock,
        source: &mut dyn DataSource,
        tracer: &mut Tracer<'_>,
    ) {
        if self.poll_due(clock.now()) {
            self.poll(&clock, source, tracer);
        }
        self.advance(clock.now(), tracer);
    }

    /// Whether the next poll is due at `now`.
    #[must_use]
    pub fn poll_due(&self, now: HostTime) -> bool {
        self.next_poll.is_some_and(|due| due <= now)
    }

    /// Earliest time something needs the engine: the next poll or the next
    /// animation timer. `None` once shut down.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        match (self.next_poll, self.animation.next_deadline()) {
            (Some(poll), Some(timer)) => Some(poll.min(timer)),
            (poll, timer) => poll.or(timer),
        }
    }

    /// Number of outstanding timers, the poll timer included.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.animation.pending_timers() + usize::from(self.next_poll.is_some())
    }

    /// Whether a spawning tile waits for the next paint's geometry pass.
    #[must_use]
    pub fn paint_requested(&self) -> bool {
        !self.shut_down && self.animation.paint_requested()
    }

    /// Geometry pass after a paint: measures every spawning tile the surface
    /// has mounted. Returns how many tiles moved to `measured`.
    pub fn on_next_paint(
        &mut self,
        now: HostTime,
        surface: &mut dyn RenderSurface,
        tracer: &mut Tracer<'_>,
    ) -> usize {
        if self.shut_down {
            return 0;
        }
        let tick_index = self.tick_index;
        tracer.phase_begin(&PhaseBeginEvent {
            tick_index,
            phase: PhaseKind::Measure,
            timestamp: now,
        });
        let viewport = usable(surface.viewport()).unwrap_or(self.viewport);
        let measured =
            self.animation
                .measure_pending(now, viewport, |id| surface.tile_bounds(id), tracer);
        tracer.phase_end(&PhaseEndEvent {
            tick_index,
            phase: PhaseKind::Measure,
            timestamp: now,
        });
        measured
    }

    /// Single-tile geometry callback, measured against the cached viewport
    /// ([`FALLBACK_VIEWPORT`] until the first [`resize`](Self::resize)).
    /// Reports for unknown or already measured tiles are ignored.
    pub fn report_geometry(
        &mut self,
        now: HostTime,
        id: &SubmissionId,
        bounds: Rect,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if self.shut_down {
            return false;
        }
        self.animation
            .report_geometry(now, id, bounds, self.viewport, tracer)
    }

    /// Caches the viewport size. Layout is not touched until the next poll,
    /// which picks the grid orientation from the cached size.
    ///
    /// Empty or non-finite sizes are ignored.
    pub fn resize(&mut self, viewport: Size) {
        if self.shut_down {
            return;
        }
        let Some(viewport) = usable(viewport) else {
            return;
        };
        self.viewport = viewport;
        self.reconciler
            .set_orientation(Orientation::from_viewport(viewport));
    }

    /// Cached viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Builds the render contract for the current state.
    #[must_use]
    pub fn snapshot(&self) -> WallSnapshot {
        let grid = self.current_grid();
        let tiles = self
            .tiles
            .iter()
            .map(|placed| TileView {
                id: placed.submission.id.clone(),
                text: placed.submission.message.clone(),
                category: placed.submission.category.clone(),
                layout: placed.layout,
                handle: placed.handle,
                visual: self.animation.visual(&placed.submission.id),
            })
            .collect();
        WallSnapshot {
            columns: grid.columns,
            rows: grid.rows,
            density_scale: grid.density_scale,
            tiles,
            status: self.status.clone(),
            dimmed: self.animation.has_live_entries(),
        }
    }

    /// Current layout behind a handle from an earlier snapshot, or `None`
    /// once that tile has left the wall (even if its slot was reused).
    #[must_use]
    pub fn layout_of(&self, handle: TileHandle) -> Option<LayoutCell> {
        self.reconciler.placement().layout_of(handle)
    }

    /// Drains placement changes since the previous call.
    pub fn take_changes(&mut self) -> PlacementChanges {
        self.reconciler.take_changes()
    }

    /// Hands the current snapshot and placement changes to a surface.
    pub fn present(&mut self, surface: &mut dyn RenderSurface) {
        if self.shut_down {
            return;
        }
        let changes = self.take_changes();
        surface.present(&self.snapshot(), &changes);
    }

    /// Tears the engine down: aborts the source, clears the poll timer and
    /// every per-tile timer. Calling it again does nothing.
    pub fn shutdown(&mut self, source: &mut dyn DataSource) {
        if self.shut_down {
            return;
        }
        source.abort();
        self.next_poll = None;
        self.animation.clear();
        self.shut_down = true;
    }

    fn current_grid(&self) -> GridConfig {
        self.reconciler.grid().unwrap_or_else(|| {
            self.config
                .sizer
                .size_oriented(0, self.reconciler.orientation())
        })
    }

    fn apply_batch(
        &mut self,
        clock: &impl Clock,
        batch: Vec<Submission>,
        summary: &mut TickSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        self.begin(PhaseKind::Reconcile, clock.now(), summary, tracer);
        let result = self.reconciler.reconcile(batch);
        self.end(PhaseKind::Reconcile, clock.now(), summary, tracer);
        self.trace_reconciliation(&result, summary, tracer);

        let now = clock.now();
        self.begin(PhaseKind::Animate, now, summary, tracer);
        self.animation.on_removals(&result.removed, now, tracer);
        self.animation.on_arrivals(&result.newly_arrived, now, tracer);
        self.end(PhaseKind::Animate, clock.now(), summary, tracer);

        self.tiles = result.tiles;
        self.status = WallStatus::Live;
    }

    fn trace_reconciliation(
        &self,
        result: &Reconciliation,
        summary: &mut TickSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        let grid = result.grid;
        if result.grid_changed() {
            tracer.grid_resize(&GridResizeEvent {
                tick_index: self.tick_index,
                from: result.previous_grid.map(|g| (g.columns, g.rows)),
                to: (grid.columns, grid.rows),
                density_scale: grid.density_scale,
            });
        }
        if result.overflow > 0 {
            tracer.overflow(&OverflowEvent {
                tick_index: self.tick_index,
                tile_count: result.tiles.len(),
                capacity: grid.capacity(),
                doubled_up: result.overflow,
            });
        }
        let event = ReconcileEvent {
            tick_index: self.tick_index,
            tile_count: result.tiles.len(),
            arrived: result.newly_arrived.len(),
            removed: result.removed.len(),
            columns: grid.columns,
            rows: grid.rows,
            density_scale: grid.density_scale,
        };
        tracer.reconcile(&event);
        summary.set_reconciled(&event);
    }

    fn begin(
        &self,
        phase: PhaseKind,
        timestamp: HostTime,
        summary: &mut TickSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        summary.phase_begin(phase, timestamp);
        tracer.phase_begin(&PhaseBeginEvent {
            tick_index: self.tick_index,
            phase,
            timestamp,
        });
    }

    fn end(
        &self,
        phase: PhaseKind,
        timestamp: HostTime,
        summary: &mut TickSummaryBuilder,
        tracer: &mut Tracer<'_>,
    ) {
        summary.phase_end(phase, timestamp);
        tracer.phase_end(&PhaseEndEvent {
            tick_index: self.tick_index,
            phase,
            timestamp,
        });
    }
}

fn usable(viewport: Size) -> Option<Size> {
    (viewport.is_finite() && viewport.width > 0.0 && viewport.height > 0.0).then_some(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use alloc::vec;

    fn record(id: &str, created_at: i64) -> Submission {
        Submission::new(id, "be kind", Category::Promote, created_at)
    }

    struct FixedSurface {
        viewport: Size,
        mounted: bool,
        presented: usize,
    }

    impl RenderSurface for FixedSurface {
        fn viewport(&self) -> Size {
            self.viewport
        }

        fn tile_bounds(&self, _id: &SubmissionId) -> Option<Rect> {
            self.mounted.then(|| Rect::new(10.0, 10.0, 110.0, 110.0))
        }

        fn present(&mut self, _snapshot: &WallSnapshot, _changes: &PlacementChanges) {
            self.presented += 1;
        }
    }

    fn surface(mounted: bool) -> FixedSurface {
        FixedSurface {
            viewport: Size::new(1920.0, 1080.0),
            mounted,
            presented: 0,
        }
    }

    #[test]
    fn boots_then_goes_live() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.overlay_message(), Some(BOOTING_MESSAGE));
        assert_eq!((snapshot.columns, snapshot.rows), (6, 4));

        let mut source = ScriptedSource::new([Ok(Vec::new())]);
        assert!(engine.poll(HostTime::ZERO, &mut source, &mut Tracer::none()));
        assert_eq!(engine.snapshot().overlay_message(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn failure_keeps_tiles_and_hides_overlay() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([
            Ok(vec![record("a", 1)]),
            Err(FetchError::Network("offline".into())),
        ]);
        let mut tracer = Tracer::none();
        engine.poll(HostTime::ZERO, &mut source, &mut tracer);
        assert!(!engine.poll(HostTime::from_millis(5000), &mut source, &mut tracer));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, WallStatus::Failed("offline".into()));
        assert_eq!(snapshot.tiles.len(), 1);
        assert_eq!(snapshot.overlay_message(), None);
    }

    #[test]
    fn failure_on_empty_wall_shows_the_error() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Err(FetchError::Network(String::new()))]);
        engine.poll(HostTime::ZERO, &mut source, &mut Tracer::none());
        assert_eq!(
            engine.snapshot().overlay_message(),
            Some(FETCH_FAILED_MESSAGE)
        );
    }

    #[test]
    fn aborted_fetch_changes_nothing() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Err(FetchError::Aborted)]);
        engine.poll(HostTime::ZERO, &mut source, &mut Tracer::none());
        assert_eq!(engine.status(), &WallStatus::Booting);
    }

    #[test]
    fn next_poll_waits_for_the_interval() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::default();
        let mut tracer = Tracer::none();
        assert!(engine.poll_due(HostTime::ZERO));
        engine.step(HostTime::ZERO, &mut source, &mut tracer);
        assert!(!engine.poll_due(HostTime::from_millis(4999)));
        assert!(engine.poll_due(HostTime::from_millis(5000)));
        assert_eq!(source.fetches(), 1);
    }

    #[test]
    fn arrivals_are_hidden_until_painted() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Ok(vec![record("a", 1)])]);
        let mut tracer = Tracer::none();
        engine.poll(HostTime::ZERO, &mut source, &mut tracer);

        let tile = engine.snapshot().tiles[0].clone();
        assert!(tile.is_highlighted());
        assert!(!tile.is_visible());
        assert!(!tile.entry_started());
        assert!(engine.snapshot().dimmed);
        assert!(engine.paint_requested());

        let mut unmounted = surface(false);
        assert_eq!(engine.on_next_paint(HostTime(1), &mut unmounted, &mut tracer), 0);
        assert!(engine.paint_requested());

        let mut mounted = surface(true);
        assert_eq!(engine.on_next_paint(HostTime(2), &mut mounted, &mut tracer), 1);
        let tile = engine.snapshot().tiles[0].clone();
        assert!(tile.is_visible());
        assert!(tile.entry_started());
        assert!(!engine.paint_requested());

        engine.present(&mut mounted);
        assert_eq!(mounted.presented, 1);
    }

    #[test]
    fn shutdown_is_final() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Ok(vec![record("a", 1), record("b", 2)])]);
        let mut tracer = Tracer::none();
        engine.poll(HostTime::ZERO, &mut source, &mut tracer);
        assert_eq!(engine.pending_timers(), 5);

        engine.shutdown(&mut source);
        assert!(source.is_aborted());
        assert_eq!(engine.pending_timers(), 0);
        assert_eq!(engine.next_deadline(), None);
        assert!(!engine.poll(HostTime::from_millis(5000), &mut source, &mut tracer));
        assert_eq!(engine.advance(HostTime::from_millis(60_000), &mut tracer), 0);
        assert!(!engine.paint_requested());
        engine.shutdown(&mut source);
        assert!(engine.is_shut_down());
    }

    #[test]
    fn single_report_before_resize_matches_the_paint_pass() {
        let bounds = Rect::new(10.0, 10.0, 110.0, 110.0);
        let mut tracer = Tracer::none();

        let mut reported = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Ok(vec![record("a", 1)])]);
        reported.poll(HostTime::ZERO, &mut source, &mut tracer);
        assert_eq!(reported.viewport(), FALLBACK_VIEWPORT);
        let a = SubmissionId::from("a");
        assert!(reported.report_geometry(HostTime(1), &a, bounds, &mut tracer));

        let mut painted = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([Ok(vec![record("a", 1)])]);
        painted.poll(HostTime::ZERO, &mut source, &mut tracer);
        assert_eq!(painted.on_next_paint(HostTime(1), &mut surface(true), &mut tracer), 1);

        let shift_of = |engine: &WallEngine| {
            engine
                .animation()
                .entry(&SubmissionId::from("a"))
                .map(|entry| entry.center_shift)
        };
        assert_eq!(shift_of(&reported), Some(kurbo::Vec2::new(900.0, 480.0)));
        assert_eq!(shift_of(&reported), shift_of(&painted));
    }

    #[test]
    fn degenerate_viewports_are_ignored() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        engine.resize(Size::ZERO);
        engine.resize(Size::new(f64::NAN, 900.0));
        assert_eq!(engine.viewport(), FALLBACK_VIEWPORT);

        let portrait = Size::new(1080.0, 1920.0);
        engine.resize(portrait);
        assert_eq!(engine.viewport(), portrait);
        assert_eq!((engine.snapshot().columns, engine.snapshot().rows), (4, 6));
    }

    #[test]
    fn handles_stop_resolving_when_tiles_leave() {
        let mut engine = WallEngine::new(WallConfig::kiosk());
        let mut source = ScriptedSource::new([
            Ok(vec![record("a", 1), record("b", 2)]),
            Ok(vec![record("b", 2), record("c", 3)]),
        ]);
        let mut tracer = Tracer::none();
        engine.poll(HostTime::ZERO, &mut source, &mut tracer);
        let first = engine.snapshot();
        let a = first.tile(&SubmissionId::from("a")).expect("a is placed");
        let b = first.tile(&SubmissionId::from("b")).expect("b is placed");
        assert_eq!(engine.layout_of(a.handle), Some(a.layout));

        engine.poll(HostTime::from_millis(5000), &mut source, &mut tracer);
        assert_eq!(engine.layout_of(a.handle), None);
        let b_now = engine.layout_of(b.handle).expect("b stays");
        assert_eq!(b_now.cell_key(), b.layout.cell_key());
        assert_eq!(b_now.order_value, 0);
    }
}
