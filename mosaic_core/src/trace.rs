// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the refresh cycle.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! engine emits. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`TickSummaryBuilder`] collects phase timestamps during a poll tick and
//! produces a [`TickSummary`] at the end.

use crate::error::FetchError;
use crate::submission::SubmissionId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a poll tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Pulling records from the data source.
    Fetch,
    /// Diffing, sizing and placement.
    Reconcile,
    /// Scheduling highlight and entry sequences for arrivals.
    Animate,
    /// Geometry pass for spawning tiles.
    Measure,
}

/// A per-tile animation transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Highlight pulse started or restarted.
    HighlightStarted,
    /// Highlight pulse expired.
    HighlightEnded,
    /// Entry sequence entered `spawning`.
    EntrySpawned,
    /// Geometry arrived; entry sequence entered `measured`.
    EntryMeasured,
    /// Entry duration elapsed after measurement.
    EntryFinished,
    /// Entry sequence abandoned (tile removed or never measured).
    EntryCancelled,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of each poll tick.
#[derive(Clone, Copy, Debug)]
pub struct PollEvent {
    /// Monotonic poll counter.
    pub tick_index: u64,
    /// Time the tick started.
    pub now: HostTime,
}

/// Emitted when the data source fails; the previous snapshot is kept.
#[derive(Clone, Copy, Debug)]
pub struct FetchFailedEvent<'a> {
    /// Poll counter.
    pub tick_index: u64,
    /// Time of the failure.
    pub now: HostTime,
    /// What went wrong.
    pub error: &'a FetchError,
}

/// Emitted after a batch was reconciled.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileEvent {
    /// Poll counter.
    pub tick_index: u64,
    /// Number of tiles on the wall after this tick.
    pub tile_count: usize,
    /// Identities seen for the first time (or again after an absence).
    pub arrived: usize,
    /// Identities that disappeared.
    pub removed: usize,
    /// Grid columns.
    pub columns: u16,
    /// Grid rows.
    pub rows: u16,
    /// Density scale.
    pub density_scale: f32,
}

/// Emitted when the grid changes shape and placement reshuffles.
#[derive(Clone, Copy, Debug)]
pub struct GridResizeEvent {
    /// Poll counter.
    pub tick_index: u64,
    /// Previous `(columns, rows)`, if there was a previous grid.
    pub from: Option<(u16, u16)>,
    /// New `(columns, rows)`.
    pub to: (u16, u16),
    /// New density scale.
    pub density_scale: f32,
}

/// Emitted when more tiles exist than the grid can seat.
#[derive(Clone, Copy, Debug)]
pub struct OverflowEvent {
    /// Poll counter.
    pub tick_index: u64,
    /// Number of tiles.
    pub tile_count: usize,
    /// Grid capacity.
    pub capacity: usize,
    /// Tiles that landed on an occupied cell this tick.
    pub doubled_up: usize,
}

/// Emitted on every per-tile animation transition.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEvent<'a> {
    /// The tile.
    pub id: &'a SubmissionId,
    /// What happened.
    pub kind: AnimationKind,
    /// When it happened.
    pub at: HostTime,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Poll counter.
    pub tick_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Poll counter.
    pub tick_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Time at the end of the phase.
    pub timestamp: HostTime,
}

/// Per-tick summary produced by [`TickSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSummary {
    /// Poll counter.
    pub tick_index: u64,
    /// Time the tick started.
    pub now: HostTime,
    /// Whether the fetch succeeded.
    pub fetched: bool,
    /// Tiles on the wall after the tick.
    pub tile_count: usize,
    /// Arrivals in this tick.
    pub arrived: usize,
    /// Removals in this tick.
    pub removed: usize,
    /// Fetch phase duration in ticks (0 if not measured).
    pub fetch_ticks: u64,
    /// Reconcile phase duration in ticks (0 if not measured).
    pub reconcile_ticks: u64,
    /// Animate phase duration in ticks (0 if not measured).
    pub animate_ticks: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a poll tick starts.
    fn on_poll(&mut self, e: &PollEvent) {
        _ = e;
    }

    /// Called when the data source fails.
    fn on_fetch_failed(&mut self, e: &FetchFailedEvent<'_>) {
        _ = e;
    }

    /// Called after reconciliation.
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        _ = e;
    }

    /// Called when the grid changes shape.
    fn on_grid_resize(&mut self, e: &GridResizeEvent) {
        _ = e;
    }

    /// Called when tiles share cells.
    fn on_overflow(&mut self, e: &OverflowEvent) {
        _ = e;
    }

    /// Called on each per-tile animation transition.
    fn on_animation(&mut self, e: &AnimationEvent<'_>) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with a per-tick summary.
    fn on_tick_summary(&mut self, s: &TickSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$meta:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`PollEvent`].
        poll => on_poll(PollEvent)
    );
    dispatch!(
        /// Emits a [`FetchFailedEvent`].
        fetch_failed => on_fetch_failed(FetchFailedEvent<'_>)
    );
    dispatch!(
        /// Emits a [`ReconcileEvent`].
        reconcile => on_reconcile(ReconcileEvent)
    );
    dispatch!(
        /// Emits a [`GridResizeEvent`].
        grid_resize => on_grid_resize(GridResizeEvent)
    );
    dispatch!(
        /// Emits an [`OverflowEvent`].
        overflow => on_overflow(OverflowEvent)
    );
    dispatch!(
        /// Emits an [`AnimationEvent`].
        animation => on_animation(AnimationEvent<'_>)
    );
    dispatch!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin => on_phase_begin(PhaseBeginEvent)
    );
    dispatch!(
        /// Emits a [`PhaseEndEvent`].
        phase_end => on_phase_end(PhaseEndEvent)
    );
    dispatch!(
        /// Emits a [`TickSummary`].
        tick_summary => on_tick_summary(TickSummary)
    );
}

// ---------------------------------------------------------------------------
// TickSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a tick and produces a [`TickSummary`].
#[derive(Debug)]
pub struct TickSummaryBuilder {
    tick_index: u64,
    now: HostTime,
    fetched: bool,
    tile_count: usize,
    arrived: usize,
    removed: usize,
    phase_starts: [Option<HostTime>; 4],
    phase_ends: [Option<HostTime>; 4],
}

impl TickSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &PollEvent) -> Self {
        Self {
            tick_index: tick.tick_index,
            now: tick.now,
            fetched: false,
            tile_count: 0,
            arrived: 0,
            removed: 0,
            phase_starts: [None; 4],
            phase_ends: [None; 4],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Records how many tiles are on the wall, for ticks that did not
    /// reconcile.
    pub fn set_tile_count(&mut self, tile_count: usize) {
        self.tile_count = tile_count;
    }

    /// Records the outcome of reconciliation.
    pub fn set_reconciled(&mut self, e: &ReconcileEvent) {
        self.fetched = true;
        self.tile_count = e.tile_count;
        self.arrived = e.arrived;
        self.removed = e.removed;
    }

    /// Consumes the builder and produces the final [`TickSummary`].
    #[must_use]
    pub fn finish(self) -> TickSummary {
        TickSummary {
            tick_index: self.tick_index,
            now: self.now,
            fetched: self.fetched,
            tile_count: self.tile_count,
            arrived: self.arrived,
            removed: self.removed,
            fetch_ticks: self.phase_duration(PhaseKind::Fetch),
            reconcile_ticks: self.phase_duration(PhaseKind::Reconcile),
            animate_ticks: self.phase_duration(PhaseKind::Animate),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Fetch => 0,
        PhaseKind::Reconcile => 1,
        PhaseKind::Animate => 2,
        PhaseKind::Measure => 3,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_poll() -> PollEvent {
        PollEvent {
            tick_index: 3,
            now: HostTime(5_000),
        }
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = TickSummaryBuilder::new(&sample_poll());
        builder.phase_begin(PhaseKind::Fetch, HostTime(5_000));
        builder.phase_end(PhaseKind::Fetch, HostTime(5_400));
        builder.phase_begin(PhaseKind::Reconcile, HostTime(5_400));
        builder.phase_end(PhaseKind::Reconcile, HostTime(5_450));
        builder.set_reconciled(&ReconcileEvent {
            tick_index: 3,
            tile_count: 2,
            arrived: 1,
            removed: 0,
            columns: 6,
            rows: 4,
            density_scale: 1.0,
        });

        let summary = builder.finish();
        assert_eq!(summary.fetch_ticks, 400);
        assert_eq!(summary.reconcile_ticks, 50);
        assert_eq!(summary.animate_ticks, 0);
        assert!(summary.fetched);
        assert_eq!(summary.tile_count, 2);
    }

    #[test]
    fn unreconciled_tick_reports_failure() {
        let summary = TickSummaryBuilder::new(&sample_poll()).finish();
        assert!(!summary.fetched);
        assert_eq!(summary.tick_index, 3);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.poll(&sample_poll());
        let id = SubmissionId::from("a");
        tracer.animation(&AnimationEvent {
            id: &id,
            kind: AnimationKind::EntrySpawned,
            at: HostTime(0),
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            kinds: Vec<AnimationKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_animation(&mut self, e: &AnimationEvent<'_>) {
                self.kinds.push(e.kind);
            }
        }

        let mut sink = RecordingSink { kinds: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        let id = SubmissionId::from("a");
        tracer.animation(&AnimationEvent {
            id: &id,
            kind: AnimationKind::HighlightStarted,
            at: HostTime(1),
        });
        drop(tracer);
        assert_eq!(sink.kinds, &[AnimationKind::HighlightStarted]);
    }
}
