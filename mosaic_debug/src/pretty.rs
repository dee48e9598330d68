// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in milliseconds since the engine's time origin.

use std::io::Write;

use mosaic_core::time::HostTime;
use mosaic_core::trace::{
    AnimationEvent, AnimationKind, FetchFailedEvent, GridResizeEvent, OverflowEvent,
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, PollEvent, ReconcileEvent, TickSummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    animations: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("animations", &self.animations)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            animations: true,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            animations: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            animations: true,
        }
    }

    /// Turns per-tile animation lines on or off. Busy walls produce a lot of
    /// them.
    #[must_use]
    pub fn animations(mut self, enabled: bool) -> Self {
        self.animations = enabled;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    ticks_to_ms(t.ticks())
}

fn ticks_to_ms(ticks: u64) -> f64 {
    ticks as f64 / 1_000_000.0
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Fetch => "fetch",
        PhaseKind::Reconcile => "reconcile",
        PhaseKind::Animate => "animate",
        PhaseKind::Measure => "measure",
    }
}

fn animation_name(kind: AnimationKind) -> &'static str {
    match kind {
        AnimationKind::HighlightStarted => "highlight:on",
        AnimationKind::HighlightEnded => "highlight:off",
        AnimationKind::EntrySpawned => "entry:spawn",
        AnimationKind::EntryMeasured => "entry:measured",
        AnimationKind::EntryFinished => "entry:done",
        AnimationKind::EntryCancelled => "entry:cancel",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_poll(&mut self, e: &PollEvent) {
        let _ = writeln!(
            self.writer,
            "[poll] tick={} now={:.1}ms",
            e.tick_index,
            ms(e.now),
        );
    }

    fn on_fetch_failed(&mut self, e: &FetchFailedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[fetch:error] tick={} at {:.1}ms: {}",
            e.tick_index,
            ms(e.now),
            e.error,
        );
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        let _ = writeln!(
            self.writer,
            "[reconcile] tick={} tiles={} +{} -{} grid={}x{} scale={:.3}",
            e.tick_index, e.tile_count, e.arrived, e.removed, e.columns, e.rows, e.density_scale,
        );
    }

    fn on_grid_resize(&mut self, e: &GridResizeEvent) {
        let from = match e.from {
            Some((columns, rows)) => format!("{columns}x{rows}"),
            None => "-".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[grid] tick={} {from} -> {}x{} scale={:.3} (reshuffle)",
            e.tick_index, e.to.0, e.to.1, e.density_scale,
        );
    }

    fn on_overflow(&mut self, e: &OverflowEvent) {
        let _ = writeln!(
            self.writer,
            "[overflow] tick={} tiles={} capacity={} shared={}",
            e.tick_index, e.tile_count, e.capacity, e.doubled_up,
        );
    }

    fn on_animation(&mut self, e: &AnimationEvent<'_>) {
        if !self.animations {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[{}] {} at {:.1}ms",
            animation_name(e.kind),
            e.id,
            ms(e.at),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] tick={} {} at {:.1}ms",
            e.tick_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] tick={} {} at {:.1}ms",
            e.tick_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        let outcome = if s.fetched { "ok" } else { "FAILED" };
        let _ = writeln!(
            self.writer,
            "[summary] tick={} fetch={outcome} tiles={} +{} -{} \
             fetch={:.2}ms reconcile={:.2}ms animate={:.2}ms",
            s.tick_index,
            s.tile_count,
            s.arrived,
            s.removed,
            ticks_to_ms(s.fetch_ticks),
            ticks_to_ms(s.reconcile_ticks),
            ticks_to_ms(s.animate_ticks),
        );
    }
}
