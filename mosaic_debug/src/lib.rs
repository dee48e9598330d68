// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for mosaic wall
//! diagnostics.
//!
//! This crate provides [`TraceSink`](mosaic_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`Tee`]: forwards every event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;

use mosaic_core::trace::{
    AnimationEvent, FetchFailedEvent, GridResizeEvent, OverflowEvent, PhaseBeginEvent,
    PhaseEndEvent, PollEvent, ReconcileEvent, TickSummary, TraceSink,
};

/// A [`TraceSink`] that forwards every event to two sinks, e.g. a
/// [`PrettyPrintSink`](pretty::PrettyPrintSink) for the console and a
/// [`RecorderSink`](recorder::RecorderSink) for a trace file.
#[derive(Debug)]
pub struct Tee<A, B> {
    /// First sink.
    pub first: A,
    /// Second sink.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_poll(&mut self, e: &PollEvent) {
        self.first.on_poll(e);
        self.second.on_poll(e);
    }

    fn on_fetch_failed(&mut self, e: &FetchFailedEvent<'_>) {
        self.first.on_fetch_failed(e);
        self.second.on_fetch_failed(e);
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.first.on_reconcile(e);
        self.second.on_reconcile(e);
    }

    fn on_grid_resize(&mut self, e: &GridResizeEvent) {
        self.first.on_grid_resize(e);
        self.second.on_grid_resize(e);
    }

    fn on_overflow(&mut self, e: &OverflowEvent) {
        self.first.on_overflow(e);
        self.second.on_overflow(e);
    }

    fn on_animation(&mut self, e: &AnimationEvent<'_>) {
        self.first.on_animation(e);
        self.second.on_animation(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.first.on_tick_summary(s);
        self.second.on_tick_summary(s);
    }
}
