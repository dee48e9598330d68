// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Events that borrow from the engine (tile identities, fetch errors) are
//! stored as length-prefixed UTF-8 and decode into owned strings.

use mosaic_core::time::HostTime;
use mosaic_core::trace::{
    AnimationEvent, AnimationKind, FetchFailedEvent, GridResizeEvent, OverflowEvent,
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, PollEvent, ReconcileEvent, TickSummary, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_POLL: u8 = 1;
const TAG_FETCH_FAILED: u8 = 2;
const TAG_RECONCILE: u8 = 3;
const TAG_GRID_RESIZE: u8 = 4;
const TAG_OVERFLOW: u8 = 5;
const TAG_ANIMATION: u8 = 6;
const TAG_PHASE_BEGIN: u8 = 7;
const TAG_PHASE_END: u8 = 8;
const TAG_TICK_SUMMARY: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Fetch => 0,
            PhaseKind::Reconcile => 1,
            PhaseKind::Animate => 2,
            PhaseKind::Measure => 3,
        });
    }

    fn write_animation_kind(&mut self, k: AnimationKind) {
        self.write_u8(match k {
            AnimationKind::HighlightStarted => 0,
            AnimationKind::HighlightEnded => 1,
            AnimationKind::EntrySpawned => 2,
            AnimationKind::EntryMeasured => 3,
            AnimationKind::EntryFinished => 4,
            AnimationKind::EntryCancelled => 5,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_poll(&mut self, e: &PollEvent) {
        self.write_u8(TAG_POLL);
        self.write_u64(e.tick_index);
        self.write_u64(e.now.ticks());
    }

    fn on_fetch_failed(&mut self, e: &FetchFailedEvent<'_>) {
        self.write_u8(TAG_FETCH_FAILED);
        self.write_u64(e.tick_index);
        self.write_u64(e.now.ticks());
        self.write_str(&e.error.to_string());
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.write_u8(TAG_RECONCILE);
        self.write_u64(e.tick_index);
        self.write_count(e.tile_count);
        self.write_count(e.arrived);
        self.write_count(e.removed);
        self.write_u16(e.columns);
        self.write_u16(e.rows);
        self.write_f32(e.density_scale);
    }

    fn on_grid_resize(&mut self, e: &GridResizeEvent) {
        self.write_u8(TAG_GRID_RESIZE);
        self.write_u64(e.tick_index);
        let (present, (columns, rows)) = match e.from {
            Some(from) => (true, from),
            None => (false, (0, 0)),
        };
        self.write_bool(present);
        self.write_u16(columns);
        self.write_u16(rows);
        self.write_u16(e.to.0);
        self.write_u16(e.to.1);
        self.write_f32(e.density_scale);
    }

    fn on_overflow(&mut self, e: &OverflowEvent) {
        self.write_u8(TAG_OVERFLOW);
        self.write_u64(e.tick_index);
        self.write_count(e.tile_count);
        self.write_count(e.capacity);
        self.write_count(e.doubled_up);
    }

    fn on_animation(&mut self, e: &AnimationEvent<'_>) {
        self.write_u8(TAG_ANIMATION);
        self.write_str(e.id.as_str());
        self.write_animation_kind(e.kind);
        self.write_u64(e.at.ticks());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.tick_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.tick_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.write_u8(TAG_TICK_SUMMARY);
        self.write_u64(s.tick_index);
        self.write_u64(s.now.ticks());
        self.write_bool(s.fetched);
        self.write_count(s.tile_count);
        self.write_count(s.arrived);
        self.write_count(s.removed);
        self.write_u64(s.fetch_ticks);
        self.write_u64(s.reconcile_ticks);
        self.write_u64(s.animate_ticks);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PollEvent`].
    Poll(PollEvent),
    /// A [`FetchFailedEvent`], with the error rendered to text.
    FetchFailed {
        /// Poll counter.
        tick_index: u64,
        /// Time of the failure.
        now: HostTime,
        /// The error's display text.
        message: String,
    },
    /// A [`ReconcileEvent`].
    Reconcile(ReconcileEvent),
    /// A [`GridResizeEvent`].
    GridResize(GridResizeEvent),
    /// An [`OverflowEvent`].
    Overflow(OverflowEvent),
    /// An [`AnimationEvent`] with an owned identity.
    Animation {
        /// Tile identity.
        id: String,
        /// Transition.
        kind: AnimationKind,
        /// When it happened.
        at: HostTime,
    },
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`TickSummary`].
    TickSummary(TickSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Option<&[u8]> {
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        Some(u16::from_le_bytes(self.read_bytes(2)?.try_into().ok()?))
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }

    fn read_count(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Fetch,
            1 => PhaseKind::Reconcile,
            2 => PhaseKind::Animate,
            _ => PhaseKind::Measure,
        })
    }

    fn read_animation_kind(&mut self) -> Option<AnimationKind> {
        Some(match self.read_u8()? {
            0 => AnimationKind::HighlightStarted,
            1 => AnimationKind::HighlightEnded,
            2 => AnimationKind::EntrySpawned,
            3 => AnimationKind::EntryMeasured,
            4 => AnimationKind::EntryFinished,
            _ => AnimationKind::EntryCancelled,
        })
    }

    fn decode_poll(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Poll(PollEvent {
            tick_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
        }))
    }

    fn decode_fetch_failed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FetchFailed {
            tick_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            message: self.read_string()?,
        })
    }

    fn decode_reconcile(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reconcile(ReconcileEvent {
            tick_index: self.read_u64()?,
            tile_count: self.read_count()?,
            arrived: self.read_count()?,
            removed: self.read_count()?,
            columns: self.read_u16()?,
            rows: self.read_u16()?,
            density_scale: self.read_f32()?,
        }))
    }

    fn decode_grid_resize(&mut self) -> Option<RecordedEvent> {
        let tick_index = self.read_u64()?;
        let present = self.read_bool()?;
        let from = (self.read_u16()?, self.read_u16()?);
        let to = (self.read_u16()?, self.read_u16()?);
        Some(RecordedEvent::GridResize(GridResizeEvent {
            tick_index,
            from: present.then_some(from),
            to,
            density_scale: self.read_f32()?,
        }))
    }

    fn decode_overflow(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Overflow(OverflowEvent {
            tick_index: self.read_u64()?,
            tile_count: self.read_count()?,
            capacity: self.read_count()?,
            doubled_up: self.read_count()?,
        }))
    }

    fn decode_animation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Animation {
            id: self.read_string()?,
            kind: self.read_animation_kind()?,
            at: HostTime(self.read_u64()?),
        })
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            tick_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            tick_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_tick_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickSummary(TickSummary {
            tick_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            fetched: self.read_bool()?,
            tile_count: self.read_count()?,
            arrived: self.read_count()?,
            removed: self.read_count()?,
            fetch_ticks: self.read_u64()?,
            reconcile_ticks: self.read_u64()?,
            animate_ticks: self.read_u64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_POLL => self.decode_poll(),
            TAG_FETCH_FAILED => self.decode_fetch_failed(),
            TAG_RECONCILE => self.decode_reconcile(),
            TAG_GRID_RESIZE => self.decode_grid_resize(),
            TAG_OVERFLOW => self.decode_overflow(),
            TAG_ANIMATION => self.decode_animation(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_TICK_SUMMARY => self.decode_tick_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
