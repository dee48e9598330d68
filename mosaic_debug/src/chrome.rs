// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Poll phases land on thread 0, the measure pass on thread 1 and per-tile
//! animation transitions on thread 2, so the timeline separates network
//! ticks from paint-driven work.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use mosaic_core::trace::{AnimationKind, PhaseKind};

use crate::recorder::{RecordedEvent, decode};

const TID_POLL: u32 = 0;
const TID_PAINT: u32 = 1;
const TID_TILES: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are in microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // Layout events carry no timestamp of their own; they belong to the
    // most recent poll.
    let mut poll_us = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Poll(e) => {
                poll_us = ticks_to_us(e.now.ticks());
                events.push(json!({
                    "ph": "i",
                    "name": "Poll",
                    "cat": "Poll",
                    "ts": poll_us,
                    "pid": 0,
                    "tid": TID_POLL,
                    "s": "g",
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::FetchFailed {
                tick_index,
                now,
                message,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "FetchFailed",
                    "cat": "Poll",
                    "ts": ticks_to_us(now.ticks()),
                    "pid": 0,
                    "tid": TID_POLL,
                    "s": "g",
                    "args": {
                        "tick_index": tick_index,
                        "message": message,
                    }
                }));
            }
            RecordedEvent::Reconcile(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Tiles",
                    "cat": "Layout",
                    "ts": poll_us,
                    "pid": 0,
                    "tid": TID_POLL,
                    "args": {
                        "tiles": e.tile_count,
                        "arrived": e.arrived,
                        "removed": e.removed,
                    }
                }));
            }
            RecordedEvent::GridResize(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "GridResize",
                    "cat": "Layout",
                    "ts": poll_us,
                    "pid": 0,
                    "tid": TID_POLL,
                    "s": "p",
                    "args": {
                        "tick_index": e.tick_index,
                        "from": e.from.map(|(c, r)| format!("{c}x{r}")),
                        "to": format!("{}x{}", e.to.0, e.to.1),
                        "density_scale": e.density_scale,
                    }
                }));
            }
            RecordedEvent::Overflow(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Overflow",
                    "cat": "Layout",
                    "ts": poll_us,
                    "pid": 0,
                    "tid": TID_POLL,
                    "s": "p",
                    "args": {
                        "tick_index": e.tick_index,
                        "tiles": e.tile_count,
                        "capacity": e.capacity,
                        "shared": e.doubled_up,
                    }
                }));
            }
            RecordedEvent::Animation { id, kind, at } => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{kind:?}"),
                    "cat": animation_category(kind),
                    "ts": ticks_to_us(at.ticks()),
                    "pid": 0,
                    "tid": TID_TILES,
                    "s": "t",
                    "args": {
                        "id": id,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Tick",
                    "ts": ticks_to_us(e.timestamp.ticks()),
                    "pid": 0,
                    "tid": phase_thread(e.phase),
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Tick",
                    "ts": ticks_to_us(e.timestamp.ticks()),
                    "pid": 0,
                    "tid": phase_thread(e.phase),
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::TickSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TickSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(s.now.ticks()),
                    "pid": 0,
                    "tid": TID_POLL,
                    "s": "g",
                    "args": {
                        "tick_index": s.tick_index,
                        "fetched": s.fetched,
                        "tiles": s.tile_count,
                        "fetch_us": ticks_to_us(s.fetch_ticks),
                        "reconcile_us": ticks_to_us(s.reconcile_ticks),
                        "animate_us": ticks_to_us(s.animate_ticks),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64) -> f64 {
    ticks as f64 / 1000.0
}

fn phase_thread(phase: PhaseKind) -> u32 {
    match phase {
        PhaseKind::Measure => TID_PAINT,
        PhaseKind::Fetch | PhaseKind::Reconcile | PhaseKind::Animate => TID_POLL,
    }
}

fn animation_category(kind: AnimationKind) -> &'static str {
    match kind {
        AnimationKind::HighlightStarted | AnimationKind::HighlightEnded => "Highlight",
        AnimationKind::EntrySpawned
        | AnimationKind::EntryMeasured
        | AnimationKind::EntryFinished
        | AnimationKind::EntryCancelled => "Entry",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use mosaic_core::submission::SubmissionId;
    use mosaic_core::time::HostTime;
    use mosaic_core::trace::{AnimationEvent, PhaseBeginEvent, PhaseEndEvent, PollEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_poll(&PollEvent {
            tick_index: 1,
            now: HostTime(1_000_000),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            tick_index: 1,
            phase: PhaseKind::Fetch,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            tick_index: 1,
            phase: PhaseKind::Fetch,
            timestamp: HostTime(1_200_000),
        });
        let id = SubmissionId::from("a");
        rec.on_animation(&AnimationEvent {
            id: &id,
            kind: AnimationKind::HighlightStarted,
            at: HostTime(1_300_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Poll");
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Fetch");
        assert_eq!(parsed[2]["ph"], "E");

        assert_eq!(parsed[3]["cat"], "Highlight");
        assert_eq!(parsed[3]["tid"], TID_TILES);
        assert_eq!(parsed[3]["args"]["id"], "a");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
