// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated wall session that exercises layout, animation and tracing.
//!
//! Drives a [`WallEngine`] through a scripted feed on a simulated clock:
//! tiles arrive, one leaves, the feed fails once, a burst grows the grid and
//! the screen is rotated to portrait. Events go to both a
//! [`PrettyPrintSink`] on stdout and a [`RecorderSink`], which is exported
//! as `trace.json` at the end.
//!
//! Pass a path to a JSON file holding an array of batches (each an array of
//! submission records) to replay your own feed instead of the built-in one.

use std::cell::Cell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Rect, Size};
use serde::Deserialize;

use mosaic_core::config::WallConfig;
use mosaic_core::engine::{WallEngine, WallSnapshot};
use mosaic_core::error::FetchError;
use mosaic_core::placement::PlacementChanges;
use mosaic_core::source::{DataSource, ScriptedSource};
use mosaic_core::submission::{Category, Submission, SubmissionId};
use mosaic_core::surface::RenderSurface;
use mosaic_core::time::{Clock, Duration, HostTime};
use mosaic_core::trace::Tracer;

use mosaic_debug::Tee;
use mosaic_debug::pretty::PrettyPrintSink;
use mosaic_debug::recorder::RecorderSink;

/// Length of the simulated session.
const SESSION: Duration = Duration::from_secs(45);
/// Simulated network round trip.
const FETCH_LATENCY: Duration = Duration::from_millis(120);
/// Delay between a state change and the next paint.
const FRAME: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Simulated clock and feed
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
struct SimClock(Rc<Cell<HostTime>>);

impl SimClock {
    fn advance_to(&self, t: HostTime) {
        if t > self.0.get() {
            self.0.set(t);
        }
    }

    fn advance_by(&self, d: Duration) {
        self.0.set(self.0.get().saturating_add(d));
    }
}

impl Clock for SimClock {
    fn now(&self) -> HostTime {
        self.0.get()
    }
}

/// Wraps a source and charges simulated latency to the clock on each fetch.
#[derive(Debug)]
struct SlowSource<S> {
    inner: S,
    clock: SimClock,
}

impl<S: DataSource> DataSource for SlowSource<S> {
    fn fetch(&mut self) -> Result<Vec<Submission>, FetchError> {
        self.clock.advance_by(FETCH_LATENCY);
        self.inner.fetch()
    }

    fn abort(&mut self) {
        self.inner.abort();
    }
}

fn record(id: &str, message: &str, category: &str, created_at: i64) -> Submission {
    Submission::new(id, message, Category::parse(category), created_at)
}

fn builtin_script() -> ScriptedSource {
    let a = record("ada", "Ask before you share a photo of someone.", "promote", 1);
    let b = record("bo", "Jokes that punch down are not jokes.", "challenge", 2);
    let c = record("cy", "Thank you to everyone who spoke up today!", "share", 3);
    let d = record("di", "Consent is ongoing, not a one-time checkbox.", "celebrate", 4);

    let burst: Vec<Submission> = (0..24)
        .map(|i| {
            record(
                &format!("burst-{i:02}"),
                "Look out for each other tonight.",
                "share",
                100 + i,
            )
        })
        .collect();
    let mut everyone = vec![b.clone(), c.clone(), d.clone()];
    everyone.extend(burst);

    let mut source = ScriptedSource::default();
    source.push_batch(vec![a.clone(), b.clone()]);
    source.push_batch(vec![a.clone(), b.clone(), c.clone()]);
    source.push_batch(vec![b.clone(), c.clone()]);
    source.push_error(FetchError::status(503, Some("Wall service restarting".into())));
    source.push_batch(vec![b, c, d]);
    source.push_batch(everyone.clone());
    source.push_batch(everyone);
    source
}

#[derive(Deserialize)]
#[serde(transparent)]
struct Feed(Vec<Vec<Submission>>);

fn load_script(path: &str) -> ScriptedSource {
    let file = File::open(path).expect("open feed file");
    let Feed(batches) = serde_json::from_reader(file).expect("parse feed file");
    ScriptedSource::new(batches.into_iter().map(Ok))
}

// ---------------------------------------------------------------------------
// Text surface
// ---------------------------------------------------------------------------

/// Lays tiles out on an even grid and prints each presented frame.
#[derive(Debug)]
struct TextSurface {
    viewport: Size,
    last: Option<WallSnapshot>,
}

impl TextSurface {
    fn cell_rect(&self, column: u16, row: u16) -> Option<Rect> {
        let snapshot = self.last.as_ref()?;
        let w = self.viewport.width / f64::from(snapshot.columns);
        let h = self.viewport.height / f64::from(snapshot.rows);
        let x = f64::from(column - 1) * w;
        let y = f64::from(row - 1) * h;
        Some(Rect::new(x, y, x + w, y + h))
    }
}

impl RenderSurface for TextSurface {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn tile_bounds(&self, id: &SubmissionId) -> Option<Rect> {
        let tile = self.last.as_ref()?.tile(id)?;
        self.cell_rect(tile.layout.column, tile.layout.row)
    }

    fn present(&mut self, snapshot: &WallSnapshot, changes: &PlacementChanges) {
        println!(
            "  ┌ {}x{} scale={:.2} tiles={} dimmed={} +{} -{} moved={}{}",
            snapshot.columns,
            snapshot.rows,
            snapshot.density_scale,
            snapshot.tiles.len(),
            snapshot.dimmed,
            changes.added.len(),
            changes.removed.len(),
            changes.moved.len(),
            if changes.reshuffled { " (reshuffled)" } else { "" },
        );
        if let Some(message) = snapshot.overlay_message() {
            println!("  │ {message}");
        }
        let columns = usize::from(snapshot.columns);
        let mut grid = vec![vec!['.'; columns]; usize::from(snapshot.rows)];
        for tile in &snapshot.tiles {
            let row = usize::from(tile.layout.row - 1);
            let slot = &mut grid[row][usize::from(tile.layout.column - 1)];
            *slot = if *slot != '.' {
                '*'
            } else if !tile.is_visible() {
                '?'
            } else if tile.is_highlighted() {
                '#'
            } else {
                tile.id.as_str().chars().next().unwrap_or('o')
            };
        }
        for row in grid {
            println!("  │ {}", row.into_iter().collect::<String>());
        }
        self.last = Some(snapshot.clone());
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn main() {
    let script = match std::env::args().nth(1) {
        Some(path) => load_script(&path),
        None => builtin_script(),
    };

    let clock = SimClock::default();
    let mut source = SlowSource {
        inner: script,
        clock: clock.clone(),
    };
    let mut surface = TextSurface {
        viewport: Size::new(1920.0, 1080.0),
        last: None,
    };

    let mut sinks = Tee {
        first: PrettyPrintSink::new(Box::new(std::io::stdout())),
        second: RecorderSink::new(),
    };
    let mut tracer = Tracer::new(&mut sinks);

    let mut engine = WallEngine::new(WallConfig::kiosk());
    engine.resize(surface.viewport());

    let end = HostTime::ZERO.saturating_add(SESSION);
    let rotate_at = HostTime::from_millis(32_000);
    let mut rotated = false;

    while clock.now() < end {
        if !rotated && clock.now() >= rotate_at {
            println!("-- rotating screen to portrait --");
            surface.viewport = Size::new(1080.0, 1920.0);
            engine.resize(surface.viewport());
            rotated = true;
        }

        let ticks_before = engine.tick_index();
        engine.step(&clock, &mut source, &mut tracer);
        if engine.tick_index() != ticks_before {
            engine.present(&mut surface);
        }
        if engine.paint_requested() {
            clock.advance_by(FRAME);
            engine.on_next_paint(clock.now(), &mut surface, &mut tracer);
        }

        let Some(deadline) = engine.next_deadline() else {
            break;
        };
        let mut wake = deadline.min(end);
        if !rotated {
            wake = wake.min(rotate_at);
        }
        clock.advance_to(wake);
    }

    engine.shutdown(&mut source);
    drop(tracer);
    println!(
        "-- session over: {} polls, {} tiles, timers left: {} --",
        engine.tick_index(),
        engine.tile_count(),
        engine.pending_timers(),
    );

    let file = File::create("trace.json").expect("create trace.json");
    let mut writer = BufWriter::new(file);
    mosaic_debug::chrome::export(sinks.second.as_bytes(), &mut writer).expect("write trace");
    println!("wrote trace.json");
}
