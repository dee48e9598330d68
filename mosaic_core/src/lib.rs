// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive grid layout and per-tile animation for live submission walls.
//!
//! `mosaic_core` decides, on every data refresh, how many grid cells exist,
//! which tile occupies which cell, which tiles are new and what animation
//! phase each tile is in. Existing tiles stay put across refreshes; only a
//! change of grid shape reshuffles the wall. It is `no_std` compatible (with
//! `alloc`) and never reads a clock or spawns a thread: the host passes time
//! in and drives the engine cooperatively.
//!
//! # Architecture
//!
//! ```text
//!   DataSource::fetch()
//!       │
//!       ▼
//!   Reconciler::reconcile() ──► GridSizer ──► PlacementStore::assign()
//!       │
//!       ▼
//!   newly arrived / removed ──► AnimationController
//!                                   │
//!                 ┌─────────────────┘
//!                 ▼
//!   WallSnapshot ──► RenderSurface::present()
//!                         │
//!                 ┌───────┘
//!                 ▼
//!   tile geometry ──► WallEngine::on_next_paint()
//! ```
//!
//! **[`engine`]**: [`WallEngine`](engine::WallEngine) ties everything
//! together: poll ticks, timers, geometry callbacks, snapshots and shutdown.
//!
//! **[`grid`]**: Pure mapping from tile count to columns, rows and density
//! scale.
//!
//! **[`placement`]**: Struct-of-arrays cell assignment with generational
//! handles and incremental change tracking.
//!
//! **[`dirty`]**: Channels for placement change tracking via
//! `understory_dirty`.
//!
//! **[`reconcile`]**: Canonical ordering, deduplication and the seen-set
//! diff.
//!
//! **[`animation`]**: Highlight pulses and the `spawning → measured → done`
//! entry sequence.
//!
//! **[`timer`]**: Cancellable per-tile deadlines.
//!
//! **[`source`]** and **[`surface`]**: The traits a host implements to feed
//! and display the wall.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! poll-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): `Deserialize` for submission records.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod config;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod grid;
pub mod placement;
pub mod reconcile;
pub mod source;
pub mod submission;
pub mod surface;
pub mod time;
pub mod timer;
pub mod trace;
