// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render surface contract.
//!
//! The engine decides *where* and *how* each tile animates; a render surface
//! turns that into pixels (DOM elements, a GPU scene, a terminal grid). It
//! plays two roles:
//!
//! - **Geometry**: [`RenderSurface::viewport`] and
//!   [`RenderSurface::tile_bounds`] answer the measurement pass that moves a
//!   spawning tile to `measured`.
//!
//! - **Presentation**: [`RenderSurface::present`] receives the full
//!   [`WallSnapshot`] together with the incremental [`PlacementChanges`] since
//!   the previous call, so retained-mode surfaces can patch instead of
//!   rebuild.
//!
//! [`WallSnapshot`]: crate::engine::WallSnapshot
//! [`PlacementChanges`]: crate::placement::PlacementChanges

use kurbo::{Rect, Size};

use crate::engine::WallSnapshot;
use crate::placement::PlacementChanges;
use crate::submission::SubmissionId;

/// Displays a wall and reports tile geometry back to the engine.
pub trait RenderSurface {
    /// Current size of the visible area.
    fn viewport(&self) -> Size;

    /// Bounds of the rendered tile in viewport coordinates, or `None` if the
    /// tile is not mounted yet.
    fn tile_bounds(&self, id: &SubmissionId) -> Option<Rect>;

    /// Applies a snapshot to the backing presentation tree.
    fn present(&mut self, snapshot: &WallSnapshot, changes: &PlacementChanges);
}
