// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch reconciliation.
//!
//! [`Reconciler::reconcile`] turns one fetched batch into an ordered render
//! list:
//!
//! 1. Duplicate identities are dropped (first occurrence wins).
//! 2. Records are stably sorted by ascending `created_at`; this canonical
//!    order feeds every tile's order value.
//! 3. Messages are truncated to [`MAX_MESSAGE_CHARS`].
//! 4. The grid is sized for the batch and the [`PlacementStore`] assigns
//!    cells.
//! 5. The batch is diffed against the identities seen on the previous call.
//!    The seen set is then replaced by the batch, so an identity that
//!    disappears and comes back is new again.
//!
//! [`MAX_MESSAGE_CHARS`]: crate::submission::MAX_MESSAGE_CHARS

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::grid::{GridConfig, GridSizer, Orientation};
use crate::placement::{LayoutCell, PlacementChanges, PlacementStore, TileHandle};
use crate::submission::{Submission, SubmissionId, truncate_message};

/// A submission with its cell attached.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTile {
    /// The record, with its message already truncated.
    pub submission: Submission,
    /// Cell and paint order.
    pub layout: LayoutCell,
    /// Slot in the placement store. Stops resolving once the tile leaves.
    pub handle: TileHandle,
}

/// Outcome of one [`Reconciler::reconcile`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    /// Tiles sorted by order value.
    pub tiles: Vec<PlacedTile>,
    /// Grid used for this batch.
    pub grid: GridConfig,
    /// Grid of the previous batch, if there was one.
    pub previous_grid: Option<GridConfig>,
    /// Identities absent from the previous batch, in canonical order.
    pub newly_arrived: Vec<SubmissionId>,
    /// Identities present in the previous batch but not in this one.
    pub removed: Vec<SubmissionId>,
    /// Whether placement reshuffled because the grid changed shape.
    pub reshuffled: bool,
    /// Tiles that share a cell with another tile.
    pub overflow: usize,
}

impl Reconciliation {
    /// Whether the grid dimensions differ from the previous batch.
    #[must_use]
    pub fn grid_changed(&self) -> bool {
        !self
            .previous_grid
            .is_some_and(|previous| previous.same_dimensions(&self.grid))
    }
}

/// Diffs batches against previously seen identities and attaches layout.
#[derive(Debug)]
pub struct Reconciler {
    sizer: GridSizer,
    placement: PlacementStore,
    seen: BTreeSet<SubmissionId>,
    orientation: Orientation,
    grid: Option<GridConfig>,
}

impl Reconciler {
    /// Creates a reconciler. `seed` drives cell shuffles.
    #[must_use]
    pub fn new(sizer: GridSizer, seed: u64) -> Self {
        Self {
            sizer,
            placement: PlacementStore::new(seed),
            seen: BTreeSet::new(),
            orientation: Orientation::Landscape,
            grid: None,
        }
    }

    /// Orientation applied on the next reconcile.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sets the orientation. Takes effect on the next reconcile.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Grid of the most recent batch.
    #[must_use]
    pub fn grid(&self) -> Option<GridConfig> {
        self.grid
    }

    /// Read access to cell assignments.
    #[must_use]
    pub fn placement(&self) -> &PlacementStore {
        &self.placement
    }

    /// Drains placement changes since the previous call.
    pub fn take_changes(&mut self) -> PlacementChanges {
        self.placement.take_changes()
    }

    /// Whether `id` was part of the most recent batch.
    #[must_use]
    pub fn has_seen(&self, id: &SubmissionId) -> bool {
        self.seen.contains(id)
    }

    /// Reconciles one batch.
    pub fn reconcile(&mut self, batch: Vec<Submission>) -> Reconciliation {
        let mut unique: BTreeSet<SubmissionId> = BTreeSet::new();
        let mut records: Vec<Submission> = batch
            .into_iter()
            .filter(|record| unique.insert(record.id.clone()))
            .collect();
        records.sort_by_key(|record| record.created_at);
        for record in &mut records {
            let keep = truncate_message(&record.message).len();
            record.message.truncate(keep);
        }

        let ids: Vec<SubmissionId> = records.iter().map(|record| record.id.clone()).collect();
        let grid = self.sizer.size_oriented(ids.len(), self.orientation);
        let assignment = self.placement.assign(&ids, &grid);

        let newly_arrived: Vec<SubmissionId> = ids
            .iter()
            .filter(|id| !self.seen.contains(*id))
            .cloned()
            .collect();
        let removed: Vec<SubmissionId> = self
            .seen
            .iter()
            .filter(|id| !unique.contains(*id))
            .cloned()
            .collect();
        self.seen = unique;

        let mut tiles: Vec<PlacedTile> = records
            .into_iter()
            .filter_map(|submission| {
                let layout = *assignment.cells.get(&submission.id)?;
                let handle = self.placement.handle(&submission.id)?;
                Some(PlacedTile {
                    submission,
                    layout,
                    handle,
                })
            })
            .collect();
        tiles.sort_by_key(|tile| tile.layout.order_value);

        let previous_grid = self.grid.replace(grid);
        Reconciliation {
            tiles,
            grid,
            previous_grid,
            newly_arrived,
            removed,
            reshuffled: assignment.reshuffled,
            overflow: assignment.overflow,
        }
    }

    /// Forgets every identity and cell.
    pub fn clear(&mut self) {
        self.placement.clear();
        self.seen.clear();
        self.grid = None;
    }
}
