// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell assignment that stays put across refreshes.
//!
//! [`PlacementStore`] keeps one slot per live tile identity in parallel
//! arrays. Freed slots are recycled through a free list and generation
//! counters keep stale [`TileHandle`]s from resolving to newer tiles.
//!
//! Each [`assign`](PlacementStore::assign) call follows three rules:
//!
//! 1. Identities missing from the call are released and their cells become
//!    free.
//! 2. If the grid dimensions changed (or no tile is placed yet), every cell of
//!    the new grid is shuffled and tiles take cells in canonical order. When
//!    there are more tiles than cells, cells are reused cyclically.
//! 3. Otherwise existing tiles keep their cell and only their order value is
//!    refreshed. New tiles pop a shuffled free cell, or land on a random cell
//!    once the grid is full.
//!
//! The store is the only writer of [`LayoutCell`]s; everything downstream
//! reads copies.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::fmt;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use understory_dirty::DirtyTracker;

use crate::dirty;
use crate::grid::{Cell, GridConfig};
use crate::submission::SubmissionId;

/// A handle to a tile slot in a [`PlacementStore`].
///
/// Carries a generation counter so that a handle taken before the tile was
/// removed never resolves to whichever tile reuses the slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileHandle {
    idx: u32,
    generation: u32,
}

impl TileHandle {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for TileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileHandle({}@gen{})", self.idx, self.generation)
    }
}

/// Where a tile sits and when it paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutCell {
    /// 1-indexed grid column.
    pub column: u16,
    /// 1-indexed grid row.
    pub row: u16,
    /// Position in the canonical (arrival-ordered) sequence.
    pub order_value: u32,
}

impl LayoutCell {
    /// The occupied cell. Its `Display` form is the `"<column>-<row>"` key.
    #[inline]
    #[must_use]
    pub const fn cell_key(&self) -> Cell {
        Cell::new(self.column, self.row)
    }
}

/// Result of one [`PlacementStore::assign`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    /// Layout for every identity passed in.
    pub cells: BTreeMap<SubmissionId, LayoutCell>,
    /// Whether every tile was reassigned because the grid changed shape.
    pub reshuffled: bool,
    /// Tiles placed on a cell that another tile already occupies.
    pub overflow: usize,
}

/// Incremental changes accumulated since the last
/// [`take_changes`](PlacementStore::take_changes).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementChanges {
    /// Tiles that received a slot.
    pub added: Vec<SubmissionId>,
    /// Tiles whose slot was released.
    pub removed: Vec<SubmissionId>,
    /// Existing tiles that moved to another cell.
    pub moved: Vec<SubmissionId>,
    /// Existing tiles whose order value changed.
    pub reordered: Vec<SubmissionId>,
    /// Whether a full reshuffle happened.
    pub reshuffled: bool,
}

impl PlacementChanges {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.reordered.is_empty()
            && !self.reshuffled
    }
}

/// Stateful map from tile identity to grid cell.
#[derive(Debug)]
pub struct PlacementStore {
    // -- Slot data --
    ids: Vec<Option<SubmissionId>>,
    cells: Vec<Cell>,
    order: Vec<u32>,
    generation: Vec<u32>,
    free_list: Vec<u32>,

    // -- Indexes --
    lookup: BTreeMap<SubmissionId, u32>,
    occupancy: BTreeMap<Cell, u32>,
    dimensions: Option<(u16, u16)>,

    // -- Change tracking --
    dirty: DirtyTracker<u32>,
    pending_removed: Vec<SubmissionId>,
    pending_reshuffle: bool,

    rng: SmallRng,
}

impl PlacementStore {
    /// Creates an empty store whose shuffles are driven by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            ids: Vec::new(),
            cells: Vec::new(),
            order: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            lookup: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            dimensions: None,
            dirty: DirtyTracker::new(),
            pending_removed: Vec::new(),
            pending_reshuffle: false,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether no tile is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Grid dimensions of the last assignment as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u16, u16)> {
        self.dimensions
    }

    /// Returns the handle of a placed tile.
    #[must_use]
    pub fn handle(&self, id: &SubmissionId) -> Option<TileHandle> {
        self.lookup.get(id).map(|&idx| TileHandle {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns whether the handle refers to a live tile.
    #[must_use]
    pub fn is_alive(&self, handle: TileHandle) -> bool {
        let idx = handle.idx as usize;
        idx < self.ids.len()
            && self.generation[idx] == handle.generation
            && self.ids[idx].is_some()
    }

    /// Current layout of a tile, if it is placed.
    #[must_use]
    pub fn layout(&self, id: &SubmissionId) -> Option<LayoutCell> {
        self.lookup.get(id).map(|&idx| self.layout_at(idx))
    }

    /// Current layout behind a handle, if it is still alive.
    #[must_use]
    pub fn layout_of(&self, handle: TileHandle) -> Option<LayoutCell> {
        self.is_alive(handle).then(|| self.layout_at(handle.idx))
    }

    /// Number of tiles currently occupying `cell`.
    #[must_use]
    pub fn occupants(&self, cell: Cell) -> u32 {
        self.occupancy.get(&cell).copied().unwrap_or(0)
    }

    /// Assigns cells to `ids`, given in canonical order.
    ///
    /// Duplicate identities after the first occurrence are ignored. A grid
    /// without cells seats nobody: every tile is released and the assignment
    /// is empty.
    pub fn assign(&mut self, ids: &[SubmissionId], grid: &GridConfig) -> Assignment {
        if grid.capacity() == 0 {
            self.clear();
            return Assignment::default();
        }
        let current: BTreeSet<&SubmissionId> = ids.iter().collect();
        let stale: Vec<u32> = self
            .lookup
            .iter()
            .filter(|(id, _)| !current.contains(id))
            .map(|(_, &idx)| idx)
            .collect();
        for idx in stale {
            self.release(idx);
        }

        let dimensions = (grid.columns, grid.rows);
        let dimensions_changed = self.dimensions != Some(dimensions);
        self.dimensions = Some(dimensions);

        let all_cells: Vec<Cell> = grid.cells().collect();
        let mut overflow = 0;
        let mut placed: BTreeSet<&SubmissionId> = BTreeSet::new();
        let reshuffled = dimensions_changed || self.lookup.is_empty();

        if reshuffled {
            let had_tiles = !self.lookup.is_empty();
            self.occupancy.clear();
            let mut shuffled = all_cells;
            shuffled.shuffle(&mut self.rng);

            for id in ids {
                if !placed.insert(id) {
                    continue;
                }
                let position = placed.len() - 1;
                if position >= shuffled.len() {
                    overflow += 1;
                }
                let cell = shuffled[position % shuffled.len()];
                let order = order_value(position);
                match self.lookup.get(id) {
                    Some(&idx) => {
                        self.set_cell(idx, cell);
                        self.set_order(idx, order);
                    }
                    None => {
                        self.allocate(id, cell, order);
                    }
                }
                self.occupy(cell);
            }
            self.pending_reshuffle |= had_tiles;
        } else {
            let mut available: Vec<Cell> = all_cells
                .iter()
                .copied()
                .filter(|cell| !self.occupancy.contains_key(cell))
                .collect();
            available.shuffle(&mut self.rng);

            for id in ids {
                if !placed.insert(id) {
                    continue;
                }
                let order = order_value(placed.len() - 1);
                if let Some(&idx) = self.lookup.get(id) {
                    self.set_order(idx, order);
                    continue;
                }
                let cell = match available.pop() {
                    Some(cell) => cell,
                    None => {
                        overflow += 1;
                        all_cells[self.rng.gen_range(0..all_cells.len())]
                    }
                };
                self.allocate(id, cell, order);
                self.occupy(cell);
            }
        }

        let cells = placed
            .into_iter()
            .filter_map(|id| self.layout(id).map(|layout| (id.clone(), layout)))
            .collect();

        Assignment {
            cells,
            reshuffled: reshuffled && dimensions_changed,
            overflow,
        }
    }

    /// Drains the changes accumulated since the previous call.
    pub fn take_changes(&mut self) -> PlacementChanges {
        let added: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        let moved: Vec<u32> = self
            .dirty
            .drain(dirty::CELL)
            .deterministic()
            .run()
            .collect();
        let reordered: Vec<u32> = self
            .dirty
            .drain(dirty::ORDER)
            .deterministic()
            .run()
            .collect();

        let ids_of = |slots: &[u32], skip: &[u32]| -> Vec<SubmissionId> {
            let mut live: Vec<u32> = slots
                .iter()
                .copied()
                .filter(|idx| !skip.contains(idx))
                .filter(|&idx| self.ids[idx as usize].is_some())
                .collect();
            live.sort_by_key(|&idx| self.order[idx as usize]);
            live.into_iter()
                .filter_map(|idx| self.ids[idx as usize].clone())
                .collect()
        };
        let changes = PlacementChanges {
            added: ids_of(&added, &[]),
            moved: ids_of(&moved, &added),
            reordered: ids_of(&reordered, &added),
            removed: Vec::new(),
            reshuffled: false,
        };
        PlacementChanges {
            removed: core::mem::take(&mut self.pending_removed),
            reshuffled: core::mem::take(&mut self.pending_reshuffle),
            ..changes
        }
    }

    /// Releases every tile, as if all identities disappeared.
    pub fn clear(&mut self) {
        let live: Vec<u32> = self.lookup.values().copied().collect();
        for idx in live {
            self.release(idx);
        }
        self.dimensions = None;
    }

    // -- Slot management --

    fn layout_at(&self, idx: u32) -> LayoutCell {
        let cell = self.cells[idx as usize];
        LayoutCell {
            column: cell.column,
            row: cell.row,
            order_value: self.order[idx as usize],
        }
    }

    fn allocate(&mut self, id: &SubmissionId, cell: Cell, order: u32) -> u32 {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.ids[idx as usize] = Some(id.clone());
            self.cells[idx as usize] = cell;
            self.order[idx as usize] = order;
            idx
        } else {
            let idx = u32::try_from(self.ids.len()).unwrap_or(u32::MAX);
            self.ids.push(Some(id.clone()));
            self.cells.push(cell);
            self.order.push(order);
            self.generation.push(0);
            idx
        };
        self.lookup.insert(id.clone(), idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        idx
    }

    fn release(&mut self, idx: u32) {
        let Some(id) = self.ids[idx as usize].take() else {
            return;
        };
        self.vacate(self.cells[idx as usize]);
        self.lookup.remove(&id);
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.pending_removed.push(id);
    }

    fn set_cell(&mut self, idx: u32, cell: Cell) {
        if self.cells[idx as usize] != cell {
            self.cells[idx as usize] = cell;
            self.dirty.mark(idx, dirty::CELL);
        }
    }

    fn set_order(&mut self, idx: u32, order: u32) {
        if self.order[idx as usize] != order {
            self.order[idx as usize] = order;
            self.dirty.mark(idx, dirty::ORDER);
        }
    }

    fn occupy(&mut self, cell: Cell) {
        *self.occupancy.entry(cell).or_insert(0) += 1;
    }

    fn vacate(&mut self, cell: Cell) {
        if let Some(count) = self.occupancy.get_mut(&cell) {
            *count -= 1;
            if *count == 0 {
                self.occupancy.remove(&cell);
            }
        }
    }
}

fn order_value(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSizer;
    use alloc::format;

    fn sid(name: &str) -> SubmissionId {
        SubmissionId::from(name)
    }

    fn ids(names: &[&str]) -> Vec<SubmissionId> {
        names.iter().map(|&n| sid(n)).collect()
    }

    fn numbered(count: usize) -> Vec<SubmissionId> {
        (0..count).map(|i| SubmissionId::new(format!("t{i}"))).collect()
    }

    #[test]
    fn repeated_assignment_is_stable() {
        let grid = GridSizer::wall().size(3);
        let mut store = PlacementStore::new(7);
        let batch = ids(&["a", "b", "c"]);

        let first = store.assign(&batch, &grid);
        let second = store.assign(&batch, &grid);
        assert_eq!(first.cells, second.cells);
        assert!(!second.reshuffled);
    }

    #[test]
    fn new_arrival_only_moves_itself() {
        let grid = GridSizer::wall().size(3);
        let mut store = PlacementStore::new(11);
        let first = store.assign(&ids(&["a", "b"]), &grid);
        let second = store.assign(&ids(&["a", "b", "c"]), &grid);

        assert_eq!(first.cells[&sid("a")], second.cells[&sid("a")]);
        assert_eq!(first.cells[&sid("b")], second.cells[&sid("b")]);
        let c = second.cells[&sid("c")].cell_key();
        assert_ne!(c, first.cells[&sid("a")].cell_key());
        assert_ne!(c, first.cells[&sid("b")].cell_key());
        assert_eq!(store.occupants(c), 1);
    }

    #[test]
    fn removal_frees_the_cell() {
        let grid = GridSizer::wall().size(2);
        let mut store = PlacementStore::new(3);
        let first = store.assign(&ids(&["a", "b"]), &grid);
        let a_cell = first.cells[&sid("a")].cell_key();

        let second = store.assign(&ids(&["b"]), &grid);
        assert_eq!(store.occupants(a_cell), 0);
        assert!(!second.cells.contains_key(&sid("a")));
        assert_eq!(second.cells[&sid("b")].order_value, 0);
    }

    #[test]
    fn dimension_change_reassigns_without_sharing() {
        let sizer = GridSizer::wall();
        let mut store = PlacementStore::new(5);
        let small = numbered(24);
        store.assign(&small, &sizer.size(small.len()));

        let mut large = small.clone();
        large.push(sid("t24"));
        let grid = sizer.size(large.len());
        let result = store.assign(&large, &grid);

        assert!(result.reshuffled);
        assert_eq!(result.overflow, 0);
        let distinct: BTreeSet<Cell> = result.cells.values().map(LayoutCell::cell_key).collect();
        assert_eq!(distinct.len(), large.len());
        assert!(distinct.iter().all(|&c| grid.contains(c)));
    }

    #[test]
    fn full_grid_overflows_instead_of_rejecting() {
        let sizer = GridSizer {
            max_levels: 0,
            ..GridSizer::wall()
        };
        let batch = numbered(30);
        let grid = sizer.size(batch.len());
        let mut store = PlacementStore::new(9);

        let result = store.assign(&batch, &grid);
        assert_eq!(result.cells.len(), 30);
        assert_eq!(result.overflow, 6);

        let mut more = batch.clone();
        more.push(sid("extra"));
        let result = store.assign(&more, &grid);
        assert_eq!(result.overflow, 1);
        assert!(grid.contains(result.cells[&sid("extra")].cell_key()));
    }

    #[test]
    fn order_tracks_canonical_position() {
        let grid = GridSizer::wall().size(3);
        let mut store = PlacementStore::new(1);
        store.assign(&ids(&["a", "b", "c"]), &grid);
        let before = store.layout(&sid("c")).map(|l| l.cell_key());
        store.assign(&ids(&["b", "c"]), &grid);

        let c = store.layout(&sid("c")).expect("c is placed");
        assert_eq!(c.order_value, 1);
        assert_eq!(Some(c.cell_key()), before);
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let grid = GridSizer::wall().size(2);
        let mut store = PlacementStore::new(2);
        store.assign(&ids(&["a"]), &grid);
        let handle = store.handle(&sid("a")).expect("a is placed");
        assert!(store.is_alive(handle));

        store.assign(&ids(&["b"]), &grid);
        assert!(!store.is_alive(handle));
        assert!(store.layout_of(handle).is_none());
        let reused = store.handle(&sid("b")).expect("b is placed");
        assert_eq!(reused.index(), handle.index());
        assert_ne!(reused.generation(), handle.generation());
    }

    #[test]
    fn empty_grid_seats_nobody() {
        let mut store = PlacementStore::new(8);
        store.assign(&ids(&["a", "b"]), &GridSizer::wall().size(2));
        store.take_changes();

        let empty = GridConfig {
            columns: 0,
            ..GridSizer::wall().size(2)
        };
        let result = store.assign(&ids(&["a", "b", "c"]), &empty);
        assert_eq!(result, Assignment::default());
        assert!(store.is_empty());
        assert_eq!(store.take_changes().removed, ids(&["a", "b"]));

        let result = store.assign(&ids(&["a"]), &GridSizer::wall().size(1));
        assert!(result.cells.contains_key(&sid("a")));
    }

    #[test]
    fn duplicates_are_placed_once() {
        let grid = GridSizer::wall().size(2);
        let mut store = PlacementStore::new(4);
        let result = store.assign(&ids(&["a", "a", "b"]), &grid);
        assert_eq!(result.cells.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(result.cells[&sid("b")].order_value, 1);
    }

    #[test]
    fn changes_report_added_moved_and_removed() {
        let sizer = GridSizer::wall();
        let mut store = PlacementStore::new(6);
        store.assign(&ids(&["a", "b"]), &sizer.size(2));
        let changes = store.take_changes();
        assert_eq!(changes.added, ids(&["a", "b"]));
        assert!(!changes.reshuffled);

        store.assign(&ids(&["b", "c"]), &sizer.size(2));
        let changes = store.take_changes();
        assert_eq!(changes.removed, ids(&["a"]));
        assert_eq!(changes.added, ids(&["c"]));
        assert_eq!(changes.reordered, ids(&["b"]));
        assert!(changes.moved.is_empty());
        assert!(store.take_changes().is_empty());
    }
}
