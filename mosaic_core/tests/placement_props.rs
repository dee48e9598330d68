// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for cell assignment.

use std::collections::BTreeSet;

use mosaic_core::grid::{Cell, GridSizer};
use mosaic_core::placement::PlacementStore;
use mosaic_core::reconcile::Reconciler;
use mosaic_core::submission::{Category, Submission, SubmissionId};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn numbered(range: std::ops::Range<usize>) -> Vec<SubmissionId> {
    range.map(|i| SubmissionId::new(format!("s{i}"))).collect()
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn cells_are_unique_within_capacity(count in 1_usize..120, seed in any::<u64>()) {
        let sizer = GridSizer::wall();
        let ids = numbered(0..count);
        let grid = sizer.size(ids.len());
        let mut store = PlacementStore::new(seed);
        let result = store.assign(&ids, &grid);

        prop_assert_eq!(result.overflow, 0);
        let cells: BTreeSet<Cell> = result.cells.values().map(|l| l.cell_key()).collect();
        prop_assert_eq!(cells.len(), count);
        prop_assert!(cells.iter().all(|&c| grid.contains(c)));
    }

    #[test]
    fn arrival_on_a_stable_grid_moves_nobody_else(
        count in 1_usize..23,
        seed in any::<u64>(),
    ) {
        let sizer = GridSizer::wall();
        let before_ids = numbered(0..count);
        let after_ids = numbered(0..count + 1);
        let grid = sizer.size(after_ids.len());
        prop_assert!(sizer.size(before_ids.len()).same_dimensions(&grid));

        let mut store = PlacementStore::new(seed);
        let before = store.assign(&before_ids, &grid);
        let after = store.assign(&after_ids, &grid);

        for id in &before_ids {
            prop_assert_eq!(before.cells[id].cell_key(), after.cells[id].cell_key());
        }
        let newcomer = after.cells[&after_ids[count]].cell_key();
        prop_assert!(before.cells.values().all(|l| l.cell_key() != newcomer));
    }

    #[test]
    fn removals_never_move_survivors(
        count in 2_usize..24,
        removed in prop::collection::btree_set(0_usize..24, 1..4),
        seed in any::<u64>(),
    ) {
        let sizer = GridSizer::wall();
        let all = numbered(0..count);
        let survivors: Vec<SubmissionId> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, id)| id.clone())
            .collect();
        prop_assume!(!survivors.is_empty());
        let grid = sizer.size(all.len());

        let mut store = PlacementStore::new(seed);
        let before = store.assign(&all, &grid);
        let after = store.assign(&survivors, &grid);

        for (position, id) in survivors.iter().enumerate() {
            prop_assert_eq!(before.cells[id].cell_key(), after.cells[id].cell_key());
            prop_assert_eq!(after.cells[id].order_value as usize, position);
        }
    }

    #[test]
    fn seen_set_reports_each_arrival_once(
        batches in prop::collection::vec(prop::collection::btree_set(0_usize..12, 0..12), 1..8),
    ) {
        let mut reconciler = Reconciler::new(GridSizer::wall(), 3);
        let mut previous: BTreeSet<usize> = BTreeSet::new();
        for batch in batches {
            let records: Vec<Submission> = batch
                .iter()
                .map(|&i| Submission::new(format!("s{i}").as_str(), "", Category::Share, i as i64))
                .collect();
            let result = reconciler.reconcile(records);
            let arrived: BTreeSet<SubmissionId> = result.newly_arrived.into_iter().collect();
            let expected: BTreeSet<SubmissionId> = batch
                .difference(&previous)
                .map(|i| SubmissionId::new(format!("s{i}")))
                .collect();
            prop_assert_eq!(arrived, expected);
            previous = batch;
        }
    }
}
