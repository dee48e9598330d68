// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the placement store.
//!
//! Each tile slot in the [`PlacementStore`](crate::placement::PlacementStore)
//! is a key in an [`understory_dirty`] tracker. Assignments mark the channel
//! matching what changed; [`take_changes`] drains every channel into a
//! [`PlacementChanges`] so a render surface can patch its tree instead of
//! repainting it.
//!
//! No channel propagates: tiles have no dependencies on each other.
//!
//! [`take_changes`]: crate::placement::PlacementStore::take_changes
//! [`PlacementChanges`]: crate::placement::PlacementChanges

use understory_dirty::Channel;

/// The tile moved to a different cell.
pub const CELL: Channel = Channel::new(0);

/// The tile's paint order changed.
pub const ORDER: Channel = Channel::new(1);

/// The tile slot was allocated.
pub const TOPOLOGY: Channel = Channel::new(2);
