// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid sizing.
//!
//! [`GridSizer::size`] maps a tile count to a [`GridConfig`]. The grid grows
//! in discrete levels from a base capacity: each level adds one column and
//! one row, so with the default 6×4 base the tiers are 24, 35, 48, 63, ...
//! tiles. The density scale shrinks with every level and is clamped to
//! `[min_scale, max_scale]`.
//!
//! Sizing is a pure function of the tile count and [`Orientation`], so
//! comparing two [`GridConfig`]s is a cheap way to detect that the grid
//! changed between refreshes.

use core::fmt;

use kurbo::Size;

/// One `(column, row)` slot in a grid. Both coordinates are 1-indexed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    /// 1-indexed column.
    pub column: u16,
    /// 1-indexed row.
    pub row: u16,
}

impl Cell {
    /// Creates a cell.
    #[inline]
    #[must_use]
    pub const fn new(column: u16, row: u16) -> Self {
        Self { column, row }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({self})")
    }
}

/// Formats as the `"<column>-<row>"` occupancy key.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.column, self.row)
    }
}

/// Whether the wall is wider than it is tall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Width at least height; the base grid keeps more columns than rows.
    #[default]
    Landscape,
    /// Height exceeds width; base columns and rows are swapped.
    Portrait,
}

impl Orientation {
    /// Derives the orientation from viewport dimensions.
    ///
    /// Degenerate sizes fall back to [`Orientation::Landscape`].
    #[must_use]
    pub fn from_viewport(viewport: Size) -> Self {
        if viewport.height > viewport.width && viewport.width > 0.0 {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }
}

/// Grid dimensions and density for one refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u16,
    /// Number of rows.
    pub rows: u16,
    /// Multiplier applied to tile size and typography.
    pub density_scale: f32,
    /// Expansion level above the base grid (0 for the base grid).
    pub level: u8,
}

impl GridConfig {
    /// Number of cells in the grid.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Whether `other` has the same column and row counts.
    #[inline]
    #[must_use]
    pub const fn same_dimensions(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }

    /// Whether `cell` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.column >= 1 && cell.column <= self.columns && cell.row >= 1 && cell.row <= self.rows
    }

    /// Enumerates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let columns = self.columns;
        (1..=self.rows).flat_map(move |row| (1..=columns).map(move |column| Cell::new(column, row)))
    }
}

/// Maps tile counts to grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSizer {
    /// Columns of the base (level 0) grid in landscape orientation.
    pub base_columns: u16,
    /// Rows of the base (level 0) grid in landscape orientation.
    pub base_rows: u16,
    /// Upper bound on expansion levels. Counts beyond the last level's
    /// capacity overflow and share cells.
    pub max_levels: u8,
    /// Lower bound for [`GridConfig::density_scale`].
    pub min_scale: f32,
    /// Upper bound for [`GridConfig::density_scale`].
    pub max_scale: f32,
}

impl Default for GridSizer {
    fn default() -> Self {
        Self::wall()
    }
}

impl GridSizer {
    /// The 6×4 base grid used on the shared wall.
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            base_columns: 6,
            base_rows: 4,
            max_levels: 20,
            min_scale: 0.25,
            max_scale: 1.0,
        }
    }

    /// Sizes a landscape grid for `tile_count` tiles.
    #[must_use]
    pub fn size(&self, tile_count: usize) -> GridConfig {
        self.size_oriented(tile_count, Orientation::Landscape)
    }

    /// Sizes a grid for `tile_count` tiles in the given orientation.
    ///
    /// A count of zero is sized as one tile.
    #[must_use]
    pub fn size_oriented(&self, tile_count: usize, orientation: Orientation) -> GridConfig {
        let count = tile_count.max(1);
        let (base_columns, base_rows) = match orientation {
            Orientation::Landscape => (self.base_columns, self.base_rows),
            Orientation::Portrait => (self.base_rows, self.base_columns),
        };
        let base_columns = base_columns.max(1);
        let base_rows = base_rows.max(1);

        let mut level: u8 = 0;
        let mut capacity = usize::from(base_columns) * usize::from(base_rows);
        while count > capacity && level < self.max_levels {
            level += 1;
            capacity = usize::from(base_columns + u16::from(level))
                * usize::from(base_rows + u16::from(level));
        }

        GridConfig {
            columns: base_columns + u16::from(level),
            rows: base_rows + u16::from(level),
            density_scale: self.scale_for_level(level),
            level,
        }
    }

    /// Density scale for an expansion level.
    ///
    /// The longer base side divided by the longer side at `level`, so the
    /// value is the same for both orientations and shrinks with every level.
    ///
    /// Swapped bounds are reordered and a NaN bound is treated as unbounded.
    #[must_use]
    pub fn scale_for_level(&self, level: u8) -> f32 {
        let base = f32::from(self.base_columns.max(self.base_rows).max(1));
        let raw = base / (base + f32::from(level));
        let low = if self.min_scale.is_nan() { 0.0 } else { self.min_scale };
        let high = if self.max_scale.is_nan() { f32::INFINITY } else { self.max_scale };
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        raw.clamp(low, high)
    }
}
