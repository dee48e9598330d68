// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration and presets.
//!
//! [`WallConfig`] bundles everything the [`WallEngine`] needs: the
//! [`GridSizer`], the [`AnimationConfig`], the poll interval and the seed for
//! cell shuffles and entry jitter. Presets are `const fn` so a wall can be
//! configured in a `static`.
//!
//! [`WallEngine`]: crate::engine::WallEngine

use crate::grid::GridSizer;
use crate::time::Duration;

/// Timing parameters for per-tile animation sequences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Length of the highlight pulse. Retriggering restarts it.
    pub highlight_pulse: Duration,
    /// Minimum length of an entry sequence.
    pub entry_base: Duration,
    /// Upper bound of the random extra added to `entry_base`.
    pub entry_jitter: Duration,
    /// Time after the entry sequence ends before its state is cleared.
    pub entry_grace: Duration,
    /// Vertical drift is drawn uniformly from `[-drift_range, drift_range)`.
    pub drift_range: f64,
}

impl AnimationConfig {
    /// The stock wall timings: 1.8 s pulse, 6–7 s entry, 0.5 s grace and a
    /// ±100 px drift.
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            highlight_pulse: Duration::from_millis(1800),
            entry_base: Duration::from_secs(6),
            entry_jitter: Duration::from_secs(1),
            entry_grace: Duration::from_millis(500),
            drift_range: 100.0,
        }
    }

    /// Total time an entry sequence holds its timer: duration plus grace.
    #[must_use]
    pub const fn entry_lifetime(&self, duration: Duration) -> Duration {
        duration.saturating_add(self.entry_grace)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::wall()
    }
}

/// Top-level engine configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallConfig {
    /// Tile count to grid mapping.
    pub sizer: GridSizer,
    /// Highlight and entry timings.
    pub animation: AnimationConfig,
    /// Time between the end of one poll tick and the start of the next.
    pub poll_interval: Duration,
    /// Seed for cell shuffles and entry jitter.
    pub seed: u64,
}

impl WallConfig {
    /// Production wall: 5 s polling, stock grid and timings.
    #[must_use]
    pub const fn kiosk() -> Self {
        Self {
            sizer: GridSizer::wall(),
            animation: AnimationConfig::wall(),
            poll_interval: Duration::from_secs(5),
            seed: 0x6d6f_7361_6963,
        }
    }

    /// Fast preset for rehearsals and demos: 1 s polling and halved
    /// animation timings.
    #[must_use]
    pub const fn rehearsal() -> Self {
        Self {
            sizer: GridSizer::wall(),
            animation: AnimationConfig {
                highlight_pulse: Duration::from_millis(900),
                entry_base: Duration::from_secs(3),
                entry_jitter: Duration::from_millis(500),
                entry_grace: Duration::from_millis(250),
                drift_range: 100.0,
            },
            poll_interval: Duration::from_secs(1),
            seed: 1,
        }
    }

    /// Returns a copy with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self::kiosk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kiosk_matches_the_stock_wall() {
        let config = WallConfig::kiosk();
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
        assert_eq!(config.animation.highlight_pulse, Duration::from_millis(1800));
        assert_eq!((config.sizer.base_columns, config.sizer.base_rows), (6, 4));
        assert_eq!(
            config.animation.entry_lifetime(Duration::from_secs(6)),
            Duration::from_millis(6500)
        );
    }

    #[test]
    fn rehearsal_is_faster() {
        let kiosk = WallConfig::kiosk();
        let rehearsal = WallConfig::rehearsal().with_seed(99);
        assert!(rehearsal.poll_interval < kiosk.poll_interval);
        assert!(rehearsal.animation.entry_base < kiosk.animation.entry_base);
        assert_eq!(rehearsal.seed, 99);
    }
}
