// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry sequence state for one tile.

use kurbo::{Point, Rect, Size, Vec2};

use crate::time::{Duration, HostTime};

/// Live phase of an entry sequence.
///
/// `none` and `done` are not stored: a tile without an [`EntryState`] is in
/// neither phase below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPhase {
    /// Spawned, waiting for its first geometry measurement. Rendered
    /// invisible.
    Spawning,
    /// Center shift known; the entry animation is playing.
    Measured,
}

/// Parameters and progress of one entry sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryState {
    /// Current phase.
    pub phase: EntryPhase,
    /// Animation length, base plus jitter.
    pub duration: Duration,
    /// Vertical drift in pixels.
    pub drift_y: f64,
    /// Offset from the tile's center to the viewport's center. Zero until
    /// measured.
    pub center_shift: Vec2,
    /// When the sequence was spawned.
    pub spawned_at: HostTime,
    /// When it was measured, if it has been.
    pub measured_at: Option<HostTime>,
}

impl EntryState {
    pub(crate) fn spawn(now: HostTime, duration: Duration, drift_y: f64) -> Self {
        Self {
            phase: EntryPhase::Spawning,
            duration,
            drift_y,
            center_shift: Vec2::ZERO,
            spawned_at: now,
            measured_at: None,
        }
    }

    /// Whether the sequence still waits for geometry.
    #[inline]
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.phase == EntryPhase::Spawning
    }

    /// Records geometry. Only the `spawning → measured` edge is legal;
    /// returns `false` and changes nothing otherwise.
    pub(crate) fn measure(&mut self, now: HostTime, tile: Rect, viewport: Size) -> bool {
        if !self.is_spawning() {
            return false;
        }
        self.center_shift = center_shift(tile, viewport);
        self.phase = EntryPhase::Measured;
        self.measured_at = Some(now);
        true
    }
}

/// Vector from the center of `tile` to the center of the viewport.
#[must_use]
pub fn center_shift(tile: Rect, viewport: Size) -> Vec2 {
    let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
    viewport_center - tile.center()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_points_at_the_viewport_center() {
        let viewport = Size::new(1000.0, 800.0);
        let tile = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(center_shift(tile, viewport), Vec2::new(450.0, 350.0));
        let centered = Rect::new(450.0, 350.0, 550.0, 450.0);
        assert_eq!(center_shift(centered, viewport), Vec2::ZERO);
    }

    #[test]
    fn measurement_happens_once() {
        let mut state = EntryState::spawn(HostTime(0), Duration::from_secs(6), 12.0);
        let viewport = Size::new(200.0, 200.0);
        assert!(state.measure(HostTime(5), Rect::new(0.0, 0.0, 20.0, 20.0), viewport));
        let first = state.center_shift;
        assert!(!state.measure(HostTime(9), Rect::new(50.0, 50.0, 60.0, 60.0), viewport));
        assert_eq!(state.center_shift, first);
        assert_eq!(state.measured_at, Some(HostTime(5)));
        assert_eq!(state.phase, EntryPhase::Measured);
    }
}
