//! Snapping and numeric normalisation for transform values.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Fraction of the quadrat used as the move snap grid.
pub const MOVE_SNAP_DIVISIONS: f64 = 4.0;

/// Snap mode for offsets produced by a move drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// Offsets follow the pointer exactly.
    #[default]
    None,
    /// Offsets snap to a quarter of the quadrat.
    Grid,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::None,
        }
    }

    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        self == SnapMode::Grid
    }

    /// Apply this mode to an offset expressed in glyph units.
    pub fn apply(self, offset: Vec2, quadrat: f64) -> Vec2 {
        match self {
            SnapMode::None => offset,
            SnapMode::Grid => snap_offset(offset, quadrat / MOVE_SNAP_DIVISIONS),
        }
    }
}

/// Snap a value to the nearest multiple of `step`.
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Snap both components of an offset.
pub fn snap_offset(offset: Vec2, step: f64) -> Vec2 {
    Vec2::new(snap_to_grid(offset.x, step), snap_to_grid(offset.y, step))
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Round to two decimal places.
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(440.0, 450.0), 450.0);
        assert_eq!(snap_to_grid(-230.0, 450.0), -450.0);
        assert_eq!(snap_to_grid(200.0, 450.0), 0.0);
        assert_eq!(snap_to_grid(123.0, 0.0), 123.0);
    }

    #[test]
    fn test_grid_mode_snaps_to_quarter_quadrat() {
        let snapped = SnapMode::Grid.apply(Vec2::new(500.0, -1000.0), 1800.0);
        assert_eq!(snapped, Vec2::new(450.0, -900.0));
        let free = SnapMode::None.apply(Vec2::new(500.0, -1000.0), 1800.0);
        assert_eq!(free, Vec2::new(500.0, -1000.0));
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(450.0), 90.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(-1e-20), 0.0);
        assert_eq!(wrap_degrees(f64::NAN), 0.0);
    }

    #[test]
    fn test_round_hundredths() {
        assert_eq!(round_hundredths(1.234), 1.23);
        assert_eq!(round_hundredths(0.555_1), 0.56);
    }

    #[test]
    fn test_snap_mode_cycle() {
        assert_eq!(SnapMode::None.next(), SnapMode::Grid);
        assert_eq!(SnapMode::Grid.next(), SnapMode::None);
        assert!(SnapMode::Grid.snaps_to_grid());
    }
}
