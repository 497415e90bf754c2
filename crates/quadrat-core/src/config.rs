//! Editor configuration.

use crate::glyph::QUADRAT;
use crate::snap::{SnapMode, round_hundredths};
use serde::{Deserialize, Serialize};

/// Inclusive bounds for every scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.5, max: 1.8 }
    }
}

impl ScaleBounds {
    /// Finite, positive and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && 0.0 < self.min && self.min <= self.max
    }

    /// Clamp into bounds and round to two decimals.
    ///
    /// Non-finite input resolves to 1.0 before clamping. Invalid bounds clamp
    /// with the defaults instead.
    pub fn clamp(&self, value: f64) -> f64 {
        if !self.is_valid() {
            return Self::default().clamp(value);
        }
        let value = if value.is_finite() { value } else { 1.0 };
        round_hundredths(value.clamp(self.min, self.max)).clamp(self.min, self.max)
    }
}

/// Export scale presets for copy operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetScales {
    pub small: f64,
    pub large: f64,
}

impl Default for PresetScales {
    fn default() -> Self {
        Self {
            small: 0.78,
            large: 1.15,
        }
    }
}

/// Tunables for the canvas, gestures and interchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canonical glyph square edge, in glyph units.
    pub quadrat: f64,
    /// Bounds for scale, scale-x and scale-y.
    pub scale_bounds: ScaleBounds,
    /// Scale change per wheel notch.
    pub wheel_step: f64,
    /// Snap mode for move drags.
    pub move_snap: SnapMode,
    /// Number of catalog entries fetched concurrently.
    pub batch_size: usize,
    /// Copy export presets.
    pub presets: PresetScales,
    /// Handle size in screen pixels.
    pub handle_size: f64,
    /// Handle hit tolerance in screen pixels.
    pub handle_hit_tolerance: f64,
    /// Distance from the top edge to the rotate handle, in screen pixels.
    pub rotate_handle_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            quadrat: QUADRAT,
            scale_bounds: ScaleBounds::default(),
            wheel_step: 0.05,
            move_snap: SnapMode::None,
            batch_size: 24,
            presets: PresetScales::default(),
            handle_size: 12.0,
            handle_hit_tolerance: 18.0,
            rotate_handle_offset: 28.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON; missing fields take defaults.
    ///
    /// Out-of-range values are replaced by their defaults, see [`Self::sanitized`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Replace every unusable value with its default, logging a warning.
    ///
    /// Lengths and steps must be finite and positive (offsets may be zero),
    /// and scale bounds must satisfy [`ScaleBounds::is_valid`].
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64| value.is_finite() && value > 0.0;
        let non_negative = |value: f64| value.is_finite() && value >= 0.0;

        if !positive(self.quadrat) {
            log::warn!("Ignoring invalid quadrat {}, using {}", self.quadrat, defaults.quadrat);
            self.quadrat = defaults.quadrat;
        }
        if !self.scale_bounds.is_valid() {
            log::warn!(
                "Ignoring invalid scale bounds {}..{}, using {}..{}",
                self.scale_bounds.min,
                self.scale_bounds.max,
                defaults.scale_bounds.min,
                defaults.scale_bounds.max
            );
            self.scale_bounds = defaults.scale_bounds;
        }
        if !positive(self.wheel_step) {
            log::warn!("Ignoring invalid wheel step {}", self.wheel_step);
            self.wheel_step = defaults.wheel_step;
        }
        if !(positive(self.presets.small) && positive(self.presets.large)) {
            log::warn!("Ignoring invalid export presets {:?}", self.presets);
            self.presets = defaults.presets;
        }
        if !positive(self.handle_size) {
            log::warn!("Ignoring invalid handle size {}", self.handle_size);
            self.handle_size = defaults.handle_size;
        }
        if !non_negative(self.handle_hit_tolerance) {
            log::warn!("Ignoring invalid handle hit tolerance {}", self.handle_hit_tolerance);
            self.handle_hit_tolerance = defaults.handle_hit_tolerance;
        }
        if !non_negative(self.rotate_handle_offset) {
            log::warn!("Ignoring invalid rotate handle offset {}", self.rotate_handle_offset);
            self.rotate_handle_offset = defaults.rotate_handle_offset;
        }
        if self.batch_size == 0 {
            log::warn!("Ignoring zero batch size");
            self.batch_size = defaults.batch_size;
        }
        self
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
