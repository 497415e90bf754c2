//! Glyph instances: placed, transformable occurrences of a glyph definition.

use crate::config::ScaleBounds;
use crate::snap::wrap_degrees;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a glyph instance.
pub type InstanceId = Uuid;

/// Full transform state of one instance.
///
/// Every field is explicit; readers never need a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformState {
    /// Rotation in degrees, kept in `[0, 360)`.
    pub rotate: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Uniform scale as last set by a uniform command or gesture.
    pub scale: f64,
    /// Horizontal scale factor used for rendering.
    pub scale_x: f64,
    /// Vertical scale factor used for rendering.
    pub scale_y: f64,
    /// Free offset in glyph-intrinsic units.
    pub offset: Vec2,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotate: 0.0,
            flip_x: false,
            flip_y: false,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl TransformState {
    /// Rotate by `degrees`, wrapping into `[0, 360)`.
    pub fn rotate_by(&mut self, degrees: f64) {
        self.rotate = wrap_degrees(self.rotate + degrees);
    }

    /// Set all three scale factors to one clamped value.
    pub fn set_uniform_scale(&mut self, value: f64, bounds: &ScaleBounds) {
        let value = bounds.clamp(value);
        self.scale = value;
        self.scale_x = value;
        self.scale_y = value;
    }

    /// Largest of the scale factors.
    pub fn max_scale(&self) -> f64 {
        self.scale.max(self.scale_x).max(self.scale_y)
    }

    /// Flip multipliers (±1) per axis.
    pub fn flip_signs(&self) -> Vec2 {
        Vec2::new(
            if self.flip_x { -1.0 } else { 1.0 },
            if self.flip_y { -1.0 } else { 1.0 },
        )
    }
}

/// A placed occurrence of a glyph definition.
///
/// The glyph reference is weak: an unknown `glyph_id` renders as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphInstance {
    pub id: InstanceId,
    pub glyph_id: String,
    #[serde(flatten)]
    pub transform: TransformState,
}

impl GlyphInstance {
    /// Create an untransformed instance of a glyph.
    pub fn new(glyph_id: impl Into<String>) -> Self {
        Self::with_transform(glyph_id, TransformState::default())
    }

    /// Create an instance with an explicit transform state.
    pub fn with_transform(glyph_id: impl Into<String>, transform: TransformState) -> Self {
        Self {
            id: Uuid::new_v4(),
            glyph_id: glyph_id.into(),
            transform,
        }
    }
}
