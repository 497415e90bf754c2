//! Transform compositor: instance state plus placement to a render transform.
//!
//! The chain is built from elementary operations in a fixed order so that
//! rotation and scale always act about the pivot. Written as an SVG
//! transform list the first operation is the outermost:
//!
//! ```text
//! translate(offset) translate(pivot) rotate(deg) scale(flip·scale)
//!     [translate(cell_center - pivot)] scale(fit) translate(-content_center)
//! ```
//!
//! The bracketed step only appears with a pivot override, and keeps each
//! instance at its own cell while rotating and scaling about the shared point.

use crate::glyph::GlyphDefinition;
use crate::instance::TransformState;
use crate::layout::{GridMetrics, LayoutItem};
use kurbo::{Affine, Point, Vec2};
use std::fmt;

/// One elementary step of a transform chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(Vec2),
    /// Rotation in degrees, clockwise in a y-down space.
    Rotate(f64),
    Scale(f64, f64),
}

impl TransformOp {
    pub fn to_affine(self) -> Affine {
        match self {
            TransformOp::Translate(v) => Affine::translate(v),
            TransformOp::Rotate(deg) => Affine::rotate(deg.to_radians()),
            TransformOp::Scale(sx, sy) => Affine::scale_non_uniform(sx, sy),
        }
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOp::Translate(v) => write!(f, "translate({} {})", v.x, v.y),
            TransformOp::Rotate(deg) => write!(f, "rotate({deg})"),
            TransformOp::Scale(sx, sy) => write!(f, "scale({sx} {sy})"),
        }
    }
}

/// An ordered list of transform operations, outermost first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChain {
    ops: Vec<TransformOp>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation applied inside all previous ones.
    pub fn then(mut self, op: TransformOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Collapse the chain into a single matrix.
    pub fn to_affine(&self) -> Affine {
        self.ops
            .iter()
            .fold(Affine::IDENTITY, |acc, op| acc * op.to_affine())
    }
}

impl fmt::Display for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Compose the render transform for a laid-out instance.
///
/// `pivot` overrides the cell center as the rotation/scale origin, used while
/// a multi-instance selection is manipulated as a group.
pub fn compose(
    item: &LayoutItem<'_>,
    glyph: &GlyphDefinition,
    metrics: &GridMetrics,
    pivot: Option<Point>,
) -> TransformChain {
    let cell_center = metrics.cell_center(item.row, item.col);
    compose_state(&item.instance.transform, cell_center, glyph, metrics, pivot)
}

/// Compose the render transform for a transform state centered on `cell_center`.
pub fn compose_state(
    state: &TransformState,
    cell_center: Point,
    glyph: &GlyphDefinition,
    metrics: &GridMetrics,
    pivot: Option<Point>,
) -> TransformChain {
    let fit = glyph.fit_scale(metrics.quadrat);
    let flip = state.flip_signs();
    let content_center = glyph.content_center();
    let offset = state.offset * metrics.offset_scale();
    let anchor = pivot.unwrap_or(cell_center);

    let mut chain = TransformChain::new()
        .then(TransformOp::Translate(offset))
        .then(TransformOp::Translate(anchor.to_vec2()))
        .then(TransformOp::Rotate(state.rotate))
        .then(TransformOp::Scale(flip.x * state.scale_x, flip.y * state.scale_y));
    if pivot.is_some() {
        chain = chain.then(TransformOp::Translate(cell_center - anchor));
    }
    chain
        .then(TransformOp::Scale(fit, fit))
        .then(TransformOp::Translate(-content_center.to_vec2()))
}

/// Canvas-space center of a rendered instance.
pub fn rendered_center(
    state: &TransformState,
    cell_center: Point,
    glyph: &GlyphDefinition,
    metrics: &GridMetrics,
    pivot: Option<Point>,
) -> Point {
    compose_state(state, cell_center, glyph, metrics, pivot).to_affine() * glyph.content_center()
}
