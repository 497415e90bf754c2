//! Selection bounds: the box used for handles and as the group pivot.

use crate::camera::Camera;
use crate::catalog::GlyphCatalog;
use crate::glyph::GlyphDefinition;
use crate::instance::{InstanceId, TransformState};
use crate::layout::{GridMetrics, LayoutItem};
use crate::transform::rendered_center;
use kurbo::{Point, Rect};

/// Axis-aligned canvas-space box around one or more rendered instances.
///
/// Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionBounds {
    /// Build from any rectangle, normalising inverted edges.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width().max(0.0),
            height: rect.height().max(0.0),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn union(&self, other: &SelectionBounds) -> Self {
        Self::from_rect(self.rect().union(other.rect()))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

/// Screen-space corners of one painted instance, reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub instance: InstanceId,
    pub corners: [Point; 4],
}

/// Bounds from measured screen corners, mapped back through the camera.
///
/// Returns `None` when any corner is not finite.
pub fn measured_bounds(corners: &[Point; 4], camera: &Camera) -> Option<SelectionBounds> {
    let inverse = camera.inverse_transform();
    let mut canvas = corners.iter().map(|corner| inverse * *corner);
    let first = canvas.next()?;
    let rect = canvas.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p));
    let finite = [rect.x0, rect.y0, rect.x1, rect.y1].iter().all(|v| v.is_finite());
    finite.then(|| SelectionBounds::from_rect(rect))
}

/// Conservative footprint of one instance from its intrinsic size.
///
/// The glyph box is scaled by fit and scale factors, rotated, then enclosed
/// in an axis-aligned box centred on the rendered content center.
pub fn estimate_bounds(
    state: &TransformState,
    cell_center: Point,
    glyph: &GlyphDefinition,
    metrics: &GridMetrics,
    pivot: Option<Point>,
) -> SelectionBounds {
    let fit = glyph.fit_scale(metrics.quadrat);
    let half_w = glyph.width() * fit * state.scale_x.abs() / 2.0;
    let half_h = glyph.height() * fit * state.scale_y.abs() / 2.0;
    let (sin, cos) = state.rotate.to_radians().sin_cos();
    let extent_x = cos.abs() * half_w + sin.abs() * half_h;
    let extent_y = sin.abs() * half_w + cos.abs() * half_h;
    let center = rendered_center(state, cell_center, glyph, metrics, pivot);
    SelectionBounds::from_rect(Rect::new(
        center.x - extent_x,
        center.y - extent_y,
        center.x + extent_x,
        center.y + extent_y,
    ))
}

/// A cell-sized box on an instance's own cell.
pub fn fallback_bounds(metrics: &GridMetrics, row: usize, col: usize) -> SelectionBounds {
    SelectionBounds::from_rect(metrics.cell_rect(row, col))
}

/// Bounds for a selection.
///
/// A single selected instance with a measurement for it uses the measured
/// corners. Anything else unions the estimated footprints. Returns `None`
/// for an empty selection or when no selected instance has a known glyph.
pub fn selection_bounds(
    items: &[LayoutItem<'_>],
    selection: &[InstanceId],
    catalog: &GlyphCatalog,
    metrics: &GridMetrics,
    measurement: Option<&Measurement>,
    camera: &Camera,
    pivot: Option<Point>,
) -> Option<SelectionBounds> {
    if let ([only], Some(measured)) = (selection, measurement) {
        if measured.instance == *only && pivot.is_none() {
            if let Some(bounds) = measured_bounds(&measured.corners, camera) {
                return Some(bounds);
            }
        }
    }

    items
        .iter()
        .filter(|item| selection.contains(&item.instance.id))
        .filter_map(|item| {
            let glyph = catalog.get(&item.instance.glyph_id)?;
            let cell_center = metrics.cell_center(item.row, item.col);
            Some(estimate_bounds(&item.instance.transform, cell_center, glyph, metrics, pivot))
        })
        .reduce(|a, b| a.union(&b))
}
