//! Manipulation handles around a selection.

use crate::bounds::SelectionBounds;
use crate::camera::Camera;
use crate::config::EditorConfig;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    /// Above the top edge.
    Rotate,
}

/// What a drag does, chosen by where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragMode {
    Move,
    Rotate,
    ScaleUniform,
    ScaleX,
    ScaleY,
}

impl HandleKind {
    /// The drag mode started from this handle.
    pub fn drag_mode(self) -> DragMode {
        match self {
            HandleKind::Corner(_) => DragMode::ScaleUniform,
            HandleKind::Edge(Edge::Left | Edge::Right) => DragMode::ScaleX,
            HandleKind::Edge(Edge::Top | Edge::Bottom) => DragMode::ScaleY,
            HandleKind::Rotate => DragMode::Rotate,
        }
    }
}

/// A handle with its canvas position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a canvas point is within `tolerance` of this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handle dimensions in canvas units for the current zoom.
///
/// Sizes are configured in screen pixels so handles look the same at any zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    pub size: f64,
    pub tolerance: f64,
    pub rotate_offset: f64,
}

impl HandleMetrics {
    pub fn new(config: &EditorConfig, camera: &Camera) -> Self {
        Self {
            size: camera.screen_length(config.handle_size),
            tolerance: camera.screen_length(config.handle_hit_tolerance),
            rotate_offset: camera.screen_length(config.rotate_handle_offset),
        }
    }
}

/// The nine handles of a selection: corners, edge midpoints, rotate.
pub fn selection_handles(bounds: &SelectionBounds, metrics: &HandleMetrics) -> Vec<Handle> {
    let r = bounds.rect();
    let c = r.center();
    vec![
        Handle::new(Point::new(r.x0, r.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(r.x1, r.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(r.x0, r.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(r.x1, r.y1), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(Point::new(c.x, r.y0), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(r.x1, c.y), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(c.x, r.y1), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(r.x0, c.y), HandleKind::Edge(Edge::Left)),
        Handle::new(Point::new(c.x, r.y0 - metrics.rotate_offset), HandleKind::Rotate),
    ]
}

/// Find the first handle hit at `point`.
pub fn hit_test_handles(
    bounds: &SelectionBounds,
    point: Point,
    metrics: &HandleMetrics,
) -> Option<HandleKind> {
    selection_handles(bounds, metrics)
        .into_iter()
        .find(|handle| handle.hit_test(point, metrics.tolerance))
        .map(|handle| handle.kind)
}

/// Drag mode for a pointer-down: a handle, else the body, else nothing.
pub fn hit_test_selection(
    bounds: &SelectionBounds,
    point: Point,
    metrics: &HandleMetrics,
) -> Option<DragMode> {
    if let Some(kind) = hit_test_handles(bounds, point, metrics) {
        return Some(kind.drag_mode());
    }
    bounds.contains(point).then_some(DragMode::Move)
}
