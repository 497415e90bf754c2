//! Camera: the canvas display transform.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom at which one quadrat is 90 screen pixels wide.
pub const DEFAULT_ZOOM: f64 = 0.05;

/// Camera maps canvas coordinates (glyph units) to screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Translation in screen pixels.
    pub offset: Vec2,
    /// Screen pixels per canvas unit.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            min_zoom: 0.005,
            max_zoom: 2.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Convert a length in screen pixels to canvas units.
    pub fn screen_length(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let canvas_point = self.screen_to_canvas(screen_point);
        self.zoom = new_zoom;
        let moved = self.canvas_to_screen(canvas_point);
        self.offset += screen_point - moved;
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = DEFAULT_ZOOM;
    }

    /// Fit the camera so `bounds` fills the viewport minus `padding`.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }
        let usable = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let zoom = (usable.width / bounds.width()).min(usable.height / bounds.height());
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);

        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.offset = viewport_center.to_vec2() - bounds.center().to_vec2() * self.zoom;
    }
}
