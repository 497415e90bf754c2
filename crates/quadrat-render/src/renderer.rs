//! Renderer trait abstraction and the SVG frame renderer.

use kurbo::{Affine, Point, Rect, Size};
use quadrat_core::handles::{HandleKind, selection_handles};
use quadrat_core::svg::{escape_attr, glyph_def_id};
use quadrat_core::{Canvas, SelectionBounds};
use std::collections::BTreeMap;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Cell guide style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No guides.
    #[default]
    None,
    /// Outline every occupied cell.
    Cells,
    /// A dot at each occupied cell center.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Cells,
            GridStyle::Cells => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Cells => "Cells",
            GridStyle::Dots => "Dots",
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    /// Background fill, any CSS color.
    pub background_color: String,
    /// Glyph fill, any CSS color.
    pub glyph_color: String,
    /// Selection highlight color.
    pub selection_color: String,
    pub grid_style: GridStyle,
    /// Draw the selection box and its handles.
    pub show_handles: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            background_color: "#fafafa".to_string(),
            glyph_color: "#1f1f1f".to_string(),
            selection_color: "#3b82f6".to_string(),
            grid_style: GridStyle::None,
            show_handles: true,
        }
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_handles(mut self, show: bool) -> Self {
        self.show_handles = show;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the output for one frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;
}

/// Renders a frame as a standalone SVG document in screen space.
///
/// Each glyph body is emitted once in `<defs>` and placed with `<use>`.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    scene: String,
    zoom: f64,
}

fn matrix(affine: Affine) -> String {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last built frame.
    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn take_scene(&mut self) -> String {
        std::mem::take(&mut self.scene)
    }

    fn render_guides(&mut self, ctx: &RenderContext, transform: Affine) {
        if ctx.grid_style == GridStyle::None {
            return;
        }
        let metrics = ctx.canvas.metrics();
        let stroke = 1.0 / self.zoom;
        for item in ctx.canvas.document.layout(ctx.canvas.config.quadrat) {
            let cell = metrics.cell_rect(item.row, item.col);
            match ctx.grid_style {
                GridStyle::None => {}
                GridStyle::Cells => {
                    self.scene.push_str(&format!(
                        r##"<rect transform="{}" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#d4d4d4" stroke-width="{stroke}"/>"##,
                        matrix(transform),
                        cell.x0,
                        cell.y0,
                        cell.width(),
                        cell.height(),
                    ));
                }
                GridStyle::Dots => {
                    let c = cell.center();
                    self.scene.push_str(&format!(
                        r##"<circle transform="{}" cx="{}" cy="{}" r="{}" fill="#d4d4d4"/>"##,
                        matrix(transform),
                        c.x,
                        c.y,
                        2.0 * stroke,
                    ));
                }
            }
        }
    }

    fn render_selection_rect(&mut self, bounds: Rect, transform: Affine, color: &str) {
        let stroke_width = 1.0 / self.zoom;
        let dash_len = 4.0 / self.zoom;
        self.scene.push_str(&format!(
            r#"<rect class="selection" transform="{}" x="{}" y="{}" width="{}" height="{}" fill="{color}" fill-opacity="0.1" stroke="{color}" stroke-width="{stroke_width}" stroke-dasharray="{dash_len} {dash_len}"/>"#,
            matrix(transform),
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height(),
        ));
    }

    fn render_selection_handles(&mut self, ctx: &RenderContext, bounds: &SelectionBounds, transform: Affine) {
        let metrics = ctx.canvas.handle_metrics();
        let color = &ctx.selection_color;
        let half = metrics.size / 2.0;
        let stroke = 1.5 / self.zoom;
        let top = Point::new(bounds.center().x, bounds.y);

        for handle in selection_handles(bounds, &metrics) {
            let p = handle.position;
            match handle.kind {
                HandleKind::Rotate => {
                    self.scene.push_str(&format!(
                        r#"<line transform="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{stroke}"/><circle class="handle-rotate" transform="{}" cx="{}" cy="{}" r="{half}" fill="white" stroke="{color}" stroke-width="{stroke}"/>"#,
                        matrix(transform),
                        top.x,
                        top.y,
                        p.x,
                        p.y,
                        matrix(transform),
                        p.x,
                        p.y,
                    ));
                }
                HandleKind::Corner(_) | HandleKind::Edge(_) => {
                    self.scene.push_str(&format!(
                        r#"<rect class="handle" transform="{}" x="{}" y="{}" width="{}" height="{}" fill="white" stroke="{color}" stroke-width="{stroke}"/>"#,
                        matrix(transform),
                        p.x - half,
                        p.y - half,
                        metrics.size,
                        metrics.size,
                    ));
                }
            }
        }
    }
}

impl Renderer for SvgRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let Size { width, height } = ctx.viewport_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RendererError::InvalidViewport { width, height });
        }
        let camera = &ctx.canvas.camera;
        if !(camera.zoom.is_finite() && camera.zoom > 0.0) {
            return Err(RendererError::RenderFailed(format!("invalid zoom {}", camera.zoom)));
        }

        self.scene.clear();
        self.zoom = camera.zoom;
        let camera_transform = camera.transform();
        let items = ctx.canvas.render_items();

        self.scene.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {width} {height}" width="{width}" height="{height}"><rect width="100%" height="100%" fill="{}"/>"#,
            ctx.background_color,
        ));

        // each glyph once, in id order
        let glyphs: BTreeMap<&str, &str> = items
            .iter()
            .map(|item| (item.glyph.id.as_str(), item.glyph.body.as_str()))
            .collect();
        if !glyphs.is_empty() {
            self.scene.push_str("<defs>");
            for (id, body) in glyphs {
                self.scene.push_str(&format!(r#"<g id="{}">{body}</g>"#, glyph_def_id(id)));
            }
            self.scene.push_str("</defs>");
        }

        self.render_guides(ctx, camera_transform);

        self.scene.push_str(&format!(r#"<g fill="{}">"#, ctx.glyph_color));
        for item in &items {
            let transform = camera_transform * item.transform.to_affine();
            self.scene.push_str(&format!(
                r##"<use href="#{id}" xlink:href="#{id}" transform="{}" data-glyph-id="{}"{}/>"##,
                matrix(transform),
                escape_attr(&item.instance.glyph_id),
                if item.selected { r#" class="selected""# } else { "" },
                id = glyph_def_id(&item.glyph.id),
            ));
        }
        self.scene.push_str("</g>");

        if ctx.show_handles {
            if let Some(bounds) = ctx.canvas.selection_box() {
                self.render_selection_rect(bounds.rect(), camera_transform, &ctx.selection_color);
                self.render_selection_handles(ctx, &bounds, camera_transform);
            }
        }

        self.scene.push_str("</svg>");
        log::trace!("Built frame with {} instance(s)", items.len());
        Ok(())
    }
}

/// Render the whole canvas into a standalone SVG frame of `viewport` pixels.
pub fn render_canvas_svg(canvas: &Canvas, viewport: Size) -> RenderResult<String> {
    let mut renderer = SvgRenderer::new();
    renderer.build_scene(&RenderContext::new(canvas, viewport))?;
    Ok(renderer.take_scene())
}
