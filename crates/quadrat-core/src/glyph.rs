//! Glyph definitions: immutable catalog entries describing reusable shapes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge length of the canonical glyph square, in glyph-intrinsic units.
pub const QUADRAT: f64 = 1800.0;

/// Where a glyph definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphOrigin {
    /// Loaded from the glyph catalog.
    #[default]
    Builtin,
    /// Created from a foreign SVG document pasted into the canvas.
    Imported,
}

/// An SVG view box: origin plus size in the glyph's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// A square view box anchored at the origin.
    pub fn square(size: f64) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: size,
            height: size,
        }
    }

    /// Parse a `viewBox` attribute value.
    ///
    /// Accepts four numbers separated by whitespace and/or commas. Returns
    /// `None` unless all four are finite and the size is positive.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let [min_x, min_y, width, height] = parts.as_slice() else {
            return None;
        };
        let view_box = Self {
            min_x: *min_x,
            min_y: *min_y,
            width: *width,
            height: *height,
        };
        view_box.is_valid().then_some(view_box)
    }

    /// Check that every component is finite and the size is positive.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// The view box as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.min_x,
            self.min_y,
            self.min_x + self.width,
            self.min_y + self.height,
        )
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::square(QUADRAT)
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.min_x, self.min_y, self.width, self.height
        )
    }
}

/// A catalog entry describing a reusable symbolic shape.
///
/// Definitions are read-only once built. The constructor normalises the
/// intrinsic size so the fit-scale division is always defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphDefinition {
    /// Stable identifier (e.g. `G17`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Declared view box of the source document.
    pub view_box: ViewBox,
    /// Visible content bounds in view-box coordinates.
    pub content: Rect,
    /// Opaque renderable body (inner markup of the source `<svg>`).
    pub body: String,
    /// Where this definition came from.
    #[serde(default)]
    pub origin: GlyphOrigin,
}

impl GlyphDefinition {
    /// Create a definition whose content bounds equal its view box.
    ///
    /// A zero or non-finite intrinsic size falls back to the default square
    /// footprint.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        view_box: ViewBox,
        body: impl Into<String>,
        origin: GlyphOrigin,
    ) -> Self {
        let view_box = normalize_view_box(view_box);
        Self {
            id: id.into(),
            name: name.into(),
            view_box,
            content: view_box.rect(),
            body: body.into(),
            origin,
        }
    }

    /// Replace the content bounds with a measured rectangle.
    ///
    /// Measurements with non-finite coordinates or no area are ignored.
    pub fn with_content_bounds(mut self, content: Rect) -> Self {
        let finite = [content.x0, content.y0, content.x1, content.y1]
            .iter()
            .all(|v| v.is_finite());
        if finite && content.width() > 0.0 && content.height() > 0.0 {
            self.content = content;
        } else {
            log::debug!("ignoring degenerate content bounds for glyph {}", self.id);
        }
        self
    }

    /// Intrinsic width.
    pub fn width(&self) -> f64 {
        self.view_box.width
    }

    /// Intrinsic height.
    pub fn height(&self) -> f64 {
        self.view_box.height
    }

    /// Largest intrinsic dimension; always positive.
    pub fn footprint(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Center of the visible content, in view-box coordinates.
    pub fn content_center(&self) -> Point {
        self.content.center()
    }

    /// Scale factor mapping this glyph onto a square of edge `target`.
    pub fn fit_scale(&self, target: f64) -> f64 {
        target / self.footprint()
    }

    /// Standalone SVG document for this glyph alone.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{vb}" width="{w}" height="{h}">{body}</svg>"#,
            vb = self.view_box,
            w = self.view_box.width,
            h = self.view_box.height,
            body = self.body,
        )
    }
}

fn normalize_view_box(view_box: ViewBox) -> ViewBox {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let origin = |v: f64| if v.is_finite() { v } else { 0.0 };
    let width = clean(view_box.width);
    let height = clean(view_box.height);
    if width == 0.0 && height == 0.0 {
        return ViewBox {
            min_x: origin(view_box.min_x),
            min_y: origin(view_box.min_y),
            width: QUADRAT,
            height: QUADRAT,
        };
    }
    ViewBox {
        min_x: origin(view_box.min_x),
        min_y: origin(view_box.min_y),
        width,
        height,
    }
}

/// Catalog entry descriptor: where a glyph's markup can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphSource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

impl GlyphSource {
    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
