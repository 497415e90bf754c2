//! Content bounds measured by building a `usvg` tree.

use kurbo::Rect;
use quadrat_core::BoundsProbe;
use quadrat_core::svg::parse_svg_root;

/// Measures painted content with `usvg`, including stroke extents.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsvgProbe;

impl UsvgProbe {
    pub fn new() -> Self {
        Self
    }
}

impl BoundsProbe for UsvgProbe {
    fn content_bounds(&self, markup: &str) -> Option<Rect> {
        let view_box = parse_svg_root(markup).ok()?.view_box;
        let opts = usvg::Options::default();
        let tree = match usvg::Tree::from_str(markup, &opts) {
            Ok(tree) => tree,
            Err(err) => {
                log::debug!("usvg could not parse markup for measurement: {err}");
                return None;
            }
        };
        let root = tree.root();
        if !root.has_children() {
            return None;
        }

        // usvg reports bounds in document size units; map back into the view box.
        let bbox = root.abs_stroke_bounding_box();
        let size = tree.size();
        let sx = view_box.width / f64::from(size.width());
        let sy = view_box.height / f64::from(size.height());
        let rect = Rect::new(
            view_box.min_x + f64::from(bbox.left()) * sx,
            view_box.min_y + f64::from(bbox.top()) * sy,
            view_box.min_x + f64::from(bbox.right()) * sx,
            view_box.min_y + f64::from(bbox.bottom()) * sy,
        );
        let finite = [rect.x0, rect.y0, rect.x1, rect.y1].iter().all(|v| v.is_finite());
        (finite && rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
    }
}
