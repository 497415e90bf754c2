//! Content bounds measurement for opaque SVG markup.

use kurbo::Rect;

/// Measures the visible content of an SVG document.
///
/// Declared view boxes often include padding or are simply wrong, so
/// imported and catalog glyphs are centered on their measured content.
pub trait BoundsProbe {
    /// Bounding box of everything the document paints, in view-box units.
    ///
    /// Returns `None` when the markup cannot be rendered or paints nothing.
    fn content_bounds(&self, markup: &str) -> Option<Rect>;
}

/// A probe that never measures; glyphs keep their declared view box.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl BoundsProbe for NullProbe {
    fn content_bounds(&self, _markup: &str) -> Option<Rect> {
        None
    }
}

impl<P: BoundsProbe + ?Sized> BoundsProbe for &P {
    fn content_bounds(&self, markup: &str) -> Option<Rect> {
        (**self).content_bounds(markup)
    }
}
