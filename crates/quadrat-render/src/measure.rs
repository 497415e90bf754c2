//! Screen-space measurement of painted instances.

use kurbo::Point;
use quadrat_core::{Canvas, InstanceId, Measurement};

/// Screen corners of an instance's measured content box as currently painted.
///
/// Returns `None` for unknown instances or instances whose glyph is missing.
pub fn measure_instance(canvas: &Canvas, id: InstanceId) -> Option<Measurement> {
    let camera = canvas.camera.transform();
    canvas
        .render_items()
        .into_iter()
        .find(|item| item.instance.id == id)
        .map(|item| {
            let to_screen = camera * item.transform.to_affine();
            let c = item.glyph.content;
            Measurement {
                instance: id,
                corners: [
                    to_screen * Point::new(c.x0, c.y0),
                    to_screen * Point::new(c.x1, c.y0),
                    to_screen * Point::new(c.x1, c.y1),
                    to_screen * Point::new(c.x0, c.y1),
                ],
            }
        })
}

/// Measure the selected instance and hand the result to the canvas.
///
/// Only a single selection is measured; groups use estimated bounds.
pub fn refresh_measurement(canvas: &mut Canvas) -> bool {
    let [id] = canvas.selection() else {
        return false;
    };
    match measure_instance(canvas, *id) {
        Some(measurement) => {
            canvas.set_measurement(measurement);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use quadrat_core::{EditorConfig, GlyphCatalog, GlyphDefinition, GlyphOrigin, QUADRAT, ViewBox};

    fn canvas() -> Canvas {
        let glyph = GlyphDefinition::new("A1", "A1", ViewBox::square(QUADRAT), "<path d=\"M0 0h10\"/>", GlyphOrigin::Builtin)
            .with_content_bounds(Rect::new(450.0, 0.0, 1350.0, 1800.0));
        let catalog: GlyphCatalog = [glyph].into_iter().collect();
        let mut canvas = Canvas::new(catalog, EditorConfig::default());
        canvas.camera.zoom = 0.1;
        canvas
    }

    #[test]
    fn test_measure_untransformed_instance() {
        let mut canvas = canvas();
        let id = canvas.insert_glyph("A1").unwrap();
        let m = measure_instance(&canvas, id).unwrap();
        // content is 900x1800, fitted to the quadrat and centred in the cell
        assert!((m.corners[0].x - 45.0).abs() < 1e-9);
        assert!((m.corners[0].y - 0.0).abs() < 1e-9);
        assert!((m.corners[2].x - 135.0).abs() < 1e-9);
        assert!((m.corners[2].y - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_measurement_single_selection_only() {
        let mut canvas = canvas();
        let a = canvas.insert_glyph("A1").unwrap();
        let b = canvas.insert_glyph("A1").unwrap();
        canvas.select(a);
        assert!(refresh_measurement(&mut canvas));
        assert_eq!(canvas.measurement().unwrap().instance, a);

        canvas.toggle_selection(b);
        assert!(!refresh_measurement(&mut canvas));
    }

    #[test]
    fn test_measured_bounds_use_content_box() {
        let mut canvas = canvas();
        let id = canvas.insert_glyph("A1").unwrap();
        canvas.select(id);
        refresh_measurement(&mut canvas);
        let bounds = canvas.selection_bounds().unwrap();
        assert!((bounds.width - 900.0).abs() < 1e-6);
        assert!((bounds.height - 1800.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_instance() {
        let canvas = canvas();
        assert!(measure_instance(&canvas, uuid_like()).is_none());
    }

    fn uuid_like() -> InstanceId {
        quadrat_core::GlyphInstance::new("A1").id
    }
}
