//! Self-describing SVG export.

use super::attr;
use crate::catalog::GlyphCatalog;
use crate::instance::GlyphInstance;
use crate::layout::{GridMetrics, LayoutItem, Row, layout_rows};
use crate::svg::{escape_attr, glyph_def_id};
use crate::transform::compose;
use std::collections::HashMap;

/// An exported document plus its plain-text fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// Standalone SVG markup.
    pub svg: String,
    /// Space-separated glyph ids, in export order.
    pub text: String,
    /// Number of exported instances.
    pub count: usize,
    /// Viewport width and height in canvas units.
    pub width: f64,
    pub height: f64,
}

/// Export the instances accepted by `include` as a self-describing SVG.
///
/// The viewport is the union of the included cells, shifted to the origin,
/// and spacing uses the cell step of the whole scene so the export matches
/// what is on screen. Each glyph body is defined once under `<defs>` and every
/// instance group references it with `<use>`. Instances whose glyph is
/// unknown are skipped. Returns `None` when nothing renderable is included.
pub fn export_svg(
    rows: &[Row],
    include: impl Fn(&GlyphInstance) -> bool,
    catalog: &GlyphCatalog,
    quadrat: f64,
    export_scale: f64,
) -> Option<ExportDocument> {
    let metrics = GridMetrics::for_rows(rows, quadrat);
    let items: Vec<LayoutItem<'_>> = layout_rows(rows, metrics.cell_step)
        .into_iter()
        .filter(|item| include(item.instance))
        .filter(|item| {
            let known = catalog.contains(&item.instance.glyph_id);
            if !known {
                log::debug!("Skipping export of missing glyph {}", item.instance.glyph_id);
            }
            known
        })
        .collect();

    let min_row = items.iter().map(|item| item.row).min()?;
    let max_row = items.iter().map(|item| item.row).max()?;
    let min_col = items.iter().map(|item| item.col).min()?;
    let max_col = items.iter().map(|item| item.col).max()?;
    let width = (max_col - min_col + 1) as f64 * metrics.cell_step;
    let height = (max_row - min_row + 1) as f64 * metrics.cell_step;
    let scale = if export_scale.is_finite() && export_scale > 0.0 { export_scale } else { 1.0 };

    let mut defs = String::new();
    let mut groups = String::new();
    let mut def_ids: HashMap<&str, String> = HashMap::new();
    let mut ids = Vec::with_capacity(items.len());

    for item in &items {
        let Some(glyph) = catalog.get(&item.instance.glyph_id) else {
            continue;
        };
        let def_id = match def_ids.get(glyph.id.as_str()) {
            Some(def_id) => def_id.clone(),
            None => {
                let def_id = unique_def_id(&glyph.id, def_ids.len(), &def_ids);
                defs.push_str(&format!(r#"<g id="{def_id}">{}</g>"#, glyph.body));
                def_ids.insert(glyph.id.as_str(), def_id.clone());
                def_id
            }
        };
        let shifted = LayoutItem {
            row: item.row - min_row,
            col: item.col - min_col,
            x: (item.col - min_col) as f64 * metrics.cell_step,
            y: (item.row - min_row) as f64 * metrics.cell_step,
            ..*item
        };
        let chain = compose(&shifted, glyph, &metrics, None);
        groups.push_str(&group_markup(item.instance, &chain.to_string(), &def_id));
        ids.push(item.instance.glyph_id.as_str());
    }

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {width} {height}" width="{}" height="{}"><defs>{defs}</defs>{groups}</svg>"#,
        width * scale,
        height * scale,
    );

    Some(ExportDocument {
        svg,
        text: ids.join(" "),
        count: ids.len(),
        width,
        height,
    })
}

/// Sanitized ids can collide ("a.b" and "a_b"); later glyphs get a suffix.
fn unique_def_id(glyph_id: &str, index: usize, taken: &HashMap<&str, String>) -> String {
    let def_id = glyph_def_id(glyph_id);
    if taken.values().any(|existing| *existing == def_id) {
        format!("{def_id}-{index}")
    } else {
        def_id
    }
}

fn group_markup(instance: &GlyphInstance, transform: &str, def_id: &str) -> String {
    let state = &instance.transform;
    format!(
        r##"<g transform="{transform}" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}" {}="{}"><use href="#{def_id}" xlink:href="#{def_id}"/></g>"##,
        attr::GLYPH_ID,
        escape_attr(&instance.glyph_id),
        attr::ROTATE,
        state.rotate,
        attr::FLIP_X,
        state.flip_x,
        attr::FLIP_Y,
        state.flip_y,
        attr::SCALE,
        state.scale,
        attr::SCALE_X,
        state.scale_x,
        attr::SCALE_Y,
        state.scale_y,
        attr::OFFSET_X,
        state.offset.x,
        attr::OFFSET_Y,
        state.offset.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleBounds;
    use crate::glyph::{GlyphDefinition, GlyphOrigin, QUADRAT, ViewBox};
    use crate::interchange::parse_tagged_groups;
    use crate::instance::TransformState;

    fn catalog() -> GlyphCatalog {
        ["A1", "G17"]
            .into_iter()
            .map(|id| {
                GlyphDefinition::new(id, id, ViewBox::square(QUADRAT), "<path d=\"M0 0h10\"/>", GlyphOrigin::Builtin)
            })
            .collect()
    }

    #[test]
    fn test_export_carries_state_attributes() {
        let state = TransformState { rotate: 180.0, flip_y: true, ..TransformState::default() };
        let rows = vec![Row { instances: vec![GlyphInstance::with_transform("G17", state)] }];
        let doc = export_svg(&rows, |_| true, &catalog(), QUADRAT, 1.0).unwrap();

        assert!(doc.svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(doc.svg.contains(r#"viewBox="0 0 1800 1800" width="1800" height="1800""#));
        assert!(doc.svg.contains(r#"data-glyph-id="G17""#));
        assert!(doc.svg.contains(r#"data-rotate="180""#));
        assert!(doc.svg.contains(r#"data-flip-x="false" data-flip-y="true""#));
        assert!(doc.svg.contains(r#"data-offset-x="0" data-offset-y="0""#));
        assert!(doc.svg.contains(r#"<defs><g id="glyph-G17"><path d="M0 0h10"/></g></defs>"#));
        assert!(doc.svg.contains(r##"<use href="#glyph-G17" xlink:href="#glyph-G17"/></g></svg>"##));
        assert_eq!(doc.text, "G17");
    }

    #[test]
    fn test_export_viewport_is_union_of_cells() {
        let rows = vec![
            Row { instances: vec![GlyphInstance::new("A1"), GlyphInstance::new("A1"), GlyphInstance::new("A1")] },
            Row { instances: vec![GlyphInstance::new("G17"), GlyphInstance::new("G17")] },
        ];
        let wanted = [rows[0].instances[2].id, rows[1].instances[1].id];
        let doc = export_svg(&rows, |i| wanted.contains(&i.id), &catalog(), QUADRAT, 0.5).unwrap();

        // columns 1..=2, rows 0..=1
        assert_eq!((doc.width, doc.height), (3600.0, 3600.0));
        assert!(doc.svg.contains(r#"viewBox="0 0 3600 3600" width="1800" height="1800""#));
        // column 2 shifts to column 1
        assert!(doc.svg.contains(r#"translate(2700 900)"#));
        assert!(doc.svg.contains(r#"translate(900 2700)"#));
        assert_eq!(doc.text, "A1 G17");
    }

    #[test]
    fn test_export_skips_missing_glyphs() {
        let rows = vec![Row {
            instances: vec![GlyphInstance::new("ZZZ"), GlyphInstance::new("A1")],
        }];
        let doc = export_svg(&rows, |_| true, &catalog(), QUADRAT, 1.0).unwrap();
        assert_eq!(doc.count, 1);
        assert_eq!(doc.text, "A1");
        assert!(!doc.svg.contains("ZZZ"));
        // the missing glyph still occupies column 0, so the viewport starts at column 1
        assert_eq!(doc.width, 1800.0);

        let only_missing = vec![Row { instances: vec![GlyphInstance::new("ZZZ")] }];
        assert!(export_svg(&only_missing, |_| true, &catalog(), QUADRAT, 1.0).is_none());
    }

    #[test]
    fn test_export_escapes_glyph_id() {
        let mut catalog = catalog();
        catalog.insert(GlyphDefinition::new("a\"b", "q", ViewBox::default(), "", GlyphOrigin::Builtin));
        let rows = vec![Row { instances: vec![GlyphInstance::new("a\"b")] }];
        let doc = export_svg(&rows, |_| true, &catalog, QUADRAT, 1.0).unwrap();
        assert!(doc.svg.contains(r#"data-glyph-id="a&quot;b""#));
    }

    #[test]
    fn test_repeated_glyph_body_defined_once() {
        let mut catalog = catalog();
        catalog.insert(GlyphDefinition::new(
            "A1",
            "A1",
            ViewBox::square(QUADRAT),
            r#"<path id="stroke" d="M0 0h10"/>"#,
            GlyphOrigin::Builtin,
        ));
        let rows = vec![Row {
            instances: vec![GlyphInstance::new("A1"), GlyphInstance::new("G17"), GlyphInstance::new("A1")],
        }];
        let doc = export_svg(&rows, |_| true, &catalog, QUADRAT, 1.0).unwrap();

        assert_eq!(doc.svg.matches(r#"id="stroke""#).count(), 1);
        assert_eq!(doc.svg.matches(r#"<g id="glyph-A1">"#).count(), 1);
        assert_eq!(doc.svg.matches(r##"<use href="#glyph-A1""##).count(), 2);
        assert_eq!(doc.svg.matches("<use ").count(), 3);
        assert_eq!(doc.text, "A1 G17 A1");

        let reparsed = parse_tagged_groups(&doc.svg, &ScaleBounds::default()).unwrap();
        let ids: Vec<&str> = reparsed.iter().map(|i| i.glyph_id.as_str()).collect();
        assert_eq!(ids, ["A1", "G17", "A1"]);
    }

    #[test]
    fn test_colliding_def_ids_stay_distinct() {
        let mut catalog = catalog();
        catalog.insert(GlyphDefinition::new("a.b", "q", ViewBox::default(), "<rect/>", GlyphOrigin::Builtin));
        catalog.insert(GlyphDefinition::new("a_b", "q", ViewBox::default(), "<circle/>", GlyphOrigin::Builtin));
        let rows = vec![Row { instances: vec![GlyphInstance::new("a.b"), GlyphInstance::new("a_b")] }];
        let doc = export_svg(&rows, |_| true, &catalog, QUADRAT, 1.0).unwrap();
        assert!(doc.svg.contains(r#"<g id="glyph-a_b"><rect/></g>"#));
        assert!(doc.svg.contains(r#"<g id="glyph-a_b-1"><circle/></g>"#));
        assert!(doc.svg.contains(r##"<use href="#glyph-a_b-1""##));
    }
}
