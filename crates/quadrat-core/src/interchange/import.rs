//! Clipboard import: self-describing groups, foreign SVG and glyph ids.

use super::attr;
use crate::catalog::GlyphCatalog;
use crate::clipboard::{ClipboardContents, SVG_DATA_URI_PREFIX};
use crate::config::ScaleBounds;
use crate::glyph::{GlyphDefinition, GlyphOrigin};
use crate::instance::{GlyphInstance, TransformState};
use crate::probe::BoundsProbe;
use crate::snap::wrap_degrees;
use crate::svg::{SvgError, SvgResult, extract_svg_fragment, find_svg, parse_svg_root, parse_xml};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::Vec2;
use roxmltree::Node;
use uuid::Uuid;

/// Display name given to glyphs created from foreign SVG.
pub const IMPORTED_GLYPH_NAME: &str = "Imported SVG";

/// Which representation produced pasted instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    /// Self-describing groups from an exported document.
    Svg,
    /// Whitespace-separated glyph ids.
    GlyphIds,
}

/// Result of interpreting clipboard contents.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// New instances for known glyphs, in document order.
    Instances {
        instances: Vec<GlyphInstance>,
        source: PasteSource,
    },
    /// A foreign SVG document turned into a new glyph definition.
    ForeignGlyph(GlyphDefinition),
    /// Nothing usable was found.
    NothingRecognized,
}

/// What one SVG payload contained.
enum SvgPayload {
    Tagged(Vec<GlyphInstance>),
    Foreign(GlyphDefinition),
}

/// Interpret clipboard contents.
///
/// HTML is tried first (inline SVG or an SVG data URI), then text that holds
/// SVG markup, then text as glyph ids. Self-describing groups whose glyphs
/// are all unknown fall through to the text path.
pub fn import_clipboard(
    contents: &ClipboardContents,
    catalog: &GlyphCatalog,
    bounds: &ScaleBounds,
    probe: &dyn BoundsProbe,
) -> ImportOutcome {
    let html_svg = contents.html.as_deref().and_then(svg_from_html);
    let text_svg = contents
        .text
        .as_deref()
        .and_then(extract_svg_fragment)
        .map(str::to_string);

    for markup in [html_svg, text_svg].into_iter().flatten() {
        match read_svg_payload(&markup, catalog, bounds, probe) {
            Ok(SvgPayload::Tagged(instances)) if !instances.is_empty() => {
                return ImportOutcome::Instances {
                    instances,
                    source: PasteSource::Svg,
                };
            }
            Ok(SvgPayload::Tagged(_)) => {
                log::debug!("Clipboard SVG groups reference no known glyphs");
            }
            Ok(SvgPayload::Foreign(glyph)) => return ImportOutcome::ForeignGlyph(glyph),
            Err(err) => log::debug!("Ignoring unreadable clipboard SVG: {err}"),
        }
    }

    if let Some(text) = contents.text.as_deref() {
        let ids = parse_glyph_ids(text, catalog);
        if !ids.is_empty() {
            return ImportOutcome::Instances {
                instances: ids.into_iter().map(GlyphInstance::new).collect(),
                source: PasteSource::GlyphIds,
            };
        }
    }

    ImportOutcome::NothingRecognized
}

/// Split text on whitespace and keep the tokens that are known glyph ids.
pub fn parse_glyph_ids(text: &str, catalog: &GlyphCatalog) -> Vec<String> {
    text.split_whitespace()
        .filter(|id| catalog.contains(id))
        .map(str::to_string)
        .collect()
}

/// SVG markup carried by an HTML clipboard payload, inline or as a data URI.
fn svg_from_html(html: &str) -> Option<String> {
    if let Some(fragment) = extract_svg_fragment(html) {
        return Some(fragment.to_string());
    }
    let start = html.find(SVG_DATA_URI_PREFIX)? + SVG_DATA_URI_PREFIX.len();
    let encoded = &html[start..];
    let end = encoded
        .find(|c: char| matches!(c, '"' | '\'' | ')' | '>') || c.is_whitespace())
        .unwrap_or(encoded.len());
    let bytes = STANDARD
        .decode(&encoded[..end])
        .inspect_err(|err| log::debug!("Bad SVG data URI in clipboard HTML: {err}"))
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn read_svg_payload(
    markup: &str,
    catalog: &GlyphCatalog,
    bounds: &ScaleBounds,
    probe: &dyn BoundsProbe,
) -> SvgResult<SvgPayload> {
    let doc = parse_xml(markup)?;
    let has_tagged = doc
        .descendants()
        .any(|n| n.is_element() && n.has_attribute(attr::GLYPH_ID));
    if has_tagged {
        let instances = parse_tagged_groups(markup, bounds)?
            .into_iter()
            .filter(|instance| catalog.contains(&instance.glyph_id))
            .collect();
        return Ok(SvgPayload::Tagged(instances));
    }
    if find_svg(&doc).is_none() {
        return Err(SvgError::MissingRoot);
    }
    Ok(SvgPayload::Foreign(import_foreign_svg(markup, probe)?))
}

/// Parse every `<g data-glyph-id>` group into a new instance.
///
/// Groups with an empty id are skipped. Unknown glyph ids are kept; callers
/// filter against their catalog.
pub fn parse_tagged_groups(markup: &str, bounds: &ScaleBounds) -> SvgResult<Vec<GlyphInstance>> {
    let doc = parse_xml(markup)?;
    let instances = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "g")
        .filter_map(|group| {
            let glyph_id = group.attribute(attr::GLYPH_ID)?.trim();
            if glyph_id.is_empty() {
                return None;
            }
            Some(GlyphInstance::with_transform(glyph_id, read_state(&group, bounds)))
        })
        .collect();
    Ok(instances)
}

fn read_state(group: &Node<'_, '_>, bounds: &ScaleBounds) -> TransformState {
    let number = |name: &str| {
        group
            .attribute(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    let flag = |name: &str| {
        group
            .attribute(name)
            .is_some_and(|v| matches!(v.trim(), "true" | "1"))
    };

    let scale = bounds.clamp(number(attr::SCALE).unwrap_or(1.0));
    TransformState {
        rotate: wrap_degrees(number(attr::ROTATE).unwrap_or(0.0)),
        flip_x: flag(attr::FLIP_X),
        flip_y: flag(attr::FLIP_Y),
        scale,
        scale_x: number(attr::SCALE_X).map_or(scale, |v| bounds.clamp(v)),
        scale_y: number(attr::SCALE_Y).map_or(scale, |v| bounds.clamp(v)),
        offset: Vec2::new(
            number(attr::OFFSET_X).unwrap_or(0.0),
            number(attr::OFFSET_Y).unwrap_or(0.0),
        ),
    }
}

/// Turn a foreign SVG document into an ad-hoc glyph definition.
fn import_foreign_svg(markup: &str, probe: &dyn BoundsProbe) -> SvgResult<GlyphDefinition> {
    let root = parse_svg_root(markup)?;
    let id = format!("IMPORTED_{}", Uuid::new_v4().simple());
    let document = root.to_document();
    let glyph = GlyphDefinition::new(
        id,
        IMPORTED_GLYPH_NAME,
        root.view_box,
        root.body,
        GlyphOrigin::Imported,
    );
    log::info!("Imported foreign SVG as glyph {} ({})", glyph.id, glyph.view_box);
    Ok(match probe.content_bounds(&document) {
        Some(content) => glyph.with_content_bounds(content),
        None => glyph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::svg_data_uri;
    use crate::glyph::{QUADRAT, ViewBox};
    use crate::probe::NullProbe;
    use kurbo::Rect;

    fn catalog() -> GlyphCatalog {
        ["A1", "D36", "G17"]
            .into_iter()
            .map(|id| GlyphDefinition::new(id, id, ViewBox::default(), "", GlyphOrigin::Builtin))
            .collect()
    }

    fn import(contents: ClipboardContents) -> ImportOutcome {
        import_clipboard(&contents, &catalog(), &ScaleBounds::default(), &NullProbe)
    }

    fn text(value: &str) -> ClipboardContents {
        ClipboardContents { html: None, text: Some(value.to_string()) }
    }

    fn ids(outcome: &ImportOutcome) -> Vec<&str> {
        match outcome {
            ImportOutcome::Instances { instances, .. } => instances.iter().map(|i| i.glyph_id.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_plain_text_ids_filtered() {
        let outcome = import(text("A1 ZZZ\n\tG17  "));
        assert_eq!(ids(&outcome), ["A1", "G17"]);
        assert!(matches!(outcome, ImportOutcome::Instances { source: PasteSource::GlyphIds, .. }));
    }

    #[test]
    fn test_unrecognized_text() {
        assert_eq!(import(text("hello world")), ImportOutcome::NothingRecognized);
        assert_eq!(import(ClipboardContents::default()), ImportOutcome::NothingRecognized);
    }

    #[test]
    fn test_tagged_groups_from_inline_html() {
        let html = r#"<html><body><svg viewBox="0 0 10 10"><g data-glyph-id="G17" data-rotate="450" data-flip-x="true" data-scale="1.2" data-offset-x="-450.5"/><g data-glyph-id="ZZZ"/><g data-glyph-id=" "/></svg></body></html>"#;
        let outcome = import(ClipboardContents { html: Some(html.into()), text: Some("A1".into()) });
        let ImportOutcome::Instances { instances, source } = outcome else {
            panic!("expected instances");
        };
        assert_eq!(source, PasteSource::Svg);
        assert_eq!(instances.len(), 1);
        let state = instances[0].transform;
        assert_eq!(state.rotate, 90.0);
        assert!(state.flip_x);
        assert!(!state.flip_y);
        assert_eq!((state.scale, state.scale_x, state.scale_y), (1.2, 1.2, 1.2));
        assert_eq!(state.offset, Vec2::new(-450.5, 0.0));
    }

    #[test]
    fn test_tagged_groups_from_data_uri() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g data-glyph-id="A1" data-scale-y="0.7"/></svg>"#;
        let html = format!(r#"<!doctype html><html><body><img src="{}" alt="" /></body></html>"#, svg_data_uri(svg));
        let outcome = import(ClipboardContents { html: Some(html), text: None });
        let ImportOutcome::Instances { instances, .. } = outcome else {
            panic!("expected instances");
        };
        assert_eq!(instances[0].transform.scale_y, 0.7);
        assert_eq!(instances[0].transform.scale_x, 1.0);
    }

    #[test]
    fn test_unknown_tagged_groups_fall_through_to_text() {
        let html = r#"<svg><g data-glyph-id="ZZZ"/></svg>"#;
        let outcome = import(ClipboardContents { html: Some(html.into()), text: Some("D36".into()) });
        assert_eq!(ids(&outcome), ["D36"]);
    }

    #[test]
    fn test_svg_in_text_fallback() {
        let svg = r#"<svg><g data-glyph-id="G17" data-rotate="180"/></svg>"#;
        let outcome = import(text(svg));
        assert!(matches!(outcome, ImportOutcome::Instances { source: PasteSource::Svg, .. }));
    }

    #[test]
    fn test_scale_attributes_clamped() {
        let html = r#"<svg><g data-glyph-id="A1" data-scale="9" data-scale-x="0.1" data-scale-y="NaN"/></svg>"#;
        let outcome = import(ClipboardContents { html: Some(html.into()), text: None });
        let ImportOutcome::Instances { instances, .. } = outcome else {
            panic!("expected instances");
        };
        let state = instances[0].transform;
        assert_eq!((state.scale, state.scale_x, state.scale_y), (1.8, 0.5, 1.8));
    }

    #[test]
    fn test_foreign_svg_becomes_glyph() {
        struct Probe;
        impl BoundsProbe for Probe {
            fn content_bounds(&self, markup: &str) -> Option<Rect> {
                markup.contains("<circle").then(|| Rect::new(10.0, 10.0, 50.0, 30.0))
            }
        }
        let html = r#"<meta charset="utf-8"><svg xmlns="http://www.w3.org/2000/svg" width="100" height="40"><circle r="3"/></svg>"#;
        let contents = ClipboardContents { html: Some(html.into()), text: None };
        let outcome = import_clipboard(&contents, &catalog(), &ScaleBounds::default(), &Probe);
        let ImportOutcome::ForeignGlyph(glyph) = outcome else {
            panic!("expected foreign glyph");
        };
        assert!(glyph.id.starts_with("IMPORTED_"));
        assert_eq!(glyph.name, IMPORTED_GLYPH_NAME);
        assert_eq!(glyph.origin, GlyphOrigin::Imported);
        assert_eq!((glyph.width(), glyph.height()), (100.0, 40.0));
        assert_eq!(glyph.content, Rect::new(10.0, 10.0, 50.0, 30.0));
    }

    #[test]
    fn test_foreign_svg_without_geometry_uses_default_square() {
        let outcome = import(ClipboardContents { html: Some("<svg><rect/></svg>".into()), text: None });
        let ImportOutcome::ForeignGlyph(glyph) = outcome else {
            panic!("expected foreign glyph");
        };
        assert_eq!(glyph.view_box, ViewBox::square(QUADRAT));
    }

    #[test]
    fn test_malformed_html_svg_falls_back_to_text() {
        let outcome = import(ClipboardContents { html: Some("<svg <<".into()), text: Some("A1".into()) });
        assert_eq!(ids(&outcome), ["A1"]);
    }

    /// Reports a fixed box for any markup that parses as XML.
    struct WellFormed;

    impl BoundsProbe for WellFormed {
        fn content_bounds(&self, markup: &str) -> Option<Rect> {
            parse_xml(markup).ok().map(|_| Rect::new(1.0, 1.0, 9.0, 9.0))
        }
    }

    const INKSCAPE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" viewBox="0 0 10 10"><sodipodi:namedview id="base"/><g inkscape:label="Layer 1" inkscape:groupmode="layer"><path d="M1 1h8v8z"/></g></svg>"#;
    const DOCTYPE_SVG: &str = r#"<?xml version="1.0"?><!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><circle cx="5" cy="5" r="4"/></svg>"#;
    const SIZED_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10px" height="10px"><rect id="r" width="8" height="8"/></svg>"#;

    #[test]
    fn test_foreign_glyph_survives_export_and_reimport() {
        for source in [INKSCAPE_SVG, DOCTYPE_SVG, SIZED_SVG] {
            let contents = ClipboardContents { html: None, text: Some(source.to_string()) };
            let outcome = import_clipboard(&contents, &catalog(), &ScaleBounds::default(), &WellFormed);
            let ImportOutcome::ForeignGlyph(glyph) = outcome else {
                panic!("expected foreign glyph for {source}");
            };
            assert_eq!(glyph.content, Rect::new(1.0, 1.0, 9.0, 9.0), "bounds document malformed for {source}");
            assert!(parse_xml(&glyph.to_svg()).is_ok());

            let id = glyph.id.clone();
            let mut catalog = catalog();
            catalog.insert(glyph);
            let state = TransformState { rotate: 90.0, flip_x: true, ..TransformState::default() };
            let rows = vec![crate::layout::Row {
                instances: vec![GlyphInstance::with_transform(id.as_str(), state), GlyphInstance::new(id.as_str())],
            }];
            let export = crate::interchange::export_svg(&rows, |_| true, &catalog, QUADRAT, 1.0).unwrap();
            assert!(parse_xml(&export.svg).is_ok(), "export not well-formed for {source}");

            let pasted = ClipboardContents { html: None, text: Some(export.svg) };
            let ImportOutcome::Instances { instances, source: PasteSource::Svg } =
                import_clipboard(&pasted, &catalog, &ScaleBounds::default(), &WellFormed)
            else {
                panic!("expected instances for {source}");
            };
            assert_eq!(instances.len(), 2);
            assert!(instances.iter().all(|i| i.glyph_id == id));
            assert_eq!(instances[0].transform, state);
            assert_eq!(instances[1].transform, TransformState::default());
        }
    }

    #[test]
    fn test_first_of_sibling_svgs_imported() {
        let html = r#"<div><svg viewBox="0 0 10 10"><g data-glyph-id="G17" data-rotate="270"/></svg><svg viewBox="0 0 10 10"><g data-glyph-id="A1"/></svg></div>"#;
        let outcome = import(ClipboardContents { html: Some(html.into()), text: None });
        let ImportOutcome::Instances { instances, source } = outcome else {
            panic!("expected instances");
        };
        assert_eq!(source, PasteSource::Svg);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].glyph_id, "G17");
        assert_eq!(instances[0].transform.rotate, 270.0);
    }
}
