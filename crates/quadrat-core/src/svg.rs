//! Minimal SVG document handling on top of `roxmltree`.
//!
//! Glyph bodies are opaque: we only read the root element, its declared
//! geometry and the raw inner markup.

use crate::glyph::{QUADRAT, ViewBox};
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

/// Errors from reading SVG markup.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("No <svg> root element found")]
    MissingRoot,

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Result type for SVG operations.
pub type SvgResult<T> = Result<T, SvgError>;

/// How the view box of a document was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewBoxSource {
    /// From a valid `viewBox` attribute.
    Declared,
    /// From `width`/`height` attributes.
    Dimensions,
    /// Neither was usable; the default square was substituted.
    Default,
}

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// The root of a parsed SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgRoot {
    pub view_box: ViewBox,
    pub view_box_source: ViewBoxSource,
    /// Inner markup of the root element.
    ///
    /// Verbatim, except that prefixed namespaces declared on the root (or its
    /// ancestors) other than `xlink` are redeclared on a wrapping `<g>`, so
    /// the body stays well-formed under any `<svg>` that declares only the
    /// SVG and XLink namespaces.
    pub body: String,
    /// The `(prefix, uri)` pairs carried onto the body wrapper.
    pub namespaces: Vec<(String, String)>,
}

impl SvgRoot {
    /// Rebuild a standalone document from the normalised view box and body.
    pub fn to_document(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{}">{}</svg>"#,
            self.view_box, self.body
        )
    }
}

/// Parse markup into a `roxmltree` document, tolerating a DOCTYPE.
pub fn parse_xml(markup: &str) -> SvgResult<Document<'_>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Ok(Document::parse_with_options(markup, options)?)
}

/// Find the first `<svg>` element in a document.
pub fn find_svg<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")
}

/// Parse a standalone SVG document.
pub fn parse_svg_root(markup: &str) -> SvgResult<SvgRoot> {
    let doc = parse_xml(markup)?;
    let svg = find_svg(&doc).ok_or(SvgError::MissingRoot)?;
    let (view_box, view_box_source) = resolve_view_box(&svg);
    if view_box_source != ViewBoxSource::Declared {
        log::debug!("SVG view box recovered from {view_box_source:?}: {view_box}");
    }
    let namespaces = prefixed_namespaces(&svg);
    Ok(SvgRoot {
        view_box,
        view_box_source,
        body: scope_body(inner_markup(markup, &svg), &namespaces),
        namespaces,
    })
}

/// Prefixed namespaces in scope on `node` that a rebuilt root lacks.
fn prefixed_namespaces(node: &Node<'_, '_>) -> Vec<(String, String)> {
    node.namespaces()
        .filter_map(|ns| {
            let prefix = ns.name()?;
            let builtin = prefix == "xml" || (prefix == "xlink" && ns.uri() == XLINK_NS);
            (!builtin).then(|| (prefix.to_string(), ns.uri().to_string()))
        })
        .collect()
}

fn scope_body(inner: &str, namespaces: &[(String, String)]) -> String {
    if namespaces.is_empty() || inner.trim().is_empty() {
        return inner.to_string();
    }
    let declarations: String = namespaces
        .iter()
        .map(|(prefix, uri)| format!(r#" xmlns:{prefix}="{}""#, escape_attr(uri)))
        .collect();
    format!("<g{declarations}>{inner}</g>")
}

/// Resolve the view box of an `<svg>` element.
///
/// Prefers a valid `viewBox`; then `width`/`height` (units ignored); then the
/// default square.
pub fn resolve_view_box(svg: &Node<'_, '_>) -> (ViewBox, ViewBoxSource) {
    if let Some(view_box) = svg.attribute("viewBox").and_then(ViewBox::parse) {
        return (view_box, ViewBoxSource::Declared);
    }
    let width = svg.attribute("width").and_then(parse_length);
    let height = svg.attribute("height").and_then(parse_length);
    match (width, height) {
        (Some(w), Some(h)) => (
            ViewBox { min_x: 0.0, min_y: 0.0, width: w, height: h },
            ViewBoxSource::Dimensions,
        ),
        (Some(s), None) | (None, Some(s)) => (ViewBox::square(s), ViewBoxSource::Dimensions),
        (None, None) => (ViewBox::square(QUADRAT), ViewBoxSource::Default),
    }
}

/// Parse an SVG length such as `120`, `120px` or `4.5mm`, ignoring the unit.
///
/// Percentages and non-positive values are rejected.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(value.len());
    let number: f64 = value[..end].parse().ok()?;
    (number.is_finite() && number > 0.0).then_some(number)
}

/// Raw markup between an element's start and end tags.
pub fn inner_markup<'a>(source: &'a str, node: &Node<'_, '_>) -> &'a str {
    match (node.first_child(), node.last_child()) {
        (Some(first), Some(last)) => {
            let start = first.range().start;
            let end = last.range().end;
            source.get(start..end).unwrap_or("")
        }
        _ => "",
    }
}

/// Slice the first `<svg ...>...</svg>` element out of arbitrary text.
///
/// The fragment ends at the close tag matching the first `<svg`, so sibling
/// or trailing documents are left out.
pub fn extract_svg_fragment(text: &str) -> Option<&str> {
    const CLOSE: &str = "</svg>";
    let rest = &text[find_svg_open(text, 0)?..];
    let mut depth = 0usize;
    let mut pos = 0;
    loop {
        let open = find_svg_open(rest, pos);
        let close = rest[pos..].find(CLOSE).map(|i| pos + i);
        match (open, close) {
            (Some(open), close) if close.is_none_or(|close| open < close) => {
                let tag_end = open + rest[open..].find('>')?;
                pos = tag_end + 1;
                if !rest[..tag_end].ends_with('/') {
                    depth += 1;
                } else if depth == 0 {
                    return Some(&rest[..pos]);
                }
            }
            (_, Some(close)) => {
                pos = close + CLOSE.len();
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&rest[..pos]);
                }
            }
            _ => return None,
        }
    }
}

/// Byte offset of the next `<svg` start tag at or after `from`.
fn find_svg_open(text: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = text.get(pos..)?.find("<svg") {
        let at = pos + found;
        let next = text[at + 4..].chars().next();
        if next.is_some_and(|c| c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + 4;
    }
    None
}

/// Element id under which a glyph body is defined for `<use>` references.
pub fn glyph_def_id(glyph_id: &str) -> String {
    let safe: String = glyph_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("glyph-{safe}")
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_svg_root_with_view_box() {
        let root = parse_svg_root(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"><rect width="10" height="10"/><circle r="3"/></svg>"#,
        )
        .unwrap();
        assert_eq!(root.view_box, ViewBox { min_x: 0.0, min_y: 0.0, width: 100.0, height: 50.0 });
        assert_eq!(root.view_box_source, ViewBoxSource::Declared);
        assert_eq!(root.body, r#"<rect width="10" height="10"/><circle r="3"/>"#);
    }

    #[test]
    fn test_view_box_falls_back_to_dimensions() {
        let root = parse_svg_root(r#"<svg viewBox="bogus" width="120px" height="80"><g/></svg>"#).unwrap();
        assert_eq!(root.view_box_source, ViewBoxSource::Dimensions);
        assert_eq!(root.view_box.width, 120.0);
        assert_eq!(root.view_box.height, 80.0);
    }

    #[test]
    fn test_view_box_falls_back_to_default_square() {
        let root = parse_svg_root(r#"<svg width="100%"></svg>"#).unwrap();
        assert_eq!(root.view_box_source, ViewBoxSource::Default);
        assert_eq!(root.view_box, ViewBox::square(QUADRAT));
        assert_eq!(root.body, "");
    }

    #[test]
    fn test_missing_root() {
        assert!(matches!(parse_svg_root("<html><body/></html>"), Err(SvgError::MissingRoot)));
        assert!(matches!(parse_svg_root("<svg"), Err(SvgError::Xml(_))));
    }

    #[test]
    fn test_doctype_tolerated() {
        let markup = r#"<?xml version="1.0"?><!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"><svg viewBox="0 0 10 10"><path d="M0 0"/></svg>"#;
        assert!(parse_svg_root(markup).is_ok());
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("120"), Some(120.0));
        assert_eq!(parse_length(" 4.5mm "), Some(4.5));
        assert_eq!(parse_length("50%"), None);
        assert_eq!(parse_length("0"), None);
        assert_eq!(parse_length("px"), None);
    }

    #[test]
    fn test_extract_svg_fragment() {
        let html = r#"<html><body><p>x</p><svg viewBox="0 0 1 1"><g/></svg></body></html>"#;
        assert_eq!(extract_svg_fragment(html), Some(r#"<svg viewBox="0 0 1 1"><g/></svg>"#));
        assert_eq!(extract_svg_fragment(r#"<svg width="3"/>"#), Some(r#"<svg width="3"/>"#));
        assert_eq!(extract_svg_fragment("A1 G17"), None);
    }

    #[test]
    fn test_extract_stops_at_matching_close() {
        let html = r#"<p><svg viewBox="0 0 1 1"><g/></svg><svgx/><svg><circle r="1"/></svg></p>"#;
        assert_eq!(extract_svg_fragment(html), Some(r#"<svg viewBox="0 0 1 1"><g/></svg>"#));

        let nested = r#"x <svg><svg><g/></svg><svg/><rect/></svg> <svg/>"#;
        assert_eq!(extract_svg_fragment(nested), Some(r#"<svg><svg><g/></svg><svg/><rect/></svg>"#));
        assert!(parse_svg_root(extract_svg_fragment(html).unwrap()).is_ok());

        assert_eq!(extract_svg_fragment("<svg><g>"), None);
    }

    #[test]
    fn test_prefixed_namespaces_scoped_on_body() {
        let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" viewBox="0 0 10 10"><sodipodi:namedview id="nv"/><g inkscape:label="L"><use xlink:href="#p"/></g></svg>"##;
        let root = parse_svg_root(markup).unwrap();
        let prefixes: Vec<&str> = root.namespaces.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(prefixes, ["inkscape", "sodipodi"]);
        assert!(root.body.starts_with(r#"<g xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="#));

        let rebuilt = root.to_document();
        let doc = parse_xml(&rebuilt).unwrap();
        let label = doc
            .descendants()
            .find_map(|n| n.attribute(("http://www.inkscape.org/namespaces/inkscape", "label")));
        assert_eq!(label, Some("L"));
        assert_eq!(parse_svg_root(&rebuilt).unwrap().view_box, root.view_box);
    }

    #[test]
    fn test_plain_body_not_wrapped() {
        let root = parse_svg_root(r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##).unwrap();
        assert!(root.namespaces.is_empty());
        assert_eq!(root.body, r##"<use xlink:href="#a"/>"##);

        let empty = parse_svg_root(r#"<svg xmlns:dc="http://purl.org/dc/elements/1.1/"/>"#).unwrap();
        assert_eq!(empty.body, "");
    }

    #[test]
    fn test_glyph_def_id() {
        assert_eq!(glyph_def_id("G17"), "glyph-G17");
        assert_eq!(glyph_def_id("Aa 1/b"), "glyph-Aa_1_b");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a<"b">&'"#), "a&lt;&quot;b&quot;&gt;&amp;&apos;");
    }
}
