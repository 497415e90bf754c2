//! Glyph catalog and its batched loader.

use crate::BoxFuture;
use crate::glyph::{GlyphDefinition, GlyphOrigin, GlyphSource};
use crate::probe::BoundsProbe;
use crate::svg::{SvgError, parse_svg_root};
use futures_util::future::join_all;
use std::collections::HashMap;
use thiserror::Error;

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to list catalog: {0}")]
    Listing(String),

    #[error("Failed to fetch glyph {id}: {message}")]
    Fetch { id: String, message: String },

    #[error("Glyph {0} has no <svg> root element")]
    MissingSvg(String),

    #[error("Glyph {id} is not valid SVG: {source}")]
    InvalidSvg {
        id: String,
        #[source]
        source: SvgError,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Where catalog entries and their markup come from.
pub trait CatalogSource {
    /// List every available entry.
    fn list(&self) -> BoxFuture<'_, CatalogResult<Vec<GlyphSource>>>;

    /// Fetch the SVG markup for one entry.
    fn fetch<'a>(&'a self, source: &'a GlyphSource) -> BoxFuture<'a, CatalogResult<String>>;
}

/// Read-only lookup of glyph definitions, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct GlyphCatalog {
    order: Vec<String>,
    glyphs: HashMap<String, GlyphDefinition>,
}

impl GlyphCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Re-inserting an id replaces it in place.
    pub fn insert(&mut self, glyph: GlyphDefinition) {
        if !self.glyphs.contains_key(&glyph.id) {
            self.order.push(glyph.id.clone());
        }
        self.glyphs.insert(glyph.id.clone(), glyph);
    }

    pub fn get(&self, id: &str) -> Option<&GlyphDefinition> {
        self.glyphs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.glyphs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GlyphDefinition> {
        self.order.iter().filter_map(|id| self.glyphs.get(id))
    }

    /// Case-insensitive substring search over id and name.
    ///
    /// An empty or blank term matches everything.
    pub fn search(&self, term: &str) -> Vec<&GlyphDefinition> {
        let term = term.trim().to_lowercase();
        self.iter()
            .filter(|glyph| {
                term.is_empty()
                    || glyph.id.to_lowercase().contains(&term)
                    || glyph.name.to_lowercase().contains(&term)
            })
            .collect()
    }
}

impl FromIterator<GlyphDefinition> for GlyphCatalog {
    fn from_iter<I: IntoIterator<Item = GlyphDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for glyph in iter {
            catalog.insert(glyph);
        }
        catalog
    }
}

/// Build a catalog definition from fetched markup.
///
/// Content bounds come from `probe`; when it cannot measure, the view box is
/// used as the content box.
pub fn parse_glyph_svg(
    source: &GlyphSource,
    markup: &str,
    probe: &dyn BoundsProbe,
) -> CatalogResult<GlyphDefinition> {
    let root = parse_svg_root(markup).map_err(|err| match err {
        SvgError::MissingRoot => CatalogError::MissingSvg(source.id.clone()),
        other => CatalogError::InvalidSvg { id: source.id.clone(), source: other },
    })?;
    let document = root.to_document();
    let glyph = GlyphDefinition::new(
        source.id.clone(),
        source.display_name(),
        root.view_box,
        root.body,
        GlyphOrigin::Builtin,
    );
    Ok(match probe.content_bounds(&document) {
        Some(bounds) => glyph.with_content_bounds(bounds),
        None => glyph,
    })
}

/// Load every entry of `source` in batches of `batch_size` concurrent fetches.
///
/// `on_progress(loaded, total)` is called after each batch. The first fetch
/// or parse failure aborts the load.
pub async fn load_catalog<S>(
    source: &S,
    batch_size: usize,
    probe: &dyn BoundsProbe,
    mut on_progress: impl FnMut(usize, usize),
) -> CatalogResult<GlyphCatalog>
where
    S: CatalogSource + ?Sized,
{
    let entries = source.list().await?;
    let total = entries.len();
    let mut catalog = GlyphCatalog::new();
    let mut loaded = 0;

    for batch in entries.chunks(batch_size.max(1)) {
        let results = join_all(batch.iter().map(|entry| source.fetch(entry))).await;
        for (entry, markup) in batch.iter().zip(results) {
            let markup = markup.inspect_err(|err| log::error!("{err}"))?;
            catalog.insert(parse_glyph_svg(entry, &markup, probe)?);
        }
        loaded += batch.len();
        log::debug!("Loaded {loaded}/{total} glyphs");
        on_progress(loaded, total);
    }

    log::info!("Glyph catalog ready: {} entries", catalog.len());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::ViewBox;
    use crate::probe::NullProbe;
    use kurbo::Rect;

    struct MapSource {
        entries: Vec<(String, Option<String>)>,
    }

    impl MapSource {
        fn new(count: usize) -> Self {
            let entries = (0..count)
                .map(|i| {
                    let markup = format!(r#"<svg viewBox="0 0 {} 100"><path d="M0 0h{}"/></svg>"#, 100 + i, i);
                    (format!("G{i}"), Some(markup))
                })
                .collect();
            Self { entries }
        }
    }

    impl CatalogSource for MapSource {
        fn list(&self) -> BoxFuture<'_, CatalogResult<Vec<GlyphSource>>> {
            let list = self
                .entries
                .iter()
                .map(|(id, _)| GlyphSource { id: id.clone(), name: None, url: format!("{id}.svg") })
                .collect();
            Box::pin(async move { Ok(list) })
        }

        fn fetch<'a>(&'a self, source: &'a GlyphSource) -> BoxFuture<'a, CatalogResult<String>> {
            Box::pin(async move {
                self.entries
                    .iter()
                    .find(|(id, _)| *id == source.id)
                    .and_then(|(_, markup)| markup.clone())
                    .ok_or_else(|| CatalogError::Fetch { id: source.id.clone(), message: "404".into() })
            })
        }
    }

    struct FixedProbe(Rect);

    impl BoundsProbe for FixedProbe {
        fn content_bounds(&self, _markup: &str) -> Option<Rect> {
            Some(self.0)
        }
    }

    #[test]
    fn test_load_catalog_reports_progress_per_batch() {
        let source = MapSource::new(5);
        let mut progress = Vec::new();
        let catalog = pollster::block_on(load_catalog(&source, 2, &NullProbe, |loaded, total| {
            progress.push((loaded, total))
        }))
        .unwrap();

        assert_eq!(progress, vec![(2, 5), (4, 5), (5, 5)]);
        assert_eq!(catalog.len(), 5);
        let ids: Vec<_> = catalog.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["G0", "G1", "G2", "G3", "G4"]);
        assert_eq!(catalog.get("G3").unwrap().width(), 103.0);
    }

    #[test]
    fn test_load_catalog_fails_on_fetch_error() {
        let mut source = MapSource::new(3);
        source.entries[1].1 = None;
        let result = pollster::block_on(load_catalog(&source, 24, &NullProbe, |_, _| {}));
        assert!(matches!(result, Err(CatalogError::Fetch { ref id, .. }) if id == "G1"));
    }

    #[test]
    fn test_parse_glyph_svg_missing_root() {
        let source = GlyphSource { id: "X".into(), name: None, url: "x".into() };
        let result = parse_glyph_svg(&source, "<html/>", &NullProbe);
        assert!(matches!(result, Err(CatalogError::MissingSvg(ref id)) if id == "X"));
    }

    #[test]
    fn test_parse_glyph_svg_uses_probe() {
        let source = GlyphSource { id: "A1".into(), name: Some("Seated man".into()), url: "a".into() };
        let probe = FixedProbe(Rect::new(10.0, 20.0, 30.0, 40.0));
        let glyph = parse_glyph_svg(&source, r#"<svg viewBox="0 0 100 100"><g/></svg>"#, &probe).unwrap();
        assert_eq!(glyph.name, "Seated man");
        assert_eq!(glyph.view_box, ViewBox::square(100.0));
        assert_eq!(glyph.content, Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(glyph.body, "<g/>");
    }

    #[test]
    fn test_search() {
        let catalog: GlyphCatalog = ["A1", "A2", "G17"]
            .into_iter()
            .map(|id| {
                GlyphDefinition::new(id, format!("name {id}"), ViewBox::default(), "", GlyphOrigin::Builtin)
            })
            .collect();
        assert_eq!(catalog.search("a").len(), 3);
        assert_eq!(catalog.search(" g1 ").len(), 1);
        assert_eq!(catalog.search("").len(), 3);
        assert!(catalog.search("zz").is_empty());
    }

    #[test]
    fn test_insert_replaces_without_reordering() {
        let mut catalog = GlyphCatalog::new();
        catalog.insert(GlyphDefinition::new("A", "first", ViewBox::default(), "", GlyphOrigin::Builtin));
        catalog.insert(GlyphDefinition::new("B", "b", ViewBox::default(), "", GlyphOrigin::Builtin));
        catalog.insert(GlyphDefinition::new("A", "second", ViewBox::default(), "", GlyphOrigin::Builtin));
        let names: Vec<_> = catalog.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["second", "b"]);
    }
}
