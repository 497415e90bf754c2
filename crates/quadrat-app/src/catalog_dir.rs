//! Glyph catalog backed by a directory of SVG files.

use quadrat_core::catalog::{CatalogError, CatalogResult, CatalogSource};
use quadrat_core::{BoxFuture, GlyphSource};
use std::fs;
use std::path::{Path, PathBuf};

/// Optional listing file naming the entries and their display names.
pub const MANIFEST_FILE: &str = "catalog.json";

/// Reads glyphs from `<dir>/*.svg`.
///
/// When `catalog.json` exists it is an array of `{ id, name?, url }` entries
/// with `url` relative to the directory. Otherwise every `.svg` file is an
/// entry whose id is the file stem, in file name order.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    base_path: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read_manifest(&self, path: &Path) -> CatalogResult<Vec<GlyphSource>> {
        let json = fs::read_to_string(path)
            .map_err(|e| CatalogError::Listing(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| CatalogError::Listing(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn scan(&self) -> CatalogResult<Vec<GlyphSource>> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            CatalogError::Listing(format!("Failed to read {}: {}", self.base_path.display(), e))
        })?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")))
            .collect();
        files.sort();
        Ok(files
            .iter()
            .filter_map(|path| {
                let id = path.file_stem()?.to_str()?.to_string();
                let url = path.file_name()?.to_str()?.to_string();
                Some(GlyphSource { id, name: None, url })
            })
            .collect())
    }
}

impl CatalogSource for DirectoryCatalog {
    fn list(&self) -> BoxFuture<'_, CatalogResult<Vec<GlyphSource>>> {
        Box::pin(async move {
            let manifest = self.base_path.join(MANIFEST_FILE);
            let sources = if manifest.exists() {
                self.read_manifest(&manifest)?
            } else {
                self.scan()?
            };
            log::debug!("Listed {} glyphs in {}", sources.len(), self.base_path.display());
            Ok(sources)
        })
    }

    fn fetch<'a>(&'a self, source: &'a GlyphSource) -> BoxFuture<'a, CatalogResult<String>> {
        Box::pin(async move {
            let path = self.base_path.join(&source.url);
            fs::read_to_string(&path).map_err(|e| CatalogError::Fetch {
                id: source.id.clone(),
                message: format!("{}: {}", path.display(), e),
            })
        })
    }
}
