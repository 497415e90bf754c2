//! Clipboard interchange codec: self-describing SVG export and import.

mod export;
mod import;

pub use export::{ExportDocument, export_svg};
pub use import::{ImportOutcome, PasteSource, import_clipboard, parse_glyph_ids, parse_tagged_groups};

/// Attribute names carrying instance state on exported groups.
pub mod attr {
    pub const GLYPH_ID: &str = "data-glyph-id";
    pub const ROTATE: &str = "data-rotate";
    pub const FLIP_X: &str = "data-flip-x";
    pub const FLIP_Y: &str = "data-flip-y";
    pub const SCALE: &str = "data-scale";
    pub const SCALE_X: &str = "data-scale-x";
    pub const SCALE_Y: &str = "data-scale-y";
    pub const OFFSET_X: &str = "data-offset-x";
    pub const OFFSET_Y: &str = "data-offset-y";
}

/// Inline SVG sample for exercising the foreign import path.
pub const SAMPLE_FOREIGN_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 320 200" width="320" height="200">
  <defs>
    <linearGradient id="river" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#1d3b2f" />
      <stop offset="100%" stop-color="#d4a04a" />
    </linearGradient>
  </defs>
  <rect x="8" y="8" width="304" height="184" rx="18" fill="#f2efe7" stroke="#1d3b2f" stroke-width="6" />
  <path d="M26 130 C70 90 140 160 190 120 C230 90 270 120 294 100" fill="none" stroke="url(#river)" stroke-width="12" />
  <circle cx="88" cy="78" r="22" fill="#d4a04a" stroke="#1d3b2f" stroke-width="6" />
  <path d="M140 70 L170 40 L200 70" fill="none" stroke="#1d3b2f" stroke-width="10" />
</svg>"##;
