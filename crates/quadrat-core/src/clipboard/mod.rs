//! System clipboard abstraction.
//!
//! Writes carry three parallel representations when the platform allows it
//! (HTML wrapper, raw SVG, plain text) and degrade to a single text write
//! otherwise.

mod memory;

pub use memory::{MemoryClipboard, MemoryClipboardMode};

use crate::BoxFuture;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// MIME prefix of an SVG data URI.
pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("Clipboard API unavailable")]
    Unavailable,
    #[error("Clipboard permission denied")]
    PermissionDenied,
    #[error("Clipboard requires a secure context")]
    InsecureContext,
    #[error("Clipboard error: {0}")]
    Platform(String),
}

/// Result type for clipboard operations.
pub type ClipboardResult<T> = Result<T, ClipboardError>;

/// What a clipboard read returned. Both fields empty is a valid, empty clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardContents {
    pub html: Option<String>,
    pub text: Option<String>,
}

impl ClipboardContents {
    pub fn is_empty(&self) -> bool {
        self.html.as_deref().is_none_or(str::is_empty) && self.text.as_deref().is_none_or(str::is_empty)
    }
}

/// Parallel representations for one rich clipboard write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichPayload {
    pub html: String,
    pub svg: String,
    pub text: String,
}

impl RichPayload {
    /// Build the payload for an SVG document, wrapping it as an HTML image.
    pub fn new(svg: impl Into<String>, text: impl Into<String>) -> Self {
        let svg = svg.into();
        let image = if svg.is_empty() {
            String::new()
        } else {
            format!(r#"<img src="{}" alt="" />"#, svg_data_uri(&svg))
        };
        Self {
            html: format!("<!doctype html><html><body>{image}</body></html>"),
            svg,
            text: text.into(),
        }
    }
}

/// Encode SVG markup as a base64 data URI.
pub fn svg_data_uri(svg: &str) -> String {
    format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(svg))
}

/// Which representation a write actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// HTML, SVG and text were all written.
    Rich,
    /// Only plain text was written; rich data was not preserved.
    TextOnly,
}

/// Platform clipboard backend.
pub trait ClipboardBackend {
    /// Whether parallel rich representations can be written.
    fn supports_rich_write(&self) -> bool;

    /// Write HTML, SVG and text in one operation.
    fn write_rich<'a>(&'a self, payload: &'a RichPayload) -> BoxFuture<'a, ClipboardResult<()>>;

    /// Write plain text only.
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ClipboardResult<()>>;

    /// Read whatever HTML and text representations are present.
    fn read(&self) -> BoxFuture<'_, ClipboardResult<ClipboardContents>>;
}

/// Write an exported document, degrading to text when rich writes are unavailable.
///
/// The text fallback carries the SVG markup, or `text` when there is no markup.
pub async fn write_export<B>(backend: &B, svg: &str, text: &str) -> ClipboardResult<WriteMode>
where
    B: ClipboardBackend + ?Sized,
{
    if backend.supports_rich_write() {
        let payload = RichPayload::new(svg, text);
        backend.write_rich(&payload).await?;
        log::debug!("Wrote rich clipboard payload ({} bytes of SVG)", svg.len());
        return Ok(WriteMode::Rich);
    }

    let fallback = if svg.is_empty() { text } else { svg };
    backend.write_text(fallback).await?;
    log::warn!("Rich clipboard writes unavailable; wrote plain text only");
    Ok(WriteMode::TextOnly)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_payload_embeds_data_uri() {
        let payload = RichPayload::new("<svg/>", "A1");
        assert_eq!(
            payload.html,
            r#"<!doctype html><html><body><img src="data:image/svg+xml;base64,PHN2Zy8+" alt="" /></body></html>"#
        );
        assert_eq!(payload.svg, "<svg/>");
        assert_eq!(payload.text, "A1");
    }

    #[test]
    fn test_empty_svg_has_no_image() {
        let payload = RichPayload::new("", "A1");
        assert_eq!(payload.html, "<!doctype html><html><body></body></html>");
    }

    #[test]
    fn test_contents_is_empty() {
        assert!(ClipboardContents::default().is_empty());
        assert!(ClipboardContents { html: Some(String::new()), text: None }.is_empty());
        assert!(!ClipboardContents { html: None, text: Some("A1".into()) }.is_empty());
    }

    #[test]
    fn test_write_export_rich() {
        let clipboard = MemoryClipboard::new();
        let mode = pollster::block_on(write_export(&clipboard, "<svg/>", "A1")).unwrap();
        assert_eq!(mode, WriteMode::Rich);
        let contents = pollster::block_on(clipboard.read()).unwrap();
        assert!(contents.html.unwrap().contains(SVG_DATA_URI_PREFIX));
        assert_eq!(contents.text.as_deref(), Some("A1"));
    }

    #[test]
    fn test_write_export_text_fallback_prefers_svg() {
        let clipboard = MemoryClipboard::with_mode(MemoryClipboardMode::TextOnly);
        let mode = pollster::block_on(write_export(&clipboard, "<svg/>", "A1")).unwrap();
        assert_eq!(mode, WriteMode::TextOnly);
        let contents = pollster::block_on(clipboard.read()).unwrap();
        assert_eq!(contents.html, None);
        assert_eq!(contents.text.as_deref(), Some("<svg/>"));

        pollster::block_on(write_export(&clipboard, "", "A1 G17")).unwrap();
        let contents = pollster::block_on(clipboard.read()).unwrap();
        assert_eq!(contents.text.as_deref(), Some("A1 G17"));
    }

    #[test]
    fn test_write_export_denied() {
        let clipboard = MemoryClipboard::with_mode(MemoryClipboardMode::Denied);
        let result = pollster::block_on(write_export(&clipboard, "<svg/>", "A1"));
        assert_eq!(result, Err(ClipboardError::PermissionDenied));
    }
}
