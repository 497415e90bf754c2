//! System clipboard backed by `arboard`.

use quadrat_core::clipboard::{ClipboardBackend, ClipboardContents, ClipboardError, ClipboardResult, RichPayload};
use quadrat_core::BoxFuture;
use std::sync::Mutex;

/// The native system clipboard.
///
/// HTML is written together with its plain-text alternative; the SVG member
/// of a rich payload travels inside the HTML as a data URI.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

fn map_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardNotSupported => ClipboardError::Unavailable,
        other => ClipboardError::Platform(other.to_string()),
    }
}

impl SystemClipboard {
    /// Open the system clipboard.
    pub fn new() -> ClipboardResult<Self> {
        let clipboard = arboard::Clipboard::new().map_err(map_error)?;
        Ok(Self { inner: Mutex::new(clipboard) })
    }

    fn with_clipboard<T>(
        &self,
        f: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> ClipboardResult<T> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| ClipboardError::Platform("clipboard lock poisoned".to_string()))?;
        f(&mut clipboard).map_err(map_error)
    }
}

/// Missing content is an empty read, not an error.
fn optional(result: Result<String, arboard::Error>) -> Result<Option<String>, arboard::Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(err) => Err(err),
    }
}

impl ClipboardBackend for SystemClipboard {
    fn supports_rich_write(&self) -> bool {
        true
    }

    fn write_rich<'a>(&'a self, payload: &'a RichPayload) -> BoxFuture<'a, ClipboardResult<()>> {
        Box::pin(async move {
            self.with_clipboard(|clipboard| {
                clipboard.set_html(payload.html.as_str(), Some(payload.text.as_str()))
            })
        })
    }

    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ClipboardResult<()>> {
        Box::pin(async move { self.with_clipboard(|clipboard| clipboard.set_text(text)) })
    }

    fn read(&self) -> BoxFuture<'_, ClipboardResult<ClipboardContents>> {
        Box::pin(async move {
            self.with_clipboard(|clipboard| {
                let html = optional(clipboard.get().html())?;
                let text = optional(clipboard.get_text())?;
                Ok(ClipboardContents { html, text })
            })
        })
    }
}
