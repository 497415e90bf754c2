//! In-memory clipboard for tests and headless use.

use super::{ClipboardBackend, ClipboardContents, ClipboardError, ClipboardResult, RichPayload};
use crate::BoxFuture;
use std::sync::RwLock;

/// Capabilities a [`MemoryClipboard`] simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryClipboardMode {
    /// Rich and text writes both succeed.
    #[default]
    Rich,
    /// Only plain text can be written, as in an insecure context.
    TextOnly,
    /// No clipboard API at all.
    Unavailable,
    /// Every access is refused.
    Denied,
}

/// A clipboard that keeps its contents in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    mode: MemoryClipboardMode,
    contents: RwLock<ClipboardContents>,
    last_svg: RwLock<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: MemoryClipboardMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Pre-populate the clipboard as another application would.
    pub fn with_contents(html: Option<&str>, text: Option<&str>) -> Self {
        let clipboard = Self::new();
        if let Ok(mut contents) = clipboard.contents.write() {
            *contents = ClipboardContents {
                html: html.map(str::to_string),
                text: text.map(str::to_string),
            };
        }
        clipboard
    }

    /// The SVG representation of the last rich write, if any.
    pub fn last_svg(&self) -> Option<String> {
        self.last_svg.read().ok().and_then(|svg| svg.clone())
    }

    fn check_access(&self) -> ClipboardResult<()> {
        match self.mode {
            MemoryClipboardMode::Denied => Err(ClipboardError::PermissionDenied),
            MemoryClipboardMode::Unavailable => Err(ClipboardError::Unavailable),
            MemoryClipboardMode::Rich | MemoryClipboardMode::TextOnly => Ok(()),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> ClipboardError {
    ClipboardError::Platform(format!("Lock error: {e}"))
}

impl ClipboardBackend for MemoryClipboard {
    fn supports_rich_write(&self) -> bool {
        matches!(self.mode, MemoryClipboardMode::Rich | MemoryClipboardMode::Denied)
    }

    fn write_rich<'a>(&'a self, payload: &'a RichPayload) -> BoxFuture<'a, ClipboardResult<()>> {
        Box::pin(async move {
            self.check_access()?;
            if self.mode == MemoryClipboardMode::TextOnly {
                return Err(ClipboardError::InsecureContext);
            }
            let mut contents = self.contents.write().map_err(lock_error)?;
            *contents = ClipboardContents {
                html: Some(payload.html.clone()),
                text: Some(payload.text.clone()),
            };
            *self.last_svg.write().map_err(lock_error)? = Some(payload.svg.clone());
            Ok(())
        })
    }

    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ClipboardResult<()>> {
        Box::pin(async move {
            self.check_access()?;
            let mut contents = self.contents.write().map_err(lock_error)?;
            *contents = ClipboardContents {
                html: None,
                text: Some(text.to_string()),
            };
            *self.last_svg.write().map_err(lock_error)? = None;
            Ok(())
        })
    }

    fn read(&self) -> BoxFuture<'_, ClipboardResult<ClipboardContents>> {
        Box::pin(async move {
            self.check_access()?;
            let contents = self.contents.read().map_err(lock_error)?;
            Ok(contents.clone())
        })
    }
}
