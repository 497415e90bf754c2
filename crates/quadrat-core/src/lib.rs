//! Quadrat Core Library
//!
//! Platform-agnostic geometry, gesture and clipboard interchange engine for
//! the Quadrat glyph canvas.

use std::future::Future;
use std::pin::Pin;

pub mod bounds;
pub mod camera;
pub mod canvas;
pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod gesture;
pub mod glyph;
pub mod handles;
pub mod instance;
pub mod interchange;
pub mod layout;
pub mod probe;
pub mod scene;
pub mod snap;
pub mod svg;
pub mod transform;

/// Boxed future for async boundaries (clipboard, catalog fetch).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub use bounds::{Measurement, SelectionBounds};
pub use camera::Camera;
pub use canvas::{Canvas, CopyOutcome, CopyPreset, PasteOutcome, RenderItem};
pub use catalog::{CatalogError, CatalogResult, CatalogSource, GlyphCatalog, load_catalog};
pub use clipboard::{ClipboardBackend, ClipboardContents, ClipboardError, ClipboardResult, RichPayload, WriteMode};
pub use config::{EditorConfig, ScaleBounds};
pub use gesture::{DragSession, GestureMachine, GestureState};
pub use glyph::{GlyphDefinition, GlyphOrigin, GlyphSource, QUADRAT, ViewBox};
pub use handles::{DragMode, Handle, HandleKind, HandleMetrics};
pub use instance::{GlyphInstance, InstanceId, TransformState};
pub use layout::{GridMetrics, LayoutItem, Row};
pub use probe::{BoundsProbe, NullProbe};
pub use scene::{Placement, SceneDocument};
pub use snap::SnapMode;
pub use svg::{SvgError, SvgResult};
pub use transform::{TransformChain, TransformOp};
