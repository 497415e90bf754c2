//! Quadrat Render Library
//!
//! Headless rendering for the Quadrat glyph canvas: SVG frames, screen-space
//! measurement of painted instances and `usvg` content probing.

pub mod measure;
mod probe;
mod renderer;

pub use measure::{measure_instance, refresh_measurement};
pub use probe::UsvgProbe;
pub use renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError, SvgRenderer, render_canvas_svg};
