//! Quadrat Application
//!
//! Native shell around the core canvas: system clipboard, glyph directories,
//! scene files and the command line.

pub mod catalog_dir;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod scene_file;

pub use catalog_dir::DirectoryCatalog;
pub use cli::{Cli, Command, run};
pub use clipboard::SystemClipboard;
pub use config::{ConfigError, ConfigResult, load_config, save_config};
pub use scene_file::{SceneFileError, SceneFileResult, load_or_new, load_scene, save_scene};
