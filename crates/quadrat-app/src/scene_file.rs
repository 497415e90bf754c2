//! JSON scene files.

use quadrat_core::SceneDocument;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scene file errors.
#[derive(Debug, Error)]
pub enum SceneFileError {
    #[error("Scene not found: {0}")]
    NotFound(PathBuf),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for scene file operations.
pub type SceneFileResult<T> = Result<T, SceneFileError>;

/// Load a scene from a JSON file.
pub fn load_scene(path: &Path) -> SceneFileResult<SceneDocument> {
    if !path.exists() {
        return Err(SceneFileError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)
        .map_err(|e| SceneFileError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    SceneDocument::from_json(&json).map_err(|e| {
        SceneFileError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Load a scene, or start a new one when the file does not exist yet.
pub fn load_or_new(path: &Path) -> SceneFileResult<SceneDocument> {
    match load_scene(path) {
        Err(SceneFileError::NotFound(_)) => {
            log::info!("Starting new scene at {}", path.display());
            Ok(SceneDocument::new())
        }
        other => other,
    }
}

/// Save a scene as pretty JSON, creating parent directories as needed.
pub fn save_scene(path: &Path, document: &SceneDocument) -> SceneFileResult<()> {
    let json = document
        .to_json()
        .map_err(|e| SceneFileError::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SceneFileError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    fs::write(path, json)
        .map_err(|e| SceneFileError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::debug!("Saved scene {} to {}", document.id, path.display());
    Ok(())
}
