//! Path validation for the edit engine.
//!
//! All paths arrive from the client fully resolved; the engine refuses
//! anything that is empty, relative, or attempts parent-directory traversal,
//! before any I/O happens.

use crate::error::EditorError;
use std::path::{Component, Path};

/// Validate a caller-supplied file or directory path.
pub fn validate_path(path: &str) -> Result<(), EditorError> {
    if path.is_empty() {
        return Err(EditorError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    }
    let p = Path::new(path);
    if !p.is_absolute() {
        return Err(EditorError::InvalidPath {
            path: path.to_string(),
            reason: "path must be absolute".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(EditorError::InvalidPath {
            path: path.to_string(),
            reason: "parent directory traversal is not allowed".to_string(),
        });
    }
    Ok(())
}
