//! Loading and saving container documents
//!
//! File access lives here so the model itself stays free of IO. Export
//! documents are plain JSON; output is pretty-printed so that generated
//! containers diff cleanly.

use crate::analysis::MigrationAnalysis;
use crate::container::ContainerModel;
use serde::Serialize;
use std::path::Path;
use tagforge_core::{EngineError, EngineResult};

// ============================================================================
// Load Functions
// ============================================================================

/// Load a container export from a file
///
/// # Example
///
/// ```rust,ignore
/// use tagforge_ir::load_container;
///
/// let model = load_container("GTM-XXXX_workspace.json")?;
/// println!("{} tags", model.tags().len());
/// ```
pub fn load_container(path: impl AsRef<Path>) -> EngineResult<ContainerModel> {
    let path = path.as_ref();
    let json = read_file(path)?;
    ContainerModel::from_json(&json)
}

/// Load an external migration analysis from a file
pub fn load_analysis(path: impl AsRef<Path>) -> EngineResult<MigrationAnalysis> {
    let path = path.as_ref();
    let json = read_file(path)?;
    MigrationAnalysis::from_json(&json)
}

fn read_file(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// ============================================================================
// Save Functions
// ============================================================================

/// Serialize a document to pretty JSON text
pub fn to_pretty_json<T: Serialize + ?Sized>(document: &T) -> EngineResult<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}

/// Write a document to a file as pretty JSON, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(document: &T, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    let json = to_pretty_json(document)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| EngineError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
