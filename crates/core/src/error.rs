//! Error types for Tagforge
//!
//! The analysis and generation algorithms never fail on odd input; they skip
//! what they cannot use. Errors only come from the boundaries: loading a
//! container, reading configuration or catalogues, and writing output.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Tagforge
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The container document is structurally unusable
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// The migration analysis document is structurally unusable
    #[error("Invalid migration analysis: {0}")]
    InvalidAnalysis(String),

    /// A template catalogue could not be interpreted
    #[error("Invalid template catalogue: {0}")]
    InvalidCatalog(String),

    /// Unknown vendor key
    #[error("Unknown vendor: '{0}'")]
    UnknownVendor(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// Underlying IO failure without a known path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// Output document could not be serialized
    #[error("JSON error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Create an invalid container error
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        EngineError::InvalidContainer(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Check if this error was caused by the caller's input documents
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidContainer(_)
                | EngineError::InvalidAnalysis(_)
                | EngineError::InvalidCatalog(_)
                | EngineError::UnknownVendor(_)
                | EngineError::InvalidConfig(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::Io(_) | EngineError::FileRead { .. } | EngineError::FileWrite { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Tests
// ============================================================================
