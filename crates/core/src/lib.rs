//! # Tagforge Core
//!
//! Core types, helpers, and error handling for Tagforge.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: `EntityKind`, `Severity`, `Category`
//! - **Traits**: `Identifiable` and `Named`
//! - **Helpers**: content signatures and `{{Name}}` reference extraction
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod hash;
pub mod reference;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult};
pub use hash::{format_signature, rolling_hash, value_signature};
pub use reference::{extract_references, is_reference, reference_name, to_reference};
pub use traits::{Identifiable, Named};
pub use types::{Category, EntityKind, Severity};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
