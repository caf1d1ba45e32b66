//! # Tagforge IR (Container Model)
//!
//! This crate provides the in-memory representation of a tagging container.
//! It parses the platform's export format into typed entities and indexes
//! them for the rules engine and the server-side generator.
//!
//! ## Core Concepts
//!
//! - **Tag**: an action executed when its triggers fire
//! - **Trigger**: a condition gating when tags fire
//! - **Variable**: a named value referenced as `{{Name}}`
//! - **Folder**: a grouping of tags, triggers and variables
//! - **ContainerModel**: the root that holds every entity plus a reverse
//!   reference index and the derived "unused" sets
//! - **MigrationAnalysis**: which tags and vendors move server-side
//!

// Module declarations
pub mod analysis;
pub mod container;
pub mod entity;
pub mod parameter;
pub mod references;
pub mod serialization;
pub mod vendor;

// Re-export commonly used types at crate root
pub use analysis::{MigratableTag, MigrationAnalysis};
pub use container::{CONTAINER_VERSION_KEY, ContainerModel};
pub use entity::{
    ALL_PAGES_TRIGGER_ID, BUILT_IN_TRIGGER_IDS, BuiltInVariable, Client, ContainerEntity,
    CustomTemplate, Folder, Tag, Trigger, Variable, custom_template_id, is_built_in_trigger,
};
pub use parameter::{
    Condition, Parameter, ParameterType, find_parameter, first_parameter_value,
    keyed_template_values, parameter_value, template_values,
};
pub use references::ReferenceIndex;
pub use serialization::{load_analysis, load_container, save_json, to_pretty_json};
pub use vendor::{Vendor, detect_vendor};

// Re-export core types that are commonly used with the model
pub use tagforge_core::{EngineError, EngineResult, EntityKind, Identifiable, Named};

/// Export format version this model reads and the generator writes
pub const EXPORT_FORMAT_VERSION: u32 = 2;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Condition, ContainerEntity, ContainerModel, EngineError, EngineResult, EntityKind,
        Folder, Identifiable, MigratableTag, MigrationAnalysis, Named, Parameter, Tag, Trigger,
        Variable, Vendor,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_version() {
        assert_eq!(EXPORT_FORMAT_VERSION, 2);
    }
}
