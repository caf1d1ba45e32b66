//! Configuration file
//!
//! One TOML file configures both halves of the tool:
//!
//! ```toml
//! [audit]
//! disabled_rules = ["default_entity_name"]
//! all_pages_threshold = 15
//!
//! [generator]
//! vendors = ["ga4", "google_ads"]
//! transport_url = "https://sgtm.example.com"
//! ```
//!
//! Command-line flags override values from the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tagforge_audit::AuditConfig;
use tagforge_codegen::GeneratorConfig;
use tagforge_core::{EngineError, EngineResult};

/// Contents of a `tagforge.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagforgeConfig {
    pub audit: AuditConfig,
    pub generator: GeneratorConfig,
}

impl TagforgeConfig {
    pub fn from_toml_str(toml_str: &str) -> EngineResult<Self> {
        toml::from_str(toml_str).map_err(|e| EngineError::invalid_config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load the file if one was given, defaults otherwise
    pub fn load_optional(path: Option<&Path>) -> EngineResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tagforge_ir::Vendor;

    #[test]
    fn test_both_tables() {
        let config = TagforgeConfig::from_toml_str(
            r#"
            [audit]
            max_reference_depth = 3

            [generator]
            vendors = ["facebook"]
            container_name = "sGTM"
            "#,
        )
        .unwrap();

        assert_eq!(config.audit.max_reference_depth, 3);
        assert_eq!(config.generator.vendors, vec![Vendor::Facebook]);
        assert_eq!(config.generator.container_name, "sGTM");
        assert_eq!(config.generator.settings_folder_name, "Settings");
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generator]\ntransport_url = \"https://sgtm.example.com\"").unwrap();

        let config = TagforgeConfig::load(file.path()).unwrap();
        assert_eq!(
            config.generator.transport_url.as_deref(),
            Some("https://sgtm.example.com")
        );
        assert_eq!(config.audit, AuditConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TagforgeConfig::load("/nonexistent/tagforge.toml").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_no_file_means_defaults() {
        assert_eq!(TagforgeConfig::load_optional(None).unwrap(), TagforgeConfig::default());
    }
}
