//! Template catalogue
//!
//! Vendors without a built-in server tag type need a custom template. The
//! generator looks templates up through [`TemplateCatalog`] so callers can
//! supply their own source (a bundled file, a fake in tests, …).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tagforge_core::{EngineError, EngineResult};

/// A custom template definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntry {
    /// Tag type generated tags use to instantiate the template
    pub type_id: String,

    /// Template name shown in the container
    pub display_name: String,

    /// Template source as stored in the export
    pub template_data_encoded: String,
}

/// Lookup of template definitions by vendor key (`facebook`, `linkedin`,
/// `microsoft_ads`)
pub trait TemplateCatalog {
    fn resolve(&self, vendor_key: &str) -> Option<TemplateEntry>;
}

// ============================================================================
// StaticCatalog
// ============================================================================

/// In-memory catalogue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    entries: HashMap<String, TemplateEntry>,
}

impl StaticCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn with_entry(mut self, vendor_key: impl Into<String>, entry: TemplateEntry) -> Self {
        self.insert(vendor_key, entry);
        self
    }

    pub fn insert(&mut self, vendor_key: impl Into<String>, entry: TemplateEntry) {
        self.entries.insert(vendor_key.into(), entry);
    }

    /// Parse a JSON object keyed by vendor key
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidCatalog(e.to_string()))
    }

    /// Load a catalogue file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let catalog = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), entries = catalog.len(), "template catalogue loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateCatalog for StaticCatalog {
    fn resolve(&self, vendor_key: &str) -> Option<TemplateEntry> {
        self.entries.get(vendor_key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CATALOG: &str = r#"{
        "facebook": {
            "typeId": "cvt_FB",
            "displayName": "Facebook Conversions API",
            "templateDataEncoded": "___INFO___"
        }
    }"#;

    #[test]
    fn test_resolve() {
        let catalog = StaticCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("facebook").unwrap().type_id, "cvt_FB");
        assert!(catalog.resolve("linkedin").is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = StaticCatalog::load(file.path()).unwrap();
        assert_eq!(
            catalog.resolve("facebook").unwrap().display_name,
            "Facebook Conversions API"
        );
    }

    #[test]
    fn test_invalid_catalog() {
        let err = StaticCatalog::from_json("[1, 2]").unwrap_err();
        assert!(err.is_input());
        assert!(StaticCatalog::load("/nonexistent/catalog.json").unwrap_err().is_io());
    }
}
