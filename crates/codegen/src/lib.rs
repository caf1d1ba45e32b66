//! # Tagforge Codegen
//!
//! Server-side container generation for Tagforge.
//!
//! This crate turns a client-side container plus a migration analysis into
//! a brand-new server container export, and patches the client container so
//! its GA4 tags send hits to the server.
//!
//! ## Features
//!
//! - **Constants**: hardcoded ids are deduplicated into named constants
//! - **Event Data**: a fixed set of event-data accessor variables
//! - **Templates**: vendor templates resolved through a [`TemplateCatalog`]
//! - **Triggers**: one server trigger per derived event name
//! - **Tags**: client tag types mapped to their server-side counterparts
//! - **Client Patch**: transport URL settings on GA4 client tags
//!

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod client_patch;
pub mod context;
pub mod export;
pub mod generator;
pub mod passes;
pub mod summary;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::{StaticCatalog, TemplateCatalog, TemplateEntry};
pub use client_patch::patch_client_container;
pub use context::{ConstantKey, ConstantRole, GenerationContext};
pub use export::{ContainerExport, ContainerFeatures, ContainerInfo, ContainerVersion};
pub use generator::ServerSideGenerator;
pub use summary::{GenerationSummary, MappingKind, PlaceholderEntry, TagMappingEntry};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tagforge_core::EngineResult;
use tagforge_ir::{Vendor, save_json, to_pretty_json};

/// Default name of the folder holding generated constants
pub const DEFAULT_SETTINGS_FOLDER: &str = "Settings";

/// Name of the folder holding event-data variables
pub const EVENT_DATA_FOLDER: &str = "Event Data";

/// Value of the transport URL constant when none is configured
pub const TRANSPORT_URL_PLACEHOLDER: &str = "https://<your server container URL>";

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the server-side generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Vendors to migrate; empty means every vendor in the analysis
    pub vendors: Vec<Vendor>,

    /// URL of the server container, used for the transport URL constant and
    /// the client patch
    pub transport_url: Option<String>,

    /// Folder holding generated constants
    pub settings_folder_name: String,

    /// Name of the generated container
    pub container_name: String,

    /// Public id of the generated container
    pub public_id: String,

    pub account_id: String,

    pub container_id: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vendors: Vec::new(),
            transport_url: None,
            settings_folder_name: DEFAULT_SETTINGS_FOLDER.to_string(),
            container_name: "Server Container".to_string(),
            public_id: "GTM-XXXXXXX".to_string(),
            account_id: "0".to_string(),
            container_id: "0".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict generation to these vendors
    pub fn with_vendors(mut self, vendors: impl IntoIterator<Item = Vendor>) -> Self {
        self.vendors = vendors.into_iter().collect();
        self
    }

    /// Set the server container URL
    pub fn with_transport_url(mut self, url: impl Into<String>) -> Self {
        self.transport_url = Some(url.into());
        self
    }

    /// Set the settings folder name
    pub fn with_settings_folder(mut self, name: impl Into<String>) -> Self {
        self.settings_folder_name = name.into();
        self
    }

    /// Set the generated container's name
    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    /// Set the generated container's public id
    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = public_id.into();
        self
    }

    /// Set the account and container ids written into the export
    pub fn with_ids(mut self, account_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self.container_id = container_id.into();
        self
    }

    /// The configured transport URL, or the placeholder
    pub fn transport_url_or_placeholder(&self) -> &str {
        self.transport_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(TRANSPORT_URL_PLACEHOLDER)
    }
}

// ============================================================================
// GenerationOutput
// ============================================================================

/// Result of one generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// The server container export document
    pub export: ContainerExport,

    /// What was generated and what needs manual follow-up
    pub summary: GenerationSummary,
}

impl GenerationOutput {
    pub fn summary(&self) -> &GenerationSummary {
        &self.summary
    }

    /// Export document as pretty-printed JSON
    pub fn export_json(&self) -> EngineResult<String> {
        to_pretty_json(&self.export)
    }

    /// Write the export document to a file
    pub fn write_export(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        save_json(&self.export, path)
    }
}
