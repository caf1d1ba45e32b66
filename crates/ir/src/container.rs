//! The container model
//!
//! `ContainerModel` is the read-only view of one exported container that the
//! rules engine and the generator work from. It is built once at the boundary,
//! where the only fatal condition is a structurally unusable document. Inside
//! the version block each entity is decoded on its own; an entity that does
//! not decode is skipped and logged rather than failing the whole load.

use crate::entity::{
    BuiltInVariable, Client, CustomTemplate, Folder, Tag, Trigger, Variable, is_built_in_trigger,
};
use crate::references::ReferenceIndex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tagforge_core::{EngineError, EngineResult};

/// Key of the version block inside an export document
pub const CONTAINER_VERSION_KEY: &str = "containerVersion";

// ============================================================================
// ContainerModel
// ============================================================================

/// Parsed, indexed, read-only representation of a tagging container
#[derive(Debug, Clone)]
pub struct ContainerModel {
    /// The original export document, untouched
    raw: Value,

    tags: Vec<Tag>,
    triggers: Vec<Trigger>,
    variables: Vec<Variable>,
    folders: Vec<Folder>,
    clients: Vec<Client>,
    templates: Vec<CustomTemplate>,
    built_in_variables: Vec<BuiltInVariable>,

    /// Reverse references, computed once
    references: ReferenceIndex,

    /// Number of array elements that failed to decode
    skipped: usize,
}

impl ContainerModel {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Parse an export document from JSON text
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EngineError::invalid_container(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Build the model from an already-parsed export document
    pub fn from_value(raw: Value) -> EngineResult<Self> {
        let Some(root) = raw.as_object() else {
            return Err(EngineError::invalid_container(
                "the document is not a JSON object",
            ));
        };
        let Some(version) = root.get(CONTAINER_VERSION_KEY).and_then(Value::as_object) else {
            return Err(EngineError::invalid_container(format!(
                "missing '{}' object",
                CONTAINER_VERSION_KEY
            )));
        };

        let mut skipped = 0;
        let tags = decode_entities(version, "tag", &mut skipped);
        let triggers = decode_entities(version, "trigger", &mut skipped);
        let variables = decode_entities(version, "variable", &mut skipped);
        let folders = decode_entities(version, "folder", &mut skipped);
        let clients = decode_entities(version, "client", &mut skipped);
        let templates = decode_entities(version, "customTemplate", &mut skipped);
        let built_in_variables = decode_entities(version, "builtInVariable", &mut skipped);

        let references = ReferenceIndex::build(&tags, &triggers, &variables, &clients);

        tracing::debug!(
            tags = tags.len(),
            triggers = triggers.len(),
            variables = variables.len(),
            folders = folders.len(),
            skipped,
            "container model loaded",
        );

        Ok(Self {
            raw,
            tags,
            triggers,
            variables,
            folders,
            clients,
            templates,
            built_in_variables,
            references,
            skipped,
        })
    }

    /// Build a model directly from entities (used by tests and tooling)
    pub fn from_entities(
        tags: Vec<Tag>,
        triggers: Vec<Trigger>,
        variables: Vec<Variable>,
        folders: Vec<Folder>,
    ) -> Self {
        let references = ReferenceIndex::build(&tags, &triggers, &variables, &[]);
        let raw = json!({
            "exportFormatVersion": 2,
            "containerVersion": {
                "tag": to_json_array(&tags),
                "trigger": to_json_array(&triggers),
                "variable": to_json_array(&variables),
                "folder": to_json_array(&folders),
            }
        });

        Self {
            raw,
            tags,
            triggers,
            variables,
            folders,
            clients: Vec::new(),
            templates: Vec::new(),
            built_in_variables: Vec::new(),
            references,
            skipped: 0,
        }
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    /// The original export document
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn templates(&self) -> &[CustomTemplate] {
        &self.templates
    }

    pub fn built_in_variables(&self) -> &[BuiltInVariable] {
        &self.built_in_variables
    }

    pub fn references(&self) -> &ReferenceIndex {
        &self.references
    }

    /// Number of entities that were skipped while decoding
    pub fn skipped_entities(&self) -> usize {
        self.skipped
    }

    /// Total number of tags, triggers and variables
    pub fn entity_count(&self) -> usize {
        self.tags.len() + self.triggers.len() + self.variables.len()
    }

    /// Container name from the version block, if exported
    pub fn container_name(&self) -> Option<&str> {
        self.raw
            .get(CONTAINER_VERSION_KEY)
            .and_then(|v| v.get("container"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
    }

    // ====================================================================
    // Lookups
    // ====================================================================

    pub fn tag_by_id(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.tag_id == id)
    }

    pub fn trigger_by_id(&self, id: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.trigger_id == id)
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn folder_by_id(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.folder_id == id)
    }

    /// Resolve a value through constant variables.
    ///
    /// A literal is returned as-is; a `{{Name}}` reference to a constant
    /// variable returns the constant's value (following constant chains a
    /// few levels deep). Anything else yields `None`.
    pub fn resolve_literal<'a>(&'a self, value: &'a str) -> Option<&'a str> {
        let mut current = value.trim();
        for _ in 0..4 {
            match tagforge_core::reference_name(current) {
                None if current.is_empty() || current.contains("{{") => return None,
                None => return Some(current),
                Some(name) => {
                    current = self.variable_by_name(name)?.constant_value()?.trim();
                }
            }
        }
        None
    }

    // ====================================================================
    // Unused sets
    // ====================================================================

    /// Paused tags: nothing can make them fire
    pub fn unused_tags(&self) -> Vec<&Tag> {
        self.tags.iter().filter(|t| t.is_paused()).collect()
    }

    /// Triggers no tag or trigger reference points at
    pub fn unused_triggers(&self) -> Vec<&Trigger> {
        self.triggers
            .iter()
            .filter(|t| !is_built_in_trigger(&t.trigger_id))
            .filter(|t| !self.references.is_trigger_referenced(&t.trigger_id))
            .collect()
    }

    /// Variables no other entity mentions
    pub fn unused_variables(&self) -> Vec<&Variable> {
        self.variables
            .iter()
            .filter(|v| !self.references.is_variable_referenced(&v.name))
            .collect()
    }

    /// Folders nothing is filed under
    pub fn unused_folders(&self) -> Vec<&Folder> {
        self.folders
            .iter()
            .filter(|f| !self.references.is_folder_referenced(&f.folder_id))
            .collect()
    }

    /// Custom templates no tag, variable or client instantiates
    pub fn unused_templates(&self) -> Vec<&CustomTemplate> {
        self.templates
            .iter()
            .filter(|t| !self.references.is_template_referenced(&t.template_id))
            .collect()
    }
}

fn decode_entities<T: DeserializeOwned>(
    version: &Map<String, Value>,
    key: &str,
    skipped: &mut usize,
) -> Vec<T> {
    let Some(value) = version.get(key) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        tracing::warn!(key, "entity collection is not an array, ignoring it");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item.clone()) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "skipping undecodable entity");
                *skipped += 1;
                None
            }
        })
        .collect()
}

fn to_json_array<T: Serialize>(items: &[T]) -> Value {
    serde_json::to_value(items).unwrap_or_else(|_| Value::Array(Vec::new()))
}

// ============================================================================
// Tests
// ============================================================================
