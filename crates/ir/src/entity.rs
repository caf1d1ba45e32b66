//! Container entity definitions
//!
//! Tags, triggers, variables, folders, clients and custom templates as they
//! appear in the platform's export format. Field names follow the wire
//! format (camelCase); every field is optional on input so that a partial or
//! hand-edited export still decodes.

use crate::parameter::{Condition, Parameter, parameter_value};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tagforge_core::{EntityKind, Identifiable, Named, value_signature};

/// Built-in trigger ids provided by the platform
pub const BUILT_IN_TRIGGER_IDS: &[&str] = &["2147479553", "2147479572", "2147479573"];

/// Built-in "All Pages" trigger id
pub const ALL_PAGES_TRIGGER_ID: &str = "2147479553";

/// Whether a trigger id refers to a platform built-in trigger
pub fn is_built_in_trigger(id: &str) -> bool {
    BUILT_IN_TRIGGER_IDS.contains(&id)
}

// ============================================================================
// ContainerEntity Trait
// ============================================================================

/// Behaviour shared by every entity stored in a container
pub trait ContainerEntity: Identifiable + Named {
    /// Which kind of entity this is
    fn entity_kind(&self) -> EntityKind;

    /// Platform type code (e.g. `gaawc`, `customEvent`, `c`)
    fn type_code(&self) -> &str {
        ""
    }

    /// Configuration parameters
    fn parameters(&self) -> &[Parameter] {
        &[]
    }

    /// Folder this entity is filed under
    fn parent_folder_id(&self) -> Option<&str> {
        None
    }

    /// Trigger conditions (triggers only)
    fn conditions(&self) -> Vec<&Condition> {
        Vec::new()
    }

    /// Trigger ids (tags only)
    fn trigger_ids(&self) -> &[String] {
        &[]
    }

    /// Content signature over `{type, name, parameter, filter, triggerId}`.
    ///
    /// This is a grouping heuristic for duplicate detection. Identical
    /// content always yields the same signature; distinct content usually,
    /// but not always, yields distinct ones.
    fn signature(&self) -> String {
        let payload = json!({
            "type": self.type_code(),
            "name": self.name(),
            "parameter": self.parameters(),
            "filter": self.conditions(),
            "triggerId": self.trigger_ids(),
        });
        value_signature(&payload)
    }
}

macro_rules! impl_identity {
    ($ty:ty, $id:ident) => {
        impl Identifiable for $ty {
            fn id(&self) -> &str {
                &self.$id
            }
        }

        impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

// ============================================================================
// Tag
// ============================================================================

/// An action executed when one of its firing triggers fires
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub tag_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firing_trigger_id: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocking_trigger_id: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_firing_option: Option<String>,
}

impl Tag {
    /// Create a new tag
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            tag_id: id.into(),
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameter.push(parameter);
        self
    }

    /// Append a firing trigger
    pub fn with_firing_trigger(mut self, trigger_id: impl Into<String>) -> Self {
        self.firing_trigger_id.push(trigger_id.into());
        self
    }

    /// File into a folder
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.parent_folder_id = Some(folder_id.into());
        self
    }

    /// Mark as paused
    pub fn paused(mut self) -> Self {
        self.paused = Some(true);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Value of a top-level parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        parameter_value(&self.parameter, key)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.unwrap_or(false)
    }

    /// Custom HTML body, for `html` tags
    pub fn html(&self) -> Option<&str> {
        if self.kind == "html" { self.param("html") } else { None }
    }
}

impl_identity!(Tag, tag_id);

impl ContainerEntity for Tag {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Tag
    }

    fn type_code(&self) -> &str {
        &self.kind
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameter
    }

    fn parent_folder_id(&self) -> Option<&str> {
        self.parent_folder_id.as_deref()
    }

    fn trigger_ids(&self) -> &[String] {
        &self.firing_trigger_id
    }
}

// ============================================================================
// Trigger
// ============================================================================

/// A condition gating when tags fire
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub trigger_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_event_filter: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_event_filter: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
}

impl Trigger {
    /// Create a new trigger
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            trigger_id: id.into(),
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Append a custom event condition
    pub fn with_custom_event_filter(mut self, condition: Condition) -> Self {
        self.custom_event_filter.push(condition);
        self
    }

    /// Append a filter condition
    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    /// File into a folder
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.parent_folder_id = Some(folder_id.into());
        self
    }

    /// Literal event name a custom-event trigger matches, if it is static
    pub fn custom_event_name(&self) -> Option<&str> {
        self.custom_event_filter
            .iter()
            .filter(|c| c.arg0().map(str::trim) == Some("{{_event}}"))
            .filter_map(Condition::arg1)
            .map(str::trim)
            .find(|v| !v.is_empty() && !v.contains("{{"))
    }

    /// Whether this trigger fires on every page view without conditions
    pub fn is_all_pages(&self) -> bool {
        self.trigger_id == ALL_PAGES_TRIGGER_ID
            || (self.kind == "pageview" && self.filter.is_empty() && self.auto_event_filter.is_empty())
    }
}

impl_identity!(Trigger, trigger_id);

impl ContainerEntity for Trigger {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Trigger
    }

    fn type_code(&self) -> &str {
        &self.kind
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameter
    }

    fn parent_folder_id(&self) -> Option<&str> {
        self.parent_folder_id.as_deref()
    }

    fn conditions(&self) -> Vec<&Condition> {
        self.custom_event_filter
            .iter()
            .chain(self.filter.iter())
            .chain(self.auto_event_filter.iter())
            .collect()
    }
}

// ============================================================================
// Variable
// ============================================================================

/// A named, reusable value referenced as `{{Name}}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub variable_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
}

impl Variable {
    /// Create a new variable
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            variable_id: id.into(),
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Create a constant variable (`c`) holding a single value
    pub fn constant(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(id, name, "c").with_parameter(Parameter::template("value", value))
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameter.push(parameter);
        self
    }

    /// File into a folder
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.parent_folder_id = Some(folder_id.into());
        self
    }

    pub fn is_constant(&self) -> bool {
        self.kind == "c"
    }

    /// Literal value of a constant variable
    pub fn constant_value(&self) -> Option<&str> {
        if self.is_constant() {
            parameter_value(&self.parameter, "value")
        } else {
            None
        }
    }
}

impl_identity!(Variable, variable_id);

impl ContainerEntity for Variable {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Variable
    }

    fn type_code(&self) -> &str {
        &self.kind
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameter
    }

    fn parent_folder_id(&self) -> Option<&str> {
        self.parent_folder_id.as_deref()
    }
}

// ============================================================================
// Folder
// ============================================================================

/// A grouping of tags, triggers and variables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub folder_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder_id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl_identity!(Folder, folder_id);

impl ContainerEntity for Folder {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Folder
    }
}

// ============================================================================
// Client
// ============================================================================

/// A server-side client that claims incoming requests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
}

impl_identity!(Client, client_id);

impl ContainerEntity for Client {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Client
    }

    fn type_code(&self) -> &str {
        &self.kind
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameter
    }

    fn parent_folder_id(&self) -> Option<&str> {
        self.parent_folder_id.as_deref()
    }
}

// ============================================================================
// CustomTemplate
// ============================================================================

/// A sandboxed custom tag or variable template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default)]
    pub template_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_reference: Option<Value>,
}

impl_identity!(CustomTemplate, template_id);

impl ContainerEntity for CustomTemplate {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Template
    }
}

/// Template id a `cvt_…` entity type points at.
///
/// Exported types look like `cvt_<containerId>_<templateId>`; older exports
/// use `cvt_<templateId>`.
pub fn custom_template_id(type_code: &str) -> Option<&str> {
    let rest = type_code.strip_prefix("cvt_")?;
    let id = rest.rsplit('_').next()?;
    if id.is_empty() { None } else { Some(id) }
}

// ============================================================================
// BuiltInVariable
// ============================================================================

/// A platform-provided variable enabled in the container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltInVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub name: String,
}

// ============================================================================
// Tests
// ============================================================================
