//! # Generation Context
//!
//! The `GenerationContext` holds all state of one generation run:
//!
//! - Per-kind id counters (ids are `"1"`, `"2"`, … in allocation order)
//! - The value → constant name map used to deduplicate literals
//! - Constant bindings per tag and per vendor setting
//! - The event name → trigger id map
//! - Folder, template and trigger lookups for later passes
//! - Every generated entity, in creation order
//! - The fingerprint shared by every entity
//!
//! A fresh context is created for every `generate` call and consumed by
//! export assembly, so no state survives between runs.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tagforge_core::{EntityKind, to_reference};
use tagforge_ir::{BuiltInVariable, Client, CustomTemplate, Folder, Tag, Trigger, Variable, Vendor};

use crate::GeneratorConfig;
use crate::summary::{GenerationSummary, MappingKind, PlaceholderEntry, TagMappingEntry};

// ============================================================================
// Constant keys
// ============================================================================

/// What a generated constant holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantRole {
    MeasurementId,
    ConversionId,
    ConversionLabel,
    FloodlightAdvertiserId,
    FacebookPixelId,
    FacebookAccessToken,
    LinkedInPartnerId,
    LinkedInAccessToken,
    MicrosoftUetTagId,
    TransportUrl,
}

/// Binding of a constant to the place it is used
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantKey {
    /// A value read from one source tag
    Tag { tag_id: String, role: ConstantRole },

    /// A container-wide setting
    Setting(ConstantRole),
}

impl ConstantKey {
    pub fn tag(tag_id: impl Into<String>, role: ConstantRole) -> Self {
        ConstantKey::Tag {
            tag_id: tag_id.into(),
            role,
        }
    }
}

// ============================================================================
// GenerationContext
// ============================================================================

/// State threaded through every generation pass
#[derive(Debug, Clone)]
pub struct GenerationContext {
    // ── run-level ────────────────────────────────────────────────────────
    /// Generator configuration
    pub config: GeneratorConfig,

    /// Clock reading for this run
    now: DateTime<Utc>,

    /// Fingerprint stamped on every generated entity
    fingerprint: String,

    /// Next id per entity kind
    counters: HashMap<EntityKind, u64>,

    // ── constants ────────────────────────────────────────────────────────
    /// Literal value → constant name
    constant_by_value: HashMap<String, String>,

    /// Every constant name allocated so far
    constant_names: HashSet<String>,

    /// Where each constant is used
    constant_bindings: HashMap<ConstantKey, String>,

    // ── lookups ──────────────────────────────────────────────────────────
    /// Folder name → folder id
    folder_ids: HashMap<String, String>,

    /// Vendor → tag type of its custom template
    template_types: HashMap<Vendor, String>,

    /// Derived event name → server trigger id
    event_triggers: HashMap<String, String>,

    /// Id of the "All Events" trigger, when one exists
    all_events_trigger_id: Option<String>,

    // ── generated entities ───────────────────────────────────────────────
    pub(crate) tags: Vec<Tag>,
    pub(crate) triggers: Vec<Trigger>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) folders: Vec<Folder>,
    pub(crate) clients: Vec<Client>,
    pub(crate) templates: Vec<CustomTemplate>,
    pub(crate) built_in_variables: Vec<BuiltInVariable>,

    // ── reporting ────────────────────────────────────────────────────────
    pub(crate) summary: GenerationSummary,
}

impl GenerationContext {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create an empty context for one run
    pub fn new(config: GeneratorConfig, now: DateTime<Utc>) -> Self {
        Self {
            config,
            now,
            fingerprint: now.timestamp_millis().to_string(),
            counters: HashMap::new(),
            constant_by_value: HashMap::new(),
            constant_names: HashSet::new(),
            constant_bindings: HashMap::new(),
            folder_ids: HashMap::new(),
            template_types: HashMap::new(),
            event_triggers: HashMap::new(),
            all_events_trigger_id: None,
            tags: Vec::new(),
            triggers: Vec::new(),
            variables: Vec::new(),
            folders: Vec::new(),
            clients: Vec::new(),
            templates: Vec::new(),
            built_in_variables: Vec::new(),
            summary: GenerationSummary::default(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Allocate the next id for an entity kind
    pub fn next_id(&mut self, kind: EntityKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        counter.to_string()
    }

    // ====================================================================
    // Folders
    // ====================================================================

    /// Create a folder and return its id
    pub fn add_folder(&mut self, name: &str) -> String {
        let id = self.next_id(EntityKind::Folder);
        self.folders.push(Folder::new(id.clone(), name));
        self.folder_ids.insert(name.to_string(), id.clone());
        id
    }

    pub fn folder_id(&self, name: &str) -> Option<&str> {
        self.folder_ids.get(name).map(String::as_str)
    }

    pub fn settings_folder_id(&self) -> Option<&str> {
        self.folder_id(&self.config.settings_folder_name)
    }

    pub fn vendor_folder_id(&self, vendor: Vendor) -> Option<&str> {
        self.folder_id(vendor.display_name())
    }

    // ====================================================================
    // Constants
    // ====================================================================

    fn unique_constant_name(&self, base: &str) -> String {
        if !self.constant_names.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{} {}", base, n))
            .find(|name| !self.constant_names.contains(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// Constant holding `value`, created under `base_name` (suffixed with
    /// ` 2`, ` 3`, … when taken) unless one already holds the same value.
    ///
    /// Returns the constant name and whether it was created by this call.
    pub fn ensure_constant(&mut self, base_name: &str, value: &str) -> (String, bool) {
        if let Some(name) = self.constant_by_value.get(value) {
            return (name.clone(), false);
        }

        let name = self.unique_constant_name(base_name);
        let id = self.next_id(EntityKind::Variable);
        let mut variable = Variable::constant(id, name.clone(), value);
        variable.parent_folder_id = self.settings_folder_id().map(str::to_string);
        self.variables.push(variable);

        self.constant_names.insert(name.clone());
        self.constant_by_value.insert(value.to_string(), name.clone());
        (name, true)
    }

    /// Constant holding a placeholder that needs manual replacement. The
    /// placeholder is recorded in the summary once.
    pub fn ensure_placeholder_constant(&mut self, base_name: &str, placeholder: &str) -> String {
        let (name, created) = self.ensure_constant(base_name, placeholder);
        if created {
            self.add_placeholder(name.clone(), placeholder);
        }
        name
    }

    /// Remember which constant serves a key
    pub fn bind_constant(&mut self, key: ConstantKey, name: impl Into<String>) {
        self.constant_bindings.entry(key).or_insert_with(|| name.into());
    }

    /// `{{name}}` reference to the constant bound to a key
    pub fn constant_reference(&self, key: &ConstantKey) -> Option<String> {
        self.constant_bindings.get(key).map(|name| to_reference(name))
    }

    /// Number of generated constant variables
    pub fn constant_count(&self) -> usize {
        self.variables.iter().filter(|v| v.is_constant()).count()
    }

    // ====================================================================
    // Templates
    // ====================================================================

    pub fn register_template(&mut self, vendor: Vendor, type_id: impl Into<String>) {
        self.template_types.insert(vendor, type_id.into());
    }

    /// Tag type of a vendor's custom template, if one was emitted
    pub fn template_type(&self, vendor: Vendor) -> Option<&str> {
        self.template_types.get(&vendor).map(String::as_str)
    }

    // ====================================================================
    // Triggers
    // ====================================================================

    pub fn set_all_events_trigger(&mut self, trigger_id: impl Into<String>) {
        self.all_events_trigger_id = Some(trigger_id.into());
    }

    pub fn all_events_trigger_id(&self) -> Option<&str> {
        self.all_events_trigger_id.as_deref()
    }

    pub fn register_event_trigger(&mut self, event_name: impl Into<String>, trigger_id: impl Into<String>) {
        self.event_triggers.insert(event_name.into(), trigger_id.into());
    }

    pub fn event_trigger_id(&self, event_name: &str) -> Option<&str> {
        self.event_triggers.get(event_name).map(String::as_str)
    }

    // ====================================================================
    // Reporting
    // ====================================================================

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        self.summary.warnings.push(warning);
    }

    pub fn add_placeholder(&mut self, name: impl Into<String>, placeholder: impl Into<String>) {
        self.summary.placeholders.push(PlaceholderEntry {
            name: name.into(),
            placeholder: placeholder.into(),
        });
    }

    pub fn add_mapping(&mut self, original: impl Into<String>, server_side: Option<String>, kind: MappingKind) {
        self.summary.tag_mapping.push(TagMappingEntry {
            original: original.into(),
            server_side,
            kind,
        });
    }

    // ====================================================================
    // Entity accessors
    // ====================================================================

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
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ctx() -> GenerationContext {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        GenerationContext::new(GeneratorConfig::default(), now)
    }

    #[test]
    fn test_ids_are_per_kind_and_monotonic() {
        let mut ctx = ctx();
        assert_eq!(ctx.next_id(EntityKind::Tag), "1");
        assert_eq!(ctx.next_id(EntityKind::Tag), "2");
        assert_eq!(ctx.next_id(EntityKind::Trigger), "1");
        assert_eq!(ctx.next_id(EntityKind::Tag), "3");
    }

    #[test]
    fn test_fingerprint_from_clock() {
        assert_eq!(ctx().fingerprint(), "1714564800000");
    }

    #[test]
    fn test_constant_dedup_by_value() {
        let mut ctx = ctx();
        ctx.add_folder("Settings");

        let (a, created_a) = ctx.ensure_constant("const - ga4 measurement id", "G-1");
        let (b, created_b) = ctx.ensure_constant("const - ga4 measurement id", "G-1");
        let (c, _) = ctx.ensure_constant("const - ga4 measurement id", "G-2");

        assert!(created_a && !created_b);
        assert_eq!(a, b);
        assert_eq!(c, "const - ga4 measurement id 2");
        assert_eq!(ctx.constant_count(), 2);
        assert_eq!(ctx.variables()[0].parent_folder_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_placeholder_recorded_once() {
        let mut ctx = ctx();
        let a = ctx.ensure_placeholder_constant("const - facebook pixel id", "<Facebook Pixel ID>");
        let b = ctx.ensure_placeholder_constant("const - facebook pixel id", "<Facebook Pixel ID>");
        assert_eq!(a, b);
        assert_eq!(ctx.summary.placeholders.len(), 1);
    }

    #[test]
    fn test_constant_binding() {
        let mut ctx = ctx();
        let key = ConstantKey::tag("7", ConstantRole::ConversionId);
        assert!(ctx.constant_reference(&key).is_none());

        ctx.bind_constant(key.clone(), "const - google ads conversion id");
        assert_eq!(
            ctx.constant_reference(&key).as_deref(),
            Some("{{const - google ads conversion id}}")
        );
    }
}
