//! Built-in rules
//!
//! Rules are grouped by how they look at the container:
//! - `unused`: entities nothing refers to
//! - `duplicates`: entities with identical content
//! - `references`: the variable reference graph
//! - `entity`: per-entity predicate table
//! - `container`: whole-container checks

pub mod container;
pub mod duplicates;
pub mod entity;
pub mod references;
pub mod unused;

use crate::rule::Rule;
use tagforge_core::EntityKind;

/// Ids of the built-in rules
pub mod ids {
    pub const UNUSED_TAG: &str = "unused_tag";
    pub const UNUSED_TRIGGER: &str = "unused_trigger";
    pub const UNUSED_VARIABLE: &str = "unused_variable";
    pub const UNUSED_FOLDER: &str = "unused_folder";
    pub const UNUSED_TEMPLATE: &str = "unused_template";

    pub const DUPLICATE_TAG: &str = "duplicate_tag";
    pub const DUPLICATE_TRIGGER: &str = "duplicate_trigger";
    pub const DUPLICATE_VARIABLE: &str = "duplicate_variable";

    pub const CIRCULAR_REFERENCE: &str = "circular_reference";
    pub const DEEP_VARIABLE_CHAIN: &str = "deep_variable_chain";

    pub const TAG_WITHOUT_TRIGGER: &str = "tag_without_trigger";
    pub const DEPRECATED_TAG_TYPE: &str = "deprecated_tag_type";
    pub const CUSTOM_HTML_DOCUMENT_WRITE: &str = "custom_html_document_write";
    pub const CUSTOM_HTML_EVAL: &str = "custom_html_eval";
    pub const INSECURE_HTTP_URL: &str = "insecure_http_url";
    pub const HARDCODED_TRACKING_ID: &str = "hardcoded_tracking_id";
    pub const PII_VARIABLE: &str = "pii_variable";
    pub const DEFAULT_ENTITY_NAME: &str = "default_entity_name";
    pub const CONSOLE_LOG_IN_CODE: &str = "console_log_in_code";
    pub const ENTITY_WITHOUT_FOLDER: &str = "entity_without_folder";

    pub const TOO_MANY_ALL_PAGES_TAGS: &str = "too_many_all_pages_tags";
    pub const MISSING_CONSENT_MANAGEMENT: &str = "missing_consent_management";
    pub const NO_FOLDERS: &str = "no_folders";
}

/// The full built-in rule set, in reporting order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    for kind in [
        EntityKind::Tag,
        EntityKind::Trigger,
        EntityKind::Variable,
        EntityKind::Folder,
        EntityKind::Template,
    ] {
        rules.push(Box::new(unused::UnusedEntityRule::new(kind)));
    }

    for kind in [EntityKind::Tag, EntityKind::Trigger, EntityKind::Variable] {
        rules.push(Box::new(duplicates::DuplicateRule::new(kind)));
    }

    rules.push(Box::new(references::CircularReferenceRule));
    rules.push(Box::new(references::DeepVariableChainRule));

    rules.extend(
        entity::ENTITY_RULES
            .iter()
            .map(|rule| Box::new(rule.clone()) as Box<dyn Rule>),
    );

    rules.push(Box::new(container::AllPagesTagsRule));
    rules.push(Box::new(container::ConsentManagementRule));
    rules.push(Box::new(container::NoFoldersRule));

    rules
}
