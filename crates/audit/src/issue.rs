//! Audit findings
//!
//! `Issue` is a single problem found in a container. `Suggestion` is an
//! aggregated recommendation derived from issues and scores.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tagforge_core::{Category, EntityKind, Identifiable, Named, Severity};
use tagforge_ir::ContainerEntity;

// ============================================================================
// Issue
// ============================================================================

/// A problem found by one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Id of the rule that produced this issue (e.g. `tag_without_trigger`)
    pub rule_id: String,

    pub severity: Severity,

    pub category: Category,

    /// Human-readable description
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<EntityKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Rule-specific structured data (duplicate groups, cycle paths, …)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Issue {
    /// Create a new issue
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            category,
            message: message.into(),
            entity_kind: None,
            entity_id: None,
            entity_name: None,
            details: None,
        }
    }

    /// Attach the entity this issue is about
    pub fn for_entity(mut self, entity: &dyn ContainerEntity) -> Self {
        self.entity_kind = Some(entity.entity_kind());
        self.entity_id = Some(entity.id().to_string());
        self.entity_name = Some(entity.name().to_string());
        self
    }

    /// Attach structured details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule_id, self.message)
    }
}

// ============================================================================
// Suggestion
// ============================================================================

/// How urgently a suggestion should be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// An actionable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub priority: Priority,
    pub category: Category,
    pub title: String,
    pub description: String,

    /// Number of issues this suggestion addresses
    #[serde(default)]
    pub related_issues: usize,
}

impl Suggestion {
    pub fn new(
        id: impl Into<String>,
        priority: Priority,
        category: Category,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            priority,
            category,
            title: title.into(),
            description: description.into(),
            related_issues: 0,
        }
    }

    pub fn with_related_issues(mut self, count: usize) -> Self {
        self.related_issues = count;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
