//! Shared enums for Tagforge
//!
//! These types appear in both the container model and the reports produced
//! on top of it, so they live in the core crate.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// EntityKind
// ============================================================================

/// The kinds of entity a tagging container holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tag,
    Trigger,
    Variable,
    Folder,
    Template,
    Client,
}

impl EntityKind {
    /// All entity kinds in export order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Tag,
            EntityKind::Trigger,
            EntityKind::Variable,
            EntityKind::Folder,
            EntityKind::Template,
            EntityKind::Client,
        ]
    }

    /// Lowercase singular label, used in rule ids and messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Tag => "tag",
            EntityKind::Trigger => "trigger",
            EntityKind::Variable => "variable",
            EntityKind::Folder => "folder",
            EntityKind::Template => "template",
            EntityKind::Client => "client",
        }
    }

    /// Display label with an uppercase first letter
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Tag => "Tag",
            EntityKind::Trigger => "Trigger",
            EntityKind::Variable => "Variable",
            EntityKind::Folder => "Folder",
            EntityKind::Template => "Template",
            EntityKind::Client => "Client",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Severity
// ============================================================================

/// How serious an audit finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Category
// ============================================================================

/// The area of container health an audit finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cleanup,
    Performance,
    Structure,
    Security,
    Privacy,
    Naming,
    BestPractice,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Cleanup => "cleanup",
            Category::Performance => "performance",
            Category::Structure => "structure",
            Category::Security => "security",
            Category::Privacy => "privacy",
            Category::Naming => "naming",
            Category::BestPractice => "best_practice",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Tests
// ============================================================================
