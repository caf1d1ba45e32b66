//! Rules engine configuration
//!
//! Thresholds, scoring weights and the rule exclusion set. Every field has a
//! default, so a config file only needs the values it changes.
//!
//! ```toml
//! disabled_rules = ["default_entity_name"]
//! max_reference_depth = 4
//!
//! [scoring.weights]
//! error = 12.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tagforge_core::{EngineError, EngineResult};

/// Rules that ship disabled. They are noisy on typical containers and are
/// opt-in through `enable_rule` or a config file.
pub const DEFAULT_DISABLED_RULES: &[&str] = &["console_log_in_code", "entity_without_folder"];

// ============================================================================
// AuditConfig
// ============================================================================

/// Configuration for a rules engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Rule ids that are not run
    pub disabled_rules: BTreeSet<String>,

    /// Variable reference chains longer than this are flagged
    pub max_reference_depth: usize,

    /// More tags than this on all-pages triggers are flagged
    pub all_pages_threshold: usize,

    /// Containers with more entities than this should use folders
    pub folder_threshold: usize,

    pub scoring: ScoringConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            disabled_rules: DEFAULT_DISABLED_RULES.iter().map(|s| s.to_string()).collect(),
            max_reference_depth: 5,
            all_pages_threshold: 10,
            folder_threshold: 25,
            scoring: ScoringConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(toml_str: &str) -> EngineResult<Self> {
        toml::from_str(toml_str).map_err(|e| EngineError::invalid_config(e.to_string()))
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Run a rule that is disabled by default
    pub fn enable_rule(mut self, rule_id: &str) -> Self {
        self.disabled_rules.remove(rule_id);
        self
    }

    /// Skip a rule
    pub fn disable_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.disabled_rules.insert(rule_id.into());
        self
    }

    /// Set the maximum variable reference depth
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.disabled_rules.contains(rule_id)
    }
}

// ============================================================================
// ScoringConfig
// ============================================================================

/// Penalty weights and normalizing denominators for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: SeverityWeights,
    pub denominators: Denominators,
}

/// Penalty per issue, by severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub error: f64,
    pub warning: f64,
    pub info: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            error: 10.0,
            warning: 5.0,
            info: 1.0,
        }
    }
}

/// Penalty total that brings a score to zero, per score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Denominators {
    pub overall: f64,
    pub cleanup: f64,
    pub performance: f64,
    pub structure: f64,
    pub security: f64,
    pub privacy: f64,
}

impl Default for Denominators {
    fn default() -> Self {
        Self {
            overall: 200.0,
            cleanup: 50.0,
            performance: 40.0,
            structure: 60.0,
            security: 30.0,
            privacy: 30.0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert!(!config.is_enabled("console_log_in_code"));
        assert!(!config.is_enabled("entity_without_folder"));
        assert!(config.is_enabled("tag_without_trigger"));
        assert_eq!(config.max_reference_depth, 5);
        assert_eq!(config.scoring.weights.warning, 5.0);
    }

    #[test]
    fn test_enable_and_disable() {
        let config = AuditConfig::new()
            .enable_rule("console_log_in_code")
            .disable_rule("pii_variable");
        assert!(config.is_enabled("console_log_in_code"));
        assert!(!config.is_enabled("pii_variable"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AuditConfig::from_toml_str(
            r#"
            max_reference_depth = 3

            [scoring.weights]
            error = 20.0
            "#,
        )
        .unwrap();

        assert_eq!(config.max_reference_depth, 3);
        assert_eq!(config.scoring.weights.error, 20.0);
        assert_eq!(config.scoring.weights.info, 1.0);
        assert_eq!(config.all_pages_threshold, 10);
        assert!(!config.is_enabled("console_log_in_code"));
    }

    #[test]
    fn test_toml_replaces_disabled_rules() {
        let config = AuditConfig::from_toml_str("disabled_rules = [\"no_folders\"]").unwrap();
        assert!(config.is_enabled("console_log_in_code"));
        assert!(!config.is_enabled("no_folders"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = AuditConfig::from_toml_str("max_reference_depth = \"deep\"").unwrap_err();
        assert!(err.is_input());
    }
}
