//! The `Rule` trait and the engine that runs rules over a container

use crate::config::AuditConfig;
use crate::issue::{Issue, Suggestion};
use crate::rules;
use crate::score::{ScoreSet, compute_scores};
use crate::suggestions::build_suggestions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tagforge_core::Severity;
use tagforge_ir::ContainerModel;

// ============================================================================
// Rule Trait
// ============================================================================

/// A single check over a container model.
///
/// Rules are pure: they only read the model and the configuration and
/// return the issues they found.
pub trait Rule {
    /// Stable rule id, used in issues and in the exclusion set
    fn id(&self) -> &'static str;

    /// One-line description of what the rule checks
    fn description(&self) -> &'static str;

    /// Run the rule
    fn check(&self, model: &ContainerModel, config: &AuditConfig) -> Vec<Issue>;
}

// ============================================================================
// AnalysisResult
// ============================================================================

/// Everything one analyzer run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub scores: ScoreSet,
}

impl AnalysisResult {
    /// Issues produced by one rule
    pub fn issues_for(&self, rule_id: &str) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.rule_id == rule_id).collect()
    }

    /// Number of issues of a severity
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Issue counts keyed by rule id
    pub fn counts_by_rule(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.rule_id.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// RuleEngine
// ============================================================================

/// Runs every enabled rule, then scores the findings and derives
/// suggestions
pub struct RuleEngine {
    config: AuditConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Create an engine with the default rule set
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            rules: rules::default_rules(),
        }
    }

    /// Create an engine with default configuration
    pub fn with_defaults() -> Self {
        Self::new(AuditConfig::default())
    }

    /// Create an engine with no rules at all
    pub fn empty(config: AuditConfig) -> Self {
        Self {
            config,
            rules: Vec::new(),
        }
    }

    /// Add a rule
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Every registered rule, enabled or not
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Whether a rule will run
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.config.is_enabled(rule_id)
    }

    /// Analyze a container
    pub fn analyze(&self, model: &ContainerModel) -> AnalysisResult {
        let mut issues = Vec::new();

        for rule in &self.rules {
            if !self.is_enabled(rule.id()) {
                tracing::trace!(rule = rule.id(), "rule disabled, skipping");
                continue;
            }
            let found = rule.check(model, &self.config);
            tracing::debug!(rule = rule.id(), issues = found.len(), "rule finished");
            issues.extend(found);
        }

        let scores = compute_scores(&issues, model, &self.config.scoring);
        let suggestions = build_suggestions(&issues, &scores);

        tracing::info!(
            issues = issues.len(),
            suggestions = suggestions.len(),
            overall = scores.overall,
            "container analyzed",
        );

        AnalysisResult {
            issues,
            suggestions,
            scores,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tagforge_core::Category;
    use tagforge_ir::Tag;

    struct AlwaysRule;

    impl Rule for AlwaysRule {
        fn id(&self) -> &'static str {
            "always"
        }

        fn description(&self) -> &'static str {
            "Reports one error per tag"
        }

        fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
            model
                .tags()
                .iter()
                .map(|t| {
                    Issue::new(self.id(), Severity::Error, Category::Structure, "always")
                        .for_entity(t)
                })
                .collect()
        }
    }

    fn model() -> ContainerModel {
        ContainerModel::from_entities(
            vec![Tag::new("1", "A", "img").with_firing_trigger("2147479553")],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_custom_rule() {
        let mut engine = RuleEngine::empty(AuditConfig::default());
        engine.add_rule(Box::new(AlwaysRule));

        let result = engine.analyze(&model());
        assert_eq!(result.issues.len(), 1);
        assert!(result.has_errors());
        assert_eq!(result.scores.overall, 95);
        assert_eq!(result.counts_by_rule().get("always"), Some(&1));
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let mut engine = RuleEngine::empty(AuditConfig::default().disable_rule("always"));
        engine.add_rule(Box::new(AlwaysRule));

        let result = engine.analyze(&model());
        assert!(result.issues.is_empty());
        assert_eq!(result.scores.overall, 100);
    }

    #[test]
    fn test_default_rule_ids_are_unique() {
        let engine = RuleEngine::with_defaults();
        let mut ids: Vec<&str> = engine.rules().map(|r| r.id()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
