//! # Tagforge Audit
//!
//! Static analysis of tagging containers: a set of independent rules runs
//! over a [`ContainerModel`], the findings are scored, and suggestions are
//! derived from both.
//!
//! ```ignore
//! use tagforge_audit::{analyze, AuditConfig, RuleEngine};
//!
//! let result = analyze(&model);
//! println!("overall score {}", result.scores.overall);
//!
//! let strict = RuleEngine::new(AuditConfig::default().enable_rule("entity_without_folder"));
//! let result = strict.analyze(&model);
//! ```

pub mod config;
pub mod issue;
pub mod rule;
pub mod rules;
pub mod score;
pub mod suggestions;

pub use config::{AuditConfig, DEFAULT_DISABLED_RULES, Denominators, ScoringConfig, SeverityWeights};
pub use issue::{Issue, Priority, Suggestion};
pub use rule::{AnalysisResult, Rule, RuleEngine};
pub use score::{ScoreSet, compute_scores, server_side_readiness};
pub use suggestions::build_suggestions;

use tagforge_ir::ContainerModel;

/// Analyze a container with the default configuration
pub fn analyze(model: &ContainerModel) -> AnalysisResult {
    RuleEngine::with_defaults().analyze(model)
}

// ============================================================================
// Tests
// ============================================================================
