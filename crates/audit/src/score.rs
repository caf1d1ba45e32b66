//! Scoring
//!
//! Every issue costs a severity weight. A score is the total cost scaled by
//! a per-score denominator and subtracted from 100:
//!
//! `score = round(clamp(100 - Σweight × 100 / denominator, 0, 100))`
//!
//! The overall score counts every issue; each sub-score counts only the
//! categories it covers. Server-side readiness is a separate heuristic over
//! the container itself.

use crate::config::{ScoringConfig, SeverityWeights};
use crate::issue::Issue;
use serde::{Deserialize, Serialize};
use tagforge_core::{Category, Severity};
use tagforge_ir::vendor::GA4_TAG_TYPES;
use tagforge_ir::{ContainerModel, Tag, keyed_template_values};

/// Tag types that run heavy client-side code
const CLIENT_HEAVY_TAG_TYPES: &[&str] = &["html", "img"];

/// Tag settings that route hits to a server container
const SERVER_SETTING_KEYS: &[&str] = &["server_container_url", "transport_url"];

const READINESS_BASE: i32 = 50;
const READINESS_PER_HEAVY_TAG: i32 = 5;
const READINESS_HEAVY_TAG_CAP: i32 = 30;
const READINESS_GA4_BONUS: i32 = 15;
const READINESS_SERVER_CONFIG_BONUS: i32 = 20;
const READINESS_CUSTOM_EVENT_BONUS: i32 = 10;

// ============================================================================
// ScoreSet
// ============================================================================

/// All scores of one analysis, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub overall: u8,
    pub cleanup: u8,
    pub performance: u8,
    pub structure: u8,
    pub security: u8,
    pub privacy: u8,
    pub server_side_readiness: u8,
}

impl ScoreSet {
    /// Sub-scores with their labels, in display order
    pub fn categories(&self) -> [(&'static str, u8); 5] {
        [
            ("cleanup", self.cleanup),
            ("performance", self.performance),
            ("structure", self.structure),
            ("security", self.security),
            ("privacy", self.privacy),
        ]
    }
}

// ============================================================================
// Scoring
// ============================================================================

fn weight(weights: &SeverityWeights, severity: Severity) -> f64 {
    match severity {
        Severity::Error => weights.error,
        Severity::Warning => weights.warning,
        Severity::Info => weights.info,
    }
}

/// Score a set of issues against one denominator
pub fn score<'a>(
    issues: impl IntoIterator<Item = &'a Issue>,
    weights: &SeverityWeights,
    denominator: f64,
) -> u8 {
    if denominator <= 0.0 {
        return 100;
    }
    let penalty: f64 = issues.into_iter().map(|i| weight(weights, i.severity)).sum();
    (100.0 - penalty * 100.0 / denominator).clamp(0.0, 100.0).round() as u8
}

fn in_categories<'a>(
    issues: &'a [Issue],
    categories: &'a [Category],
) -> impl Iterator<Item = &'a Issue> {
    issues.iter().filter(|i| categories.contains(&i.category))
}

/// Compute every score for an analysis
pub fn compute_scores(issues: &[Issue], model: &ContainerModel, config: &ScoringConfig) -> ScoreSet {
    let w = &config.weights;
    let d = &config.denominators;

    ScoreSet {
        overall: score(issues, w, d.overall),
        cleanup: score(in_categories(issues, &[Category::Cleanup]), w, d.cleanup),
        performance: score(in_categories(issues, &[Category::Performance]), w, d.performance),
        structure: score(
            in_categories(
                issues,
                &[Category::Structure, Category::Naming, Category::BestPractice],
            ),
            w,
            d.structure,
        ),
        security: score(in_categories(issues, &[Category::Security]), w, d.security),
        privacy: score(in_categories(issues, &[Category::Privacy]), w, d.privacy),
        server_side_readiness: server_side_readiness(model),
    }
}

// ============================================================================
// Server-side readiness
// ============================================================================

fn has_server_setting(tag: &Tag) -> bool {
    keyed_template_values(&tag.parameter)
        .into_iter()
        .any(|(key, value)| {
            let direct = SERVER_SETTING_KEYS.contains(&key) && !value.trim().is_empty();
            // Settings tables store the name in a `parameter`/`name` cell
            let table_row = matches!(key, "parameter" | "name") && SERVER_SETTING_KEYS.contains(&value);
            direct || table_row
        })
}

/// How well a container lends itself to server-side tagging, 0..=100
pub fn server_side_readiness(model: &ContainerModel) -> u8 {
    let active: Vec<&Tag> = model.tags().iter().filter(|t| !t.is_paused()).collect();

    let heavy = active
        .iter()
        .filter(|t| CLIENT_HEAVY_TAG_TYPES.contains(&t.kind.as_str()))
        .count() as i32;

    let mut readiness = READINESS_BASE - (heavy * READINESS_PER_HEAVY_TAG).min(READINESS_HEAVY_TAG_CAP);

    if active.iter().any(|t| GA4_TAG_TYPES.contains(&t.kind.as_str())) {
        readiness += READINESS_GA4_BONUS;
    }
    if active.iter().any(|t| has_server_setting(t)) {
        readiness += READINESS_SERVER_CONFIG_BONUS;
    }
    if model.triggers().iter().any(|t| t.kind == "customEvent") {
        readiness += READINESS_CUSTOM_EVENT_BONUS;
    }

    readiness.clamp(0, 100) as u8
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{Parameter, Trigger};

    fn issue(severity: Severity, category: Category) -> Issue {
        Issue::new("test", severity, category, "m")
    }

    #[test]
    fn test_score_formula() {
        let weights = SeverityWeights::default();
        assert_eq!(score(&Vec::<Issue>::new(), &weights, 200.0), 100);
        assert_eq!(score(&[issue(Severity::Warning, Category::Cleanup)], &weights, 200.0), 98);
        assert_eq!(score(&[issue(Severity::Error, Category::Cleanup)], &weights, 200.0), 95);

        let many: Vec<Issue> = (0..50).map(|_| issue(Severity::Error, Category::Security)).collect();
        assert_eq!(score(&many, &weights, 30.0), 0);
    }

    #[test]
    fn test_sub_scores_are_independent() {
        let issues = vec![
            issue(Severity::Warning, Category::Privacy),
            issue(Severity::Info, Category::Naming),
        ];
        let model = ContainerModel::from_entities(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let scores = compute_scores(&issues, &model, &ScoringConfig::default());

        // 6 × 100 / 200
        assert_eq!(scores.overall, 97);
        // 5 × 100 / 30
        assert_eq!(scores.privacy, 83);
        // 1 × 100 / 60
        assert_eq!(scores.structure, 98);
        assert_eq!(scores.cleanup, 100);
        assert_eq!(scores.security, 100);
    }

    #[test]
    fn test_readiness_baseline_and_penalty() {
        let empty = ContainerModel::from_entities(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        assert_eq!(server_side_readiness(&empty), 50);

        let heavy: Vec<Tag> = (0..8).map(|i| Tag::new(i.to_string(), "HTML", "html")).collect();
        let model = ContainerModel::from_entities(heavy, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(server_side_readiness(&model), 20);
    }

    #[test]
    fn test_readiness_bonuses() {
        let model = ContainerModel::from_entities(
            vec![
                Tag::new("1", "GA4", "googtag")
                    .with_parameter(Parameter::template("tagId", "G-1"))
                    .with_parameter(Parameter::template("server_container_url", "https://sgtm.example")),
            ],
            vec![Trigger::new("2", "purchase", "customEvent")],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(server_side_readiness(&model), 95);
    }

    #[test]
    fn test_server_setting_in_table() {
        let tag = Tag::new("1", "GA4", "googtag").with_parameter(Parameter::list(
            "configSettingsTable",
            vec![Parameter::map(vec![
                Parameter::template("parameter", "server_container_url"),
                Parameter::template("parameterValue", "https://sgtm.example"),
            ])],
        ));
        assert!(has_server_setting(&tag));
        assert!(!has_server_setting(&Tag::new("2", "GA4", "googtag")));
    }
}
