//! Suggestions derived from issues and scores

use crate::issue::{Issue, Priority, Suggestion};
use crate::rules::ids;
use crate::score::ScoreSet;
use tagforge_core::Category;

/// Readiness at which server-side tagging is recommended
pub const SERVER_SIDE_READINESS_THRESHOLD: u8 = 60;

const UNUSED_RULES: &[&str] = &[
    ids::UNUSED_TAG,
    ids::UNUSED_TRIGGER,
    ids::UNUSED_VARIABLE,
    ids::UNUSED_FOLDER,
    ids::UNUSED_TEMPLATE,
];

const DUPLICATE_RULES: &[&str] = &[
    ids::DUPLICATE_TAG,
    ids::DUPLICATE_TRIGGER,
    ids::DUPLICATE_VARIABLE,
];

fn matching<'a>(issues: &'a [Issue], rules: &[&str]) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| rules.contains(&i.rule_id.as_str()))
        .collect()
}

/// Entities a duplicate issue marks as removable
fn removable_count(issue: &Issue) -> usize {
    issue
        .details
        .as_ref()
        .and_then(|d| d.get("removable"))
        .and_then(|r| r.as_array())
        .map_or(0, Vec::len)
}

/// Build suggestions, highest priority first
pub fn build_suggestions(issues: &[Issue], scores: &ScoreSet) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let cycles = matching(issues, &[ids::CIRCULAR_REFERENCE]);
    if !cycles.is_empty() {
        suggestions.push(
            Suggestion::new(
                "break_circular_references",
                Priority::High,
                Category::Structure,
                "Break circular variable references",
                format!(
                    "{} variable cycles found. Variables in a cycle cannot be evaluated.",
                    cycles.len()
                ),
            )
            .with_related_issues(cycles.len()),
        );
    }

    let consent = matching(issues, &[ids::MISSING_CONSENT_MANAGEMENT]);
    if !consent.is_empty() {
        suggestions.push(
            Suggestion::new(
                "add_consent_management",
                Priority::High,
                Category::Privacy,
                "Add consent management",
                "Marketing tags fire without a consent-management tag. Add a CMP and gate marketing tags on consent.",
            )
            .with_related_issues(consent.len()),
        );
    }

    let pii = matching(issues, &[ids::PII_VARIABLE]);
    if !pii.is_empty() {
        suggestions.push(
            Suggestion::new(
                "review_personal_data",
                Priority::High,
                Category::Privacy,
                "Review variables that capture personal data",
                format!("{} variables may read personal data into tags.", pii.len()),
            )
            .with_related_issues(pii.len()),
        );
    }

    let duplicates = matching(issues, DUPLICATE_RULES);
    if !duplicates.is_empty() {
        let removable: usize = duplicates.iter().map(|i| removable_count(i)).sum();
        suggestions.push(
            Suggestion::new(
                "consolidate_duplicates",
                Priority::Medium,
                Category::Cleanup,
                "Consolidate duplicate entities",
                format!(
                    "{} duplicate groups found; {} entities can be removed.",
                    duplicates.len(),
                    removable
                ),
            )
            .with_related_issues(duplicates.len()),
        );
    }

    let all_pages = matching(issues, &[ids::TOO_MANY_ALL_PAGES_TAGS]);
    if !all_pages.is_empty() {
        suggestions.push(
            Suggestion::new(
                "reduce_all_pages_tags",
                Priority::Medium,
                Category::Performance,
                "Reduce tags firing on every page",
                "Fire tags on the pages and events they need, or move them server-side.",
            )
            .with_related_issues(all_pages.len()),
        );
    }

    if scores.server_side_readiness >= SERVER_SIDE_READINESS_THRESHOLD {
        suggestions.push(Suggestion::new(
            "adopt_server_side_tagging",
            Priority::Medium,
            Category::Performance,
            "Move tags to a server container",
            format!(
                "Server-side readiness is {}/100. Vendor tags can be generated for a server container.",
                scores.server_side_readiness
            ),
        ));
    }

    let unused = matching(issues, UNUSED_RULES);
    if !unused.is_empty() {
        suggestions.push(
            Suggestion::new(
                "remove_unused_entities",
                Priority::Low,
                Category::Cleanup,
                "Remove unused entities",
                format!("{} entities are unused or paused and can be removed.", unused.len()),
            )
            .with_related_issues(unused.len()),
        );
    }

    let deep = matching(issues, &[ids::DEEP_VARIABLE_CHAIN]);
    if !deep.is_empty() {
        suggestions.push(
            Suggestion::new(
                "flatten_variable_chains",
                Priority::Low,
                Category::Structure,
                "Flatten long variable chains",
                format!("{} variables sit on top of long reference chains.", deep.len()),
            )
            .with_related_issues(deep.len()),
        );
    }

    suggestions.sort_by_key(|s| s.priority);
    suggestions
}
