//! Whole-container rules

use crate::config::AuditConfig;
use crate::issue::Issue;
use crate::rule::Rule;
use crate::rules::ids;
use serde_json::json;
use tagforge_core::{Category, Severity};
use tagforge_ir::{ALL_PAGES_TRIGGER_ID, ContainerModel, Tag, Vendor, detect_vendor};

/// Tag types that send data to advertising platforms
const MARKETING_TAG_TYPES: &[&str] = &["awct", "sp", "gclidw", "flc", "fls", "baut"];

/// Type or name fragments of consent-management tags
const CONSENT_MARKERS: &[&str] = &[
    "consent",
    "cmp",
    "cookiebot",
    "usercentrics",
    "onetrust",
    "didomi",
    "cookielaw",
];

// ============================================================================
// All-pages tags
// ============================================================================

/// Whether a tag fires on every page
pub fn fires_on_all_pages(model: &ContainerModel, tag: &Tag) -> bool {
    tag.firing_trigger_id.iter().any(|id| {
        id == ALL_PAGES_TRIGGER_ID || model.trigger_by_id(id).is_some_and(|t| t.is_all_pages())
    })
}

/// Rule: too many tags loading on every page
pub struct AllPagesTagsRule;

impl Rule for AllPagesTagsRule {
    fn id(&self) -> &'static str {
        ids::TOO_MANY_ALL_PAGES_TAGS
    }

    fn description(&self) -> &'static str {
        "Number of tags firing on every page"
    }

    fn check(&self, model: &ContainerModel, config: &AuditConfig) -> Vec<Issue> {
        let tags: Vec<&str> = model
            .tags()
            .iter()
            .filter(|t| !t.is_paused() && fires_on_all_pages(model, t))
            .map(|t| t.name.as_str())
            .collect();

        if tags.len() <= config.all_pages_threshold {
            return Vec::new();
        }

        vec![
            Issue::new(
                self.id(),
                Severity::Warning,
                Category::Performance,
                format!(
                    "{} tags fire on all pages (threshold {})",
                    tags.len(),
                    config.all_pages_threshold
                ),
            )
            .with_details(json!({ "tags": tags })),
        ]
    }
}

// ============================================================================
// Consent management
// ============================================================================

fn is_marketing_tag(tag: &Tag) -> bool {
    if tag.is_paused() {
        return false;
    }
    MARKETING_TAG_TYPES.contains(&tag.kind.as_str())
        || matches!(
            detect_vendor(tag),
            Some(Vendor::Facebook | Vendor::LinkedIn | Vendor::MicrosoftAds | Vendor::GoogleAds)
        )
}

fn is_consent_tag(tag: &Tag) -> bool {
    let kind = tag.kind.to_lowercase();
    let name = tag.name.to_lowercase();
    CONSENT_MARKERS
        .iter()
        .any(|m| kind.contains(m) || name.contains(m))
}

/// Rule: marketing tags without any consent-management tag
pub struct ConsentManagementRule;

impl Rule for ConsentManagementRule {
    fn id(&self) -> &'static str {
        ids::MISSING_CONSENT_MANAGEMENT
    }

    fn description(&self) -> &'static str {
        "Marketing tags present without consent management"
    }

    fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
        let marketing: Vec<&str> = model
            .tags()
            .iter()
            .filter(|t| is_marketing_tag(t))
            .map(|t| t.name.as_str())
            .collect();

        if marketing.is_empty() || model.tags().iter().any(is_consent_tag) {
            return Vec::new();
        }

        vec![
            Issue::new(
                self.id(),
                Severity::Warning,
                Category::Privacy,
                format!(
                    "{} marketing tags but no consent management tag",
                    marketing.len()
                ),
            )
            .with_details(json!({ "marketingTags": marketing })),
        ]
    }
}

// ============================================================================
// Folders
// ============================================================================

/// Rule: large containers without any folders
pub struct NoFoldersRule;

impl Rule for NoFoldersRule {
    fn id(&self) -> &'static str {
        ids::NO_FOLDERS
    }

    fn description(&self) -> &'static str {
        "Large containers without folders"
    }

    fn check(&self, model: &ContainerModel, config: &AuditConfig) -> Vec<Issue> {
        let count = model.entity_count();
        if !model.folders().is_empty() || count <= config.folder_threshold {
            return Vec::new();
        }

        vec![Issue::new(
            self.id(),
            Severity::Info,
            Category::Structure,
            format!("{} entities and no folders", count),
        )]
    }
}
