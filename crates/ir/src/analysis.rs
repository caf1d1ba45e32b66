//! Migration analysis
//!
//! The generator's second input: which tags should move to the server
//! container and which vendors they belong to. It can be supplied by an
//! external analysis step as JSON, or derived from a container here.

use crate::container::ContainerModel;
use crate::entity::Tag;
use crate::vendor::{FLOODLIGHT_TAG_TYPES, Vendor, detect_vendor};
use serde::{Deserialize, Serialize};
use tagforge_core::{EngineError, EngineResult};

// ============================================================================
// MigratableTag
// ============================================================================

/// A client-side tag selected for server-side migration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratableTag {
    #[serde(default)]
    pub tag_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub tag_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firing_trigger_id: Vec<String>,
}

impl MigratableTag {
    /// Describe a container tag
    pub fn from_tag(tag: &Tag) -> Self {
        Self {
            tag_id: tag.tag_id.clone(),
            name: tag.name.clone(),
            tag_type: tag.kind.clone(),
            vendor: detect_vendor(tag),
            firing_trigger_id: tag.firing_trigger_id.clone(),
        }
    }

    /// Vendor, falling back to the one implied by the tag type
    pub fn effective_vendor(&self) -> Option<Vendor> {
        self.vendor.or_else(|| Vendor::from_tag_type(&self.tag_type))
    }

    pub fn is_floodlight(&self) -> bool {
        FLOODLIGHT_TAG_TYPES.contains(&self.tag_type.as_str())
    }
}

// ============================================================================
// MigrationAnalysis
// ============================================================================

/// Vendor presence flags plus the tags to migrate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationAnalysis {
    #[serde(rename = "hasGA4", default)]
    pub has_ga4: bool,

    #[serde(default)]
    pub has_google_ads: bool,

    #[serde(default)]
    pub has_floodlight: bool,

    #[serde(default)]
    pub has_facebook: bool,

    #[serde(rename = "hasLinkedIn", default)]
    pub has_linkedin: bool,

    #[serde(default)]
    pub has_microsoft_ads: bool,

    #[serde(default)]
    pub tags_to_migrate: Vec<MigratableTag>,
}

impl MigrationAnalysis {
    /// Parse the external analysis document
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidAnalysis(e.to_string()))
    }

    /// Derive an analysis from a container: every active tag with a
    /// recognised vendor is migratable.
    pub fn from_container(model: &ContainerModel) -> Self {
        let tags = model
            .tags()
            .iter()
            .filter(|t| !t.is_paused())
            .map(MigratableTag::from_tag)
            .filter(|t| t.vendor.is_some())
            .collect();
        Self::from_tags(tags)
    }

    /// Build an analysis whose flags are derived from the given tags
    pub fn from_tags(tags: Vec<MigratableTag>) -> Self {
        let mut analysis = Self {
            tags_to_migrate: tags,
            ..Default::default()
        };
        analysis.recompute_flags();
        analysis
    }

    /// Keep only tags of the allowed vendors and recompute every flag from
    /// what is left. An empty allow-list leaves the analysis untouched.
    pub fn filter_vendors(&self, allowed: &[Vendor]) -> Self {
        if allowed.is_empty() {
            return self.clone();
        }
        let tags = self
            .tags_to_migrate
            .iter()
            .filter(|t| t.effective_vendor().is_some_and(|v| allowed.contains(&v)))
            .cloned()
            .collect();
        Self::from_tags(tags)
    }

    fn recompute_flags(&mut self) {
        let present = |tags: &[MigratableTag], vendor: Vendor| {
            tags.iter().any(|t| t.effective_vendor() == Some(vendor))
        };
        let tags = &self.tags_to_migrate;
        self.has_ga4 = present(tags, Vendor::Ga4);
        self.has_google_ads = present(tags, Vendor::GoogleAds);
        self.has_floodlight = present(tags, Vendor::Floodlight);
        self.has_facebook = present(tags, Vendor::Facebook);
        self.has_linkedin = present(tags, Vendor::LinkedIn);
        self.has_microsoft_ads = present(tags, Vendor::MicrosoftAds);
    }

    /// Presence flag for a vendor
    pub fn has_vendor(&self, vendor: Vendor) -> bool {
        match vendor {
            Vendor::Ga4 => self.has_ga4,
            Vendor::GoogleAds => self.has_google_ads,
            Vendor::Floodlight => self.has_floodlight,
            Vendor::Facebook => self.has_facebook,
            Vendor::LinkedIn => self.has_linkedin,
            Vendor::MicrosoftAds => self.has_microsoft_ads,
        }
    }

    /// Whether any migratable tag is a Floodlight tag
    pub fn has_floodlight_tags(&self) -> bool {
        self.tags_to_migrate.iter().any(MigratableTag::is_floodlight)
    }

    /// Migratable tags of one vendor
    pub fn tags_for(&self, vendor: Vendor) -> impl Iterator<Item = &MigratableTag> {
        self.tags_to_migrate
            .iter()
            .filter(move |t| t.effective_vendor() == Some(vendor))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use pretty_assertions::assert_eq;

    fn migratable(id: &str, tag_type: &str) -> MigratableTag {
        MigratableTag {
            tag_id: id.to_string(),
            name: format!("Tag {}", id),
            tag_type: tag_type.to_string(),
            vendor: None,
            firing_trigger_id: Vec::new(),
        }
    }

    #[test]
    fn test_decode_external_analysis() {
        let analysis = MigrationAnalysis::from_json(
            r#"{"hasGA4": true, "hasLinkedIn": false, "hasGoogleAds": true,
                "tagsToMigrate": [{"tagId": "1", "name": "GA4", "type": "gaawc"}]}"#,
        )
        .unwrap();

        assert!(analysis.has_ga4);
        assert!(analysis.has_google_ads);
        assert!(!analysis.has_facebook);
        assert_eq!(analysis.tags_to_migrate[0].effective_vendor(), Some(Vendor::Ga4));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(MigrationAnalysis::from_json("42").is_err());
    }

    #[test]
    fn test_filter_vendors_recomputes_flags() {
        let analysis = MigrationAnalysis::from_tags(vec![
            migratable("1", "gaawc"),
            migratable("2", "awct"),
            migratable("3", "flc"),
        ]);
        assert!(analysis.has_google_ads && analysis.has_floodlight);

        let filtered = analysis.filter_vendors(&[Vendor::Ga4]);
        assert_eq!(filtered.tags_to_migrate.len(), 1);
        assert!(filtered.has_ga4);
        assert!(!filtered.has_google_ads);
        assert!(!filtered.has_floodlight);
        assert!(!filtered.has_floodlight_tags());
    }

    #[test]
    fn test_empty_allow_list_is_identity() {
        let analysis = MigrationAnalysis {
            has_facebook: true,
            ..Default::default()
        };
        assert_eq!(analysis.filter_vendors(&[]), analysis);
    }

    #[test]
    fn test_from_container() {
        let model = ContainerModel::from_entities(
            vec![
                Tag::new("1", "GA4", "gaawc"),
                Tag::new("2", "FB", "html")
                    .with_parameter(Parameter::template("html", "<script>fbq('init')</script>")),
                Tag::new("3", "Banner", "html")
                    .with_parameter(Parameter::template("html", "<div></div>")),
                Tag::new("4", "Paused Ads", "awct").paused(),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let analysis = MigrationAnalysis::from_container(&model);

        let ids: Vec<&str> = analysis.tags_to_migrate.iter().map(|t| t.tag_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(analysis.has_ga4 && analysis.has_facebook);
        assert!(!analysis.has_google_ads);
        assert_eq!(analysis.tags_for(Vendor::Facebook).count(), 1);
    }
}
