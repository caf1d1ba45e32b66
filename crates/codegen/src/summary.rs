//! Generation summary
//!
//! What a run created, which values still need manual replacement and how
//! each client-side tag was carried over.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant whose value must be filled in by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    /// Constant name
    pub name: String,

    /// Placeholder value written into the constant
    pub placeholder: String,
}

/// How a client-side tag was carried over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingKind {
    /// A server tag of this type was generated
    Created(String),

    /// Folded into one of the base tags
    Covered,

    /// Not carried over
    Skipped,
}

impl MappingKind {
    pub fn label(&self) -> &str {
        match self {
            MappingKind::Created(server_type) => server_type,
            MappingKind::Covered => "covered",
            MappingKind::Skipped => "skipped",
        }
    }
}

/// One row of the tag mapping. Serialized as
/// `{original, serverSide, type}` where `type` is the server tag type,
/// `covered` or `skipped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMappingEntry {
    /// Client-side tag name
    pub original: String,

    /// Server-side tag name, if one serves this tag
    pub server_side: Option<String>,

    pub kind: MappingKind,
}

impl Serialize for TagMappingEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("TagMappingEntry", 3)?;
        state.serialize_field("original", &self.original)?;
        state.serialize_field("serverSide", &self.server_side)?;
        state.serialize_field("type", self.kind.label())?;
        state.end()
    }
}

// ============================================================================
// GenerationSummary
// ============================================================================

/// Report of one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub tags_created: usize,
    pub triggers_created: usize,
    pub constants_created: usize,
    pub event_data_vars_created: usize,
    pub clients_created: usize,
    pub templates_created: usize,
    pub placeholders: Vec<PlaceholderEntry>,
    pub tag_mapping: Vec<TagMappingEntry>,
    pub warnings: Vec<String>,
}

impl GenerationSummary {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Mapping rows of one kind
    pub fn mapped(&self, label: &str) -> Vec<&TagMappingEntry> {
        self.tag_mapping
            .iter()
            .filter(|m| m.kind.label() == label)
            .collect()
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║      Server Container Generation Complete       ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Tags:          {:<33}║\n", self.tags_created));
        out.push_str(&format!("║  Triggers:      {:<33}║\n", self.triggers_created));
        out.push_str(&format!("║  Constants:     {:<33}║\n", self.constants_created));
        out.push_str(&format!("║  Event Data:    {:<33}║\n", self.event_data_vars_created));
        out.push_str(&format!("║  Clients:       {:<33}║\n", self.clients_created));
        out.push_str(&format!("║  Templates:     {:<33}║\n", self.templates_created));
        out.push_str(&format!("║  Placeholders:  {:<33}║\n", self.placeholders.len()));
        out.push_str(&format!("║  Warnings:      {:<33}║\n", self.warnings.len()));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_summary_json_shape() {
        let summary = GenerationSummary {
            tags_created: 2,
            placeholders: vec![PlaceholderEntry {
                name: "const - transport url".to_string(),
                placeholder: "https://<your server container URL>".to_string(),
            }],
            tag_mapping: vec![
                TagMappingEntry {
                    original: "Ads Purchase".to_string(),
                    server_side: Some("Ads Purchase".to_string()),
                    kind: MappingKind::Created("sgtmadsct".to_string()),
                },
                TagMappingEntry {
                    original: "GA4 Config".to_string(),
                    server_side: Some("GA4 - All Events".to_string()),
                    kind: MappingKind::Covered,
                },
            ],
            ..Default::default()
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["tagsCreated"], 2);
        assert_eq!(value["eventDataVarsCreated"], 0);
        assert_eq!(value["placeholders"][0]["name"], "const - transport url");
        assert_eq!(
            value["tagMapping"][0],
            json!({"original": "Ads Purchase", "serverSide": "Ads Purchase", "type": "sgtmadsct"})
        );
        assert_eq!(value["tagMapping"][1]["type"], "covered");
    }

    #[test]
    fn test_display_lists_counts() {
        let summary = GenerationSummary {
            constants_created: 3,
            ..Default::default()
        };
        let text = summary.display();
        assert!(text.contains("Constants:     3"));
        assert_eq!(summary.mapped("covered").len(), 0);
    }
}
