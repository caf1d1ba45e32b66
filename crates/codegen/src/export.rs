//! # Export Assembly
//!
//! Wraps the generated entities into the platform's container export
//! document. The shape mirrors a real server container export:
//!
//! ```text
//! {
//!   "exportFormatVersion": 2,
//!   "exportTime": "YYYY-MM-DD HH:MM:SS",
//!   "containerVersion": {
//!     "path", "accountId", "containerId", "containerVersionId",
//!     "container": { …, "usageContext": ["SERVER"], "features": { … } },
//!     "tag", "trigger", "variable", "folder", "builtInVariable",
//!     "client", "customTemplate", "fingerprint"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tagforge_ir::{
    BuiltInVariable, Client, CustomTemplate, EXPORT_FORMAT_VERSION, Folder, Tag, Trigger, Variable,
};

use crate::context::GenerationContext;
use crate::passes::variables::EVENT_DATA_VARIABLE_TYPE;
use crate::summary::GenerationSummary;

/// Layout of `exportTime`
pub const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Built-in variables every generated container enables
const BUILT_IN_VARIABLES: &[(&str, &str)] = &[("CLIENT_NAME", "Client Name"), ("EVENT_NAME", "Event Name")];

// ============================================================================
// Document types
// ============================================================================

/// A complete container export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerExport {
    pub export_format_version: u32,
    pub export_time: String,
    pub container_version: ContainerVersion,
}

/// The `containerVersion` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerVersion {
    pub path: String,
    pub account_id: String,
    pub container_id: String,
    pub container_version_id: String,
    pub container: ContainerInfo,
    pub tag: Vec<Tag>,
    pub trigger: Vec<Trigger>,
    pub variable: Vec<Variable>,
    pub folder: Vec<Folder>,
    pub built_in_variable: Vec<BuiltInVariable>,
    pub client: Vec<Client>,
    pub custom_template: Vec<CustomTemplate>,
    pub fingerprint: String,
}

/// The `container` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub path: String,
    pub account_id: String,
    pub container_id: String,
    pub name: String,
    pub public_id: String,
    pub usage_context: Vec<String>,
    pub fingerprint: String,
    pub features: ContainerFeatures,
}

/// Capability map of a server container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFeatures {
    pub support_user_permissions: bool,
    pub support_environments: bool,
    pub support_workspaces: bool,
    pub support_gtag_configs: bool,
    pub support_built_in_variables: bool,
    pub support_clients: bool,
    pub support_folders: bool,
    pub support_tags: bool,
    pub support_templates: bool,
    pub support_triggers: bool,
    pub support_variables: bool,
    pub support_versions: bool,
    pub support_zones: bool,
    pub support_transformations: bool,
}

impl ContainerFeatures {
    /// Features of a server container
    pub fn server() -> Self {
        Self {
            support_user_permissions: true,
            support_environments: true,
            support_workspaces: true,
            support_gtag_configs: false,
            support_built_in_variables: true,
            support_clients: true,
            support_folders: true,
            support_tags: true,
            support_templates: true,
            support_triggers: true,
            support_variables: true,
            support_versions: true,
            support_zones: false,
            support_transformations: true,
        }
    }
}

impl ContainerExport {
    pub fn tags(&self) -> &[Tag] {
        &self.container_version.tag
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.container_version.trigger
    }

    pub fn variables(&self) -> &[Variable] {
        &self.container_version.variable
    }

    pub fn folders(&self) -> &[Folder] {
        &self.container_version.folder
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Consume a finished context into the export document and its summary.
///
/// Every entity is stamped with the configured account and container ids
/// and the run fingerprint.
pub fn assemble(ctx: GenerationContext) -> (ContainerExport, GenerationSummary) {
    let account_id = ctx.config.account_id.clone();
    let container_id = ctx.config.container_id.clone();
    let fingerprint = ctx.fingerprint().to_string();
    let export_time = ctx.now().format(EXPORT_TIME_FORMAT).to_string();
    let container_path = format!("accounts/{}/containers/{}", account_id, container_id);

    let stamp = Stamp {
        account_id: &account_id,
        container_id: &container_id,
        fingerprint: &fingerprint,
    };

    let mut summary = ctx.summary;
    summary.tags_created = ctx.tags.len();
    summary.triggers_created = ctx.triggers.len();
    summary.constants_created = ctx.variables.iter().filter(|v| v.is_constant()).count();
    summary.event_data_vars_created = ctx
        .variables
        .iter()
        .filter(|v| v.kind == EVENT_DATA_VARIABLE_TYPE)
        .count();
    summary.clients_created = ctx.clients.len();
    summary.templates_created = ctx.templates.len();

    let tags = stamp.apply_all(ctx.tags);
    let triggers = stamp.apply_all(ctx.triggers);
    let variables = stamp.apply_all(ctx.variables);
    let folders = stamp.apply_all(ctx.folders);
    let clients = stamp.apply_all(ctx.clients);
    let templates = stamp.apply_all(ctx.templates);
    let built_in_variables = BUILT_IN_VARIABLES
        .iter()
        .map(|(kind, name)| BuiltInVariable {
            account_id: Some(account_id.clone()),
            container_id: Some(container_id.clone()),
            kind: kind.to_string(),
            name: name.to_string(),
        })
        .collect();

    let export = ContainerExport {
        export_format_version: EXPORT_FORMAT_VERSION,
        export_time,
        container_version: ContainerVersion {
            path: format!("{}/versions/0", container_path),
            account_id: account_id.clone(),
            container_id: container_id.clone(),
            container_version_id: "0".to_string(),
            container: ContainerInfo {
                path: container_path,
                account_id: account_id.clone(),
                container_id: container_id.clone(),
                name: ctx.config.container_name.clone(),
                public_id: ctx.config.public_id.clone(),
                usage_context: vec!["SERVER".to_string()],
                fingerprint: fingerprint.clone(),
                features: ContainerFeatures::server(),
            },
            tag: tags,
            trigger: triggers,
            variable: variables,
            folder: folders,
            built_in_variable: built_in_variables,
            client: clients,
            custom_template: templates,
            fingerprint: fingerprint.clone(),
        },
    };

    (export, summary)
}

/// Ids and fingerprint written onto every entity
struct Stamp<'a> {
    account_id: &'a str,
    container_id: &'a str,
    fingerprint: &'a str,
}

impl Stamp<'_> {
    fn apply_all<T: Stamped>(&self, mut entities: Vec<T>) -> Vec<T> {
        for entity in &mut entities {
            let (account_id, container_id, fingerprint) = entity.stamp_fields();
            *account_id = Some(self.account_id.to_string());
            *container_id = Some(self.container_id.to_string());
            *fingerprint = Some(self.fingerprint.to_string());
        }
        entities
    }
}

/// Entities carrying account, container and fingerprint fields
trait Stamped {
    fn stamp_fields(&mut self) -> (&mut Option<String>, &mut Option<String>, &mut Option<String>);
}

macro_rules! impl_stamped {
    ($($entity:ty),*) => {
        $(impl Stamped for $entity {
            fn stamp_fields(&mut self) -> (&mut Option<String>, &mut Option<String>, &mut Option<String>) {
                (&mut self.account_id, &mut self.container_id, &mut self.fingerprint)
            }
        })*
    };
}

impl_stamped!(Tag, Trigger, Variable, Folder, Client, CustomTemplate);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::passes::test_support::context;
    use pretty_assertions::assert_eq;
    use tagforge_core::EntityKind;

    #[test]
    fn test_document_shape() {
        let mut ctx = context(GeneratorConfig::default().with_ids("12", "34"));
        ctx.add_folder("Settings");
        let id = ctx.next_id(EntityKind::Tag);
        ctx.tags.push(Tag::new(id, "GA4 - All Events", "sgtmgaaw"));
        ctx.ensure_constant("const - transport url", "https://sgtm.example.com");

        let (export, summary) = assemble(ctx);
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(json["exportFormatVersion"], 2);
        assert_eq!(json["exportTime"], "2024-05-01 12:00:00");

        let version = &json["containerVersion"];
        assert_eq!(version["path"], "accounts/12/containers/34/versions/0");
        assert_eq!(version["containerVersionId"], "0");
        assert_eq!(version["fingerprint"], "1714564800000");
        assert_eq!(version["container"]["usageContext"][0], "SERVER");
        assert_eq!(version["container"]["features"]["supportClients"], true);
        assert_eq!(version["container"]["features"]["supportZones"], false);
        assert_eq!(version["builtInVariable"][1]["type"], "EVENT_NAME");
        assert_eq!(version["customTemplate"].as_array().map(Vec::len), Some(0));

        let tag = &version["tag"][0];
        assert_eq!(tag["accountId"], "12");
        assert_eq!(tag["containerId"], "34");
        assert_eq!(tag["fingerprint"], "1714564800000");

        assert_eq!(summary.tags_created, 1);
        assert_eq!(summary.constants_created, 1);
    }

    #[test]
    fn test_all_entities_share_fingerprint() {
        let mut ctx = context(GeneratorConfig::default());
        ctx.add_folder("Settings");
        ctx.add_folder("Event Data");
        ctx.ensure_constant("const - a", "1");

        let (export, _) = assemble(ctx);
        let fingerprints: Vec<Option<&str>> = export
            .folders()
            .iter()
            .map(|f| f.fingerprint.as_deref())
            .chain(export.variables().iter().map(|v| v.fingerprint.as_deref()))
            .collect();
        assert_eq!(fingerprints, vec![Some("1714564800000"); 3]);
    }

    #[test]
    fn test_every_entity_kind_is_stamped() {
        let mut ctx = context(GeneratorConfig::default().with_ids("5", "6"));
        let folder = ctx.add_folder("Settings");
        let tag_id = ctx.next_id(EntityKind::Tag);
        ctx.tags.push(Tag::new(tag_id, "t", "sgtmgaaw"));
        let trigger_id = ctx.next_id(EntityKind::Trigger);
        ctx.triggers.push(Trigger::new(trigger_id, "All Events", "always"));
        let client_id = ctx.next_id(EntityKind::Client);
        ctx.clients.push(Client {
            client_id,
            name: "GA4".to_string(),
            kind: "gaaw_client".to_string(),
            ..Default::default()
        });
        ctx.ensure_constant("const - a", "1");

        let (export, _) = assemble(ctx);
        let version = &export.container_version;
        let stamps: Vec<(Option<&str>, Option<&str>)> = version
            .tag
            .iter()
            .map(|t| (t.account_id.as_deref(), t.container_id.as_deref()))
            .chain(version.trigger.iter().map(|t| (t.account_id.as_deref(), t.container_id.as_deref())))
            .chain(version.variable.iter().map(|v| (v.account_id.as_deref(), v.container_id.as_deref())))
            .chain(version.folder.iter().map(|f| (f.account_id.as_deref(), f.container_id.as_deref())))
            .chain(version.client.iter().map(|c| (c.account_id.as_deref(), c.container_id.as_deref())))
            .collect();
        assert_eq!(stamps, vec![(Some("5"), Some("6")); 5]);
        assert_eq!(version.folder[0].folder_id, folder);
    }
}
