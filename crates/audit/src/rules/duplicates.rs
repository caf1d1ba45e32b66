//! Duplicate detection by content signature

use crate::config::AuditConfig;
use crate::issue::Issue;
use crate::rule::Rule;
use crate::rules::ids;
use serde_json::json;
use std::collections::HashMap;
use tagforge_core::{Category, EntityKind, Identifiable, Named, Severity};
use tagforge_ir::{ContainerEntity, ContainerModel};

/// Groups entities of one kind by signature and reports every group with
/// more than one member. The first entity of a group is kept, the rest are
/// listed as removable.
pub struct DuplicateRule {
    kind: EntityKind,
}

impl DuplicateRule {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    fn entities<'a>(&self, model: &'a ContainerModel) -> Vec<&'a dyn ContainerEntity> {
        match self.kind {
            EntityKind::Tag => model.tags().iter().map(|e| e as &dyn ContainerEntity).collect(),
            EntityKind::Trigger => model
                .triggers()
                .iter()
                .map(|e| e as &dyn ContainerEntity)
                .collect(),
            EntityKind::Variable => model
                .variables()
                .iter()
                .map(|e| e as &dyn ContainerEntity)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Group entities by signature, in order of first appearance
pub fn group_by_signature<'a>(
    entities: &[&'a dyn ContainerEntity],
) -> Vec<(String, Vec<&'a dyn ContainerEntity>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a dyn ContainerEntity>)> = Vec::new();

    for &entity in entities {
        let signature = entity.signature();
        match positions.get(&signature) {
            Some(&index) => groups[index].1.push(entity),
            None => {
                positions.insert(signature.clone(), groups.len());
                groups.push((signature, vec![entity]));
            }
        }
    }

    groups
}

impl Rule for DuplicateRule {
    fn id(&self) -> &'static str {
        match self.kind {
            EntityKind::Trigger => ids::DUPLICATE_TRIGGER,
            EntityKind::Variable => ids::DUPLICATE_VARIABLE,
            _ => ids::DUPLICATE_TAG,
        }
    }

    fn description(&self) -> &'static str {
        match self.kind {
            EntityKind::Trigger => "Triggers with identical content",
            EntityKind::Variable => "Variables with identical content",
            _ => "Tags with identical content",
        }
    }

    fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
        let entities = self.entities(model);

        group_by_signature(&entities)
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(signature, group)| {
                let keep = group[0];
                let removable: Vec<_> = group[1..]
                    .iter()
                    .map(|e| json!({ "id": e.id(), "name": e.name() }))
                    .collect();

                Issue::new(
                    self.id(),
                    Severity::Warning,
                    Category::Cleanup,
                    format!(
                        "{} duplicates found for {} '{}'",
                        group.len(),
                        self.kind.label(),
                        keep.name()
                    ),
                )
                .for_entity(keep)
                .with_details(json!({
                    "signature": signature,
                    "count": group.len(),
                    "keep": { "id": keep.id(), "name": keep.name() },
                    "removable": removable,
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{Parameter, Tag, Variable};

    fn pixel(id: &str) -> Tag {
        Tag::new(id, "Pixel", "img")
            .with_parameter(Parameter::template("url", "https://example.com/p.gif"))
            .with_firing_trigger("2147479553")
    }

    #[test]
    fn test_duplicate_tags_grouped() {
        let model = ContainerModel::from_entities(
            vec![
                pixel("1"),
                Tag::new("2", "Other", "img").with_firing_trigger("2147479553"),
                pixel("3"),
                pixel("4"),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );

        let issues = DuplicateRule::new(EntityKind::Tag).check(&model, &AuditConfig::default());
        assert_eq!(issues.len(), 1);

        let issue = &issues[0];
        assert_eq!(issue.rule_id, "duplicate_tag");
        assert_eq!(issue.entity_id.as_deref(), Some("1"));
        assert!(issue.message.starts_with("3 duplicates found"));

        let details = issue.details.as_ref().unwrap();
        assert_eq!(details["count"], 3);
        assert_eq!(details["removable"][0]["id"], "3");
        assert_eq!(details["removable"][1]["id"], "4");
    }

    #[test]
    fn test_different_content_is_not_duplicate() {
        let model = ContainerModel::from_entities(
            Vec::new(),
            Vec::new(),
            vec![
                Variable::constant("1", "Id", "G-1"),
                Variable::constant("2", "Id", "G-2"),
            ],
            Vec::new(),
        );

        let issues =
            DuplicateRule::new(EntityKind::Variable).check(&model, &AuditConfig::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_group_order_follows_first_appearance() {
        let a = pixel("1");
        let b = Tag::new("2", "Other", "img");
        let c = pixel("3");
        let entities: Vec<&dyn ContainerEntity> = vec![&a, &b, &c];

        let groups = group_by_signature(&entities);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].id(), "2");
    }
}
