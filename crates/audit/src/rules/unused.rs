//! Unused entity rules

use crate::config::AuditConfig;
use crate::issue::Issue;
use crate::rule::Rule;
use crate::rules::ids;
use tagforge_core::{Category, EntityKind, Named, Severity};
use tagforge_ir::{ContainerEntity, ContainerModel};

/// Reports entities of one kind that nothing refers to.
///
/// Tags count as unused when paused. Built-in triggers are never reported.
pub struct UnusedEntityRule {
    kind: EntityKind,
}

impl UnusedEntityRule {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    fn severity(&self) -> Severity {
        match self.kind {
            EntityKind::Trigger | EntityKind::Variable => Severity::Warning,
            _ => Severity::Info,
        }
    }

    fn unused<'a>(&self, model: &'a ContainerModel) -> Vec<&'a dyn ContainerEntity> {
        fn erase<T: ContainerEntity>(items: Vec<&T>) -> Vec<&dyn ContainerEntity> {
            items.into_iter().map(|e| e as &dyn ContainerEntity).collect()
        }

        match self.kind {
            EntityKind::Tag => erase(model.unused_tags()),
            EntityKind::Trigger => erase(model.unused_triggers()),
            EntityKind::Variable => erase(model.unused_variables()),
            EntityKind::Folder => erase(model.unused_folders()),
            EntityKind::Template => erase(model.unused_templates()),
            EntityKind::Client => Vec::new(),
        }
    }

    fn message(&self, entity: &dyn ContainerEntity) -> String {
        match self.kind {
            EntityKind::Tag => format!("Tag '{}' is paused and never fires", entity.name()),
            EntityKind::Folder => format!("Folder '{}' is empty", entity.name()),
            kind => format!("{} '{}' is not used anywhere", kind.title(), entity.name()),
        }
    }
}

impl Rule for UnusedEntityRule {
    fn id(&self) -> &'static str {
        match self.kind {
            EntityKind::Tag => ids::UNUSED_TAG,
            EntityKind::Trigger => ids::UNUSED_TRIGGER,
            EntityKind::Variable => ids::UNUSED_VARIABLE,
            EntityKind::Folder => ids::UNUSED_FOLDER,
            EntityKind::Template | EntityKind::Client => ids::UNUSED_TEMPLATE,
        }
    }

    fn description(&self) -> &'static str {
        match self.kind {
            EntityKind::Tag => "Paused tags",
            EntityKind::Trigger => "Triggers not used by any tag",
            EntityKind::Variable => "Variables not referenced anywhere",
            EntityKind::Folder => "Folders without content",
            EntityKind::Template | EntityKind::Client => "Custom templates without instances",
        }
    }

    fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
        self.unused(model)
            .into_iter()
            .map(|entity| {
                Issue::new(self.id(), self.severity(), Category::Cleanup, self.message(entity))
                    .for_entity(entity)
            })
            .collect()
    }
}
