//! Reverse-reference index
//!
//! Built once per container by a single extraction pass. Rules ask the index
//! "is X referenced by anything?" and walk the variable graph through it
//! instead of re-scanning parameter strings themselves.

use crate::entity::{Client, ContainerEntity, Tag, Trigger, Variable, custom_template_id};
use crate::parameter::{template_values, trigger_reference_values};
use std::collections::{HashMap, HashSet};
use tagforge_core::{Named, extract_references};

// ============================================================================
// ReferenceIndex
// ============================================================================

/// Which entities are referenced, and by what
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Variable name → variables it references, in first-seen order.
    /// Only edges between variables of this container are kept.
    variable_edges: HashMap<String, Vec<String>>,

    /// Variable names referenced by some other entity
    referenced_variables: HashSet<String>,

    /// Trigger ids referenced by tags or trigger references
    referenced_triggers: HashSet<String>,

    /// Folder ids used as a parent folder
    referenced_folders: HashSet<String>,

    /// Template ids used through a `cvt_` type
    referenced_templates: HashSet<String>,
}

impl ReferenceIndex {
    /// Run the extraction pass over a container's entities
    pub fn build(
        tags: &[Tag],
        triggers: &[Trigger],
        variables: &[Variable],
        clients: &[Client],
    ) -> Self {
        let known_variables: HashSet<&str> = variables.iter().map(|v| v.name.as_str()).collect();
        let mut index = Self::default();

        for tag in tags {
            index.record_entity(tag, None);
            index.referenced_triggers.extend(tag.firing_trigger_id.iter().cloned());
            index.referenced_triggers.extend(tag.blocking_trigger_id.iter().cloned());
        }

        for trigger in triggers {
            index.record_entity(trigger, None);
            for condition in &trigger.conditions() {
                for value in template_values(&condition.parameter) {
                    index.record_variable_refs(value, None);
                }
            }
        }

        for variable in variables {
            index.record_entity(variable, Some(&variable.name));

            let mut edges: Vec<String> = Vec::new();
            for value in template_values(&variable.parameter) {
                for name in extract_references(value) {
                    if known_variables.contains(name.as_str()) && !edges.contains(&name) {
                        edges.push(name);
                    }
                }
            }
            if !edges.is_empty() {
                index.variable_edges.insert(variable.name.clone(), edges);
            }
        }

        for client in clients {
            index.record_entity(client, None);
        }

        index
    }

    fn record_entity<E: ContainerEntity>(&mut self, entity: &E, self_name: Option<&str>) {
        for value in template_values(entity.parameters()) {
            self.record_variable_refs(value, self_name);
        }
        for trigger_id in trigger_reference_values(entity.parameters()) {
            self.referenced_triggers.insert(trigger_id.to_string());
        }
        if let Some(folder_id) = entity.parent_folder_id() {
            self.referenced_folders.insert(folder_id.to_string());
        }
        if let Some(template_id) = custom_template_id(entity.type_code()) {
            self.referenced_templates.insert(template_id.to_string());
        }
    }

    fn record_variable_refs(&mut self, value: &str, self_name: Option<&str>) {
        for name in extract_references(value) {
            // A variable mentioning itself does not make it used
            if Some(name.as_str()) != self_name {
                self.referenced_variables.insert(name);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Variables directly referenced by the named variable
    pub fn variable_edges(&self, name: &str) -> &[String] {
        self.variable_edges
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of variable → variable edges
    pub fn variable_edge_count(&self) -> usize {
        self.variable_edges.values().map(Vec::len).sum()
    }

    pub fn is_variable_referenced(&self, name: &str) -> bool {
        self.referenced_variables.contains(name)
    }

    pub fn is_trigger_referenced(&self, trigger_id: &str) -> bool {
        self.referenced_triggers.contains(trigger_id)
    }

    pub fn is_folder_referenced(&self, folder_id: &str) -> bool {
        self.referenced_folders.contains(folder_id)
    }

    pub fn is_template_referenced(&self, template_id: &str) -> bool {
        self.referenced_templates.contains(template_id)
    }

    /// Variable names referenced anywhere that are not defined in the
    /// container (built-in variables, typos, deleted variables)
    pub fn external_variable_names<'a>(&'a self, variables: &[Variable]) -> Vec<&'a str> {
        let defined: HashSet<&str> = variables.iter().map(|v| v.name()).collect();
        let mut names: Vec<&str> = self
            .referenced_variables
            .iter()
            .map(String::as_str)
            .filter(|n| !defined.contains(n))
            .collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// Tests
// ============================================================================
