//! Variable reference graph rules

use crate::config::AuditConfig;
use crate::issue::Issue;
use crate::rule::Rule;
use crate::rules::ids;
use serde_json::json;
use std::collections::HashSet;
use tagforge_core::{Category, Severity};
use tagforge_ir::{ContainerModel, ReferenceIndex};

/// Separator used when printing a reference path
pub const PATH_SEPARATOR: &str = " → ";

// ============================================================================
// Cycle detection
// ============================================================================

struct CycleSearch<'a> {
    references: &'a ReferenceIndex,
    visited: HashSet<&'a str>,
    stack: Vec<&'a str>,
    on_stack: HashSet<&'a str>,
    seen: HashSet<Vec<&'a str>>,
    cycles: Vec<Vec<String>>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, node: &'a str) {
        self.visited.insert(node);
        self.stack.push(node);
        self.on_stack.insert(node);

        let references = self.references;
        for next in references.variable_edges(node) {
            let next = next.as_str();
            if self.on_stack.contains(next) {
                self.record(next);
            } else if !self.visited.contains(next) {
                self.visit(next);
            }
        }

        self.stack.pop();
        self.on_stack.remove(node);
    }

    fn record(&mut self, revisited: &'a str) {
        let Some(start) = self.stack.iter().position(|n| *n == revisited) else {
            return;
        };
        let members = &self.stack[start..];

        // Rotations of the same cycle are one cycle
        let mut key = members.to_vec();
        if let Some(min) = (0..key.len()).min_by_key(|&i| key[i]) {
            key.rotate_left(min);
        }
        if !self.seen.insert(key) {
            return;
        }

        let mut path: Vec<String> = members.iter().map(|n| n.to_string()).collect();
        path.push(revisited.to_string());
        self.cycles.push(path);
    }
}

/// Every distinct cycle in the variable reference graph. Each path starts
/// and ends with the same variable.
pub fn find_cycles(model: &ContainerModel) -> Vec<Vec<String>> {
    let mut search = CycleSearch {
        references: model.references(),
        visited: HashSet::new(),
        stack: Vec::new(),
        on_stack: HashSet::new(),
        seen: HashSet::new(),
        cycles: Vec::new(),
    };

    for variable in model.variables() {
        if !search.visited.contains(variable.name.as_str()) {
            search.visit(&variable.name);
        }
    }

    search.cycles
}

/// Rule: variables that reference themselves through a chain
pub struct CircularReferenceRule;

impl Rule for CircularReferenceRule {
    fn id(&self) -> &'static str {
        ids::CIRCULAR_REFERENCE
    }

    fn description(&self) -> &'static str {
        "Variables that reference each other in a cycle"
    }

    fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
        find_cycles(model)
            .into_iter()
            .map(|path| {
                let printed = path.join(PATH_SEPARATOR);
                let issue = Issue::new(
                    self.id(),
                    Severity::Error,
                    Category::Structure,
                    format!("Circular variable reference: {}", printed),
                )
                .with_details(json!({ "path": path }));

                match model.variable_by_name(&path[0]) {
                    Some(variable) => issue.for_entity(variable),
                    None => issue,
                }
            })
            .collect()
    }
}

// ============================================================================
// Reference depth
// ============================================================================

/// Length of the longest reference chain below a variable.
///
/// Each call uses its own visited set so cycles terminate.
pub fn reference_depth(references: &ReferenceIndex, name: &str) -> usize {
    let mut visited = HashSet::new();
    depth_from(references, name, &mut visited)
}

fn depth_from<'a>(
    references: &'a ReferenceIndex,
    name: &'a str,
    visited: &mut HashSet<&'a str>,
) -> usize {
    if !visited.insert(name) {
        return 0;
    }
    references
        .variable_edges(name)
        .iter()
        .map(|child| 1 + depth_from(references, child, visited))
        .max()
        .unwrap_or(0)
}

/// Rule: variable reference chains that are too long to reason about
pub struct DeepVariableChainRule;

impl Rule for DeepVariableChainRule {
    fn id(&self) -> &'static str {
        ids::DEEP_VARIABLE_CHAIN
    }

    fn description(&self) -> &'static str {
        "Variables whose reference chain exceeds the maximum depth"
    }

    fn check(&self, model: &ContainerModel, config: &AuditConfig) -> Vec<Issue> {
        let max = config.max_reference_depth;

        model
            .variables()
            .iter()
            .filter_map(|variable| {
                let depth = reference_depth(model.references(), &variable.name);
                (depth > max).then(|| {
                    Issue::new(
                        self.id(),
                        Severity::Warning,
                        Category::Structure,
                        format!(
                            "Variable '{}' has a reference chain {} levels deep (max {})",
                            variable.name, depth, max
                        ),
                    )
                    .for_entity(variable)
                    .with_details(json!({ "depth": depth, "max": max }))
                })
            })
            .collect()
    }
}
