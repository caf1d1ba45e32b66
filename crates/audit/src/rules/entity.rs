//! Table-driven per-entity rules
//!
//! Each row pairs a predicate over a single entity with the severity,
//! category and message of the issue it raises. Adding a check is adding a
//! row.

use crate::config::AuditConfig;
use crate::issue::Issue;
use crate::rule::Rule;
use crate::rules::ids;
use tagforge_core::{Category, EntityKind, Named, Severity};
use tagforge_ir::{ContainerEntity, ContainerModel, keyed_template_values, parameter_value, template_values};

const DEPRECATED_TAG_TYPES: &[&str] = &["ua", "opt"];

/// Parameter keys that carry vendor account or measurement ids
const TRACKING_ID_KEYS: &[&str] = &[
    "measurementId",
    "measurementIdOverride",
    "tagId",
    "trackingId",
    "conversionId",
    "pixelId",
    "partnerId",
    "advertiserId",
];

/// Name fragments suggesting personal data, matched against the lowercased
/// name with spaces, dashes and underscores removed
const PII_NAME_MARKERS: &[&str] = &[
    "email",
    "phone",
    "telefon",
    "firstname",
    "lastname",
    "fullname",
    "surname",
    "address",
    "street",
    "zipcode",
    "postalcode",
    "birthday",
    "dateofbirth",
    "password",
    "creditcard",
    "iban",
    "ssn",
];

/// Variable types that read page, user or request data
const DATA_CAPTURE_VARIABLE_TYPES: &[&str] = &["v", "d", "k", "jsm", "j", "u"];

const DEFAULT_NAME_PREFIXES: &[&str] = &[
    "untitled",
    "unnamed",
    "new tag",
    "new trigger",
    "new variable",
];

// ============================================================================
// EntityRule
// ============================================================================

/// One row of the predicate table
#[derive(Clone)]
pub struct EntityRule {
    pub id: &'static str,
    pub description: &'static str,
    pub applies_to: &'static [EntityKind],
    pub severity: Severity,
    pub category: Category,
    /// Message with `{kind}`, `{name}` and `{type}` placeholders
    pub message: &'static str,
    pub predicate: fn(&dyn ContainerEntity) -> bool,
}

impl EntityRule {
    fn render(&self, entity: &dyn ContainerEntity) -> String {
        self.message
            .replace("{kind}", entity.entity_kind().title())
            .replace("{name}", entity.name())
            .replace("{type}", entity.type_code())
    }

    fn candidates<'a>(&self, model: &'a ContainerModel) -> Vec<&'a dyn ContainerEntity> {
        let mut out: Vec<&'a dyn ContainerEntity> = Vec::new();
        if self.applies_to.contains(&EntityKind::Tag) {
            out.extend(model.tags().iter().map(|e| e as &dyn ContainerEntity));
        }
        if self.applies_to.contains(&EntityKind::Trigger) {
            out.extend(model.triggers().iter().map(|e| e as &dyn ContainerEntity));
        }
        if self.applies_to.contains(&EntityKind::Variable) {
            out.extend(model.variables().iter().map(|e| e as &dyn ContainerEntity));
        }
        out
    }
}

impl Rule for EntityRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn check(&self, model: &ContainerModel, _config: &AuditConfig) -> Vec<Issue> {
        self.candidates(model)
            .into_iter()
            .filter(|entity| (self.predicate)(*entity))
            .map(|entity| {
                Issue::new(self.id, self.severity, self.category, self.render(entity))
                    .for_entity(entity)
            })
            .collect()
    }
}

const TAG: &[EntityKind] = &[EntityKind::Tag];
const VARIABLE: &[EntityKind] = &[EntityKind::Variable];
const TAG_OR_VARIABLE: &[EntityKind] = &[EntityKind::Tag, EntityKind::Variable];
const TAG_TRIGGER_VARIABLE: &[EntityKind] =
    &[EntityKind::Tag, EntityKind::Trigger, EntityKind::Variable];

/// The predicate table
pub const ENTITY_RULES: &[EntityRule] = &[
    EntityRule {
        id: ids::TAG_WITHOUT_TRIGGER,
        description: "Tags without a firing trigger",
        applies_to: TAG,
        severity: Severity::Warning,
        category: Category::Structure,
        message: "Tag '{name}' has no firing trigger and will never fire",
        predicate: has_no_firing_trigger,
    },
    EntityRule {
        id: ids::DEPRECATED_TAG_TYPE,
        description: "Tags of retired tag types",
        applies_to: TAG,
        severity: Severity::Warning,
        category: Category::BestPractice,
        message: "Tag '{name}' uses the deprecated tag type '{type}'",
        predicate: is_deprecated_type,
    },
    EntityRule {
        id: ids::CUSTOM_HTML_DOCUMENT_WRITE,
        description: "Custom HTML calling document.write",
        applies_to: TAG,
        severity: Severity::Warning,
        category: Category::Performance,
        message: "Custom HTML tag '{name}' calls document.write",
        predicate: writes_document,
    },
    EntityRule {
        id: ids::CUSTOM_HTML_EVAL,
        description: "Custom HTML calling eval",
        applies_to: TAG,
        severity: Severity::Warning,
        category: Category::Security,
        message: "Custom HTML tag '{name}' calls eval()",
        predicate: uses_eval,
    },
    EntityRule {
        id: ids::INSECURE_HTTP_URL,
        description: "Resources loaded over plain HTTP",
        applies_to: TAG_OR_VARIABLE,
        severity: Severity::Warning,
        category: Category::Security,
        message: "{kind} '{name}' references an insecure http:// URL",
        predicate: has_insecure_url,
    },
    EntityRule {
        id: ids::HARDCODED_TRACKING_ID,
        description: "Tracking ids typed directly into tags",
        applies_to: TAG,
        severity: Severity::Info,
        category: Category::BestPractice,
        message: "Tag '{name}' hardcodes a tracking id; use a constant variable instead",
        predicate: has_hardcoded_tracking_id,
    },
    EntityRule {
        id: ids::PII_VARIABLE,
        description: "Variables that may capture personal data",
        applies_to: VARIABLE,
        severity: Severity::Warning,
        category: Category::Privacy,
        message: "Variable '{name}' may capture personal data",
        predicate: may_capture_pii,
    },
    EntityRule {
        id: ids::DEFAULT_ENTITY_NAME,
        description: "Entities that kept their default name",
        applies_to: TAG_TRIGGER_VARIABLE,
        severity: Severity::Info,
        category: Category::Naming,
        message: "{kind} '{name}' still has a default name",
        predicate: has_default_name,
    },
    EntityRule {
        id: ids::CONSOLE_LOG_IN_CODE,
        description: "Debug logging left in custom code",
        applies_to: TAG_OR_VARIABLE,
        severity: Severity::Info,
        category: Category::BestPractice,
        message: "{kind} '{name}' contains console.log calls",
        predicate: logs_to_console,
    },
    EntityRule {
        id: ids::ENTITY_WITHOUT_FOLDER,
        description: "Entities not filed in a folder",
        applies_to: TAG_TRIGGER_VARIABLE,
        severity: Severity::Info,
        category: Category::Structure,
        message: "{kind} '{name}' is not in a folder",
        predicate: has_no_folder,
    },
];

// ============================================================================
// Predicates
// ============================================================================

fn custom_html(entity: &dyn ContainerEntity) -> Option<&str> {
    if entity.type_code() == "html" {
        parameter_value(entity.parameters(), "html")
    } else {
        None
    }
}

/// Whether `code` calls `function`, not counting longer identifiers that
/// end in the same name
fn calls(code: &str, function: &str) -> bool {
    let pattern = format!("{}(", function);
    code.match_indices(&pattern).any(|(start, _)| {
        code[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '$'))
    })
}

fn has_no_firing_trigger(entity: &dyn ContainerEntity) -> bool {
    entity.trigger_ids().is_empty()
}

fn is_deprecated_type(entity: &dyn ContainerEntity) -> bool {
    DEPRECATED_TAG_TYPES.contains(&entity.type_code())
}

fn writes_document(entity: &dyn ContainerEntity) -> bool {
    custom_html(entity).is_some_and(|html| html.contains("document.write"))
}

fn uses_eval(entity: &dyn ContainerEntity) -> bool {
    custom_html(entity).is_some_and(|html| calls(html, "eval"))
}

fn has_insecure_url(entity: &dyn ContainerEntity) -> bool {
    template_values(entity.parameters()).iter().any(|value| {
        value
            .match_indices("http://")
            .any(|(start, _)| !value[start..].starts_with("http://www.w3.org"))
    })
}

fn has_hardcoded_tracking_id(entity: &dyn ContainerEntity) -> bool {
    keyed_template_values(entity.parameters())
        .into_iter()
        .any(|(key, value)| {
            TRACKING_ID_KEYS.contains(&key) && !value.trim().is_empty() && !value.contains("{{")
        })
}

fn may_capture_pii(entity: &dyn ContainerEntity) -> bool {
    if !DATA_CAPTURE_VARIABLE_TYPES.contains(&entity.type_code()) {
        return false;
    }
    let normalized: String = entity
        .name()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '.'))
        .collect();
    PII_NAME_MARKERS.iter().any(|m| normalized.contains(m))
}

fn has_default_name(entity: &dyn ContainerEntity) -> bool {
    let name = entity.name().trim().to_lowercase();
    name.is_empty() || DEFAULT_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn logs_to_console(entity: &dyn ContainerEntity) -> bool {
    template_values(entity.parameters())
        .iter()
        .any(|value| value.contains("console.log"))
}

fn has_no_folder(entity: &dyn ContainerEntity) -> bool {
    entity.parent_folder_id().is_none()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{Parameter, Tag, Trigger, Variable};

    fn rule(id: &str) -> &'static EntityRule {
        ENTITY_RULES.iter().find(|r| r.id == id).unwrap()
    }

    fn html_tag(id: &str, html: &str) -> Tag {
        Tag::new(id, format!("HTML {}", id), "html")
            .with_parameter(Parameter::template("html", html))
            .with_firing_trigger("2147479553")
    }

    fn run(id: &str, tags: Vec<Tag>, variables: Vec<Variable>) -> Vec<Issue> {
        let model = ContainerModel::from_entities(tags, Vec::new(), variables, Vec::new());
        rule(id).check(&model, &AuditConfig::default())
    }

    #[test]
    fn test_tag_without_trigger() {
        let issues = run(
            ids::TAG_WITHOUT_TRIGGER,
            vec![
                Tag::new("1", "Orphan", "img"),
                Tag::new("2", "Fires", "img").with_firing_trigger("5"),
            ],
            Vec::new(),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Tag 'Orphan' has no firing trigger and will never fire");
    }

    #[test]
    fn test_deprecated_tag_type() {
        let issues = run(
            ids::DEPRECATED_TAG_TYPE,
            vec![Tag::new("1", "UA Pageview", "ua"), Tag::new("2", "GA4", "gaawc")],
            Vec::new(),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Tag 'UA Pageview' uses the deprecated tag type 'ua'");
    }

    #[test]
    fn test_custom_html_checks() {
        let tags = vec![
            html_tag("1", "<script>document.write('<img>')</script>"),
            html_tag("2", "<script>eval(code)</script>"),
            html_tag("3", "<script>safeEval(code); retrieval(x)</script>"),
        ];
        let writes = run(ids::CUSTOM_HTML_DOCUMENT_WRITE, tags.clone(), Vec::new());
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].entity_id.as_deref(), Some("1"));

        let evals = run(ids::CUSTOM_HTML_EVAL, tags, Vec::new());
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].entity_id.as_deref(), Some("2"));
        assert_eq!(evals[0].category, Category::Security);
    }

    #[test]
    fn test_insecure_http_url() {
        let issues = run(
            ids::INSECURE_HTTP_URL,
            vec![
                html_tag("1", "<img src=\"http://tracker.example/p.gif\">"),
                html_tag("2", "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>"),
            ],
            vec![
                Variable::constant("3", "Endpoint", "http://api.example"),
                Variable::constant("4", "Secure", "https://api.example"),
            ],
        );
        let flagged: Vec<&str> = issues.iter().filter_map(|i| i.entity_id.as_deref()).collect();
        assert_eq!(flagged, vec!["1", "3"]);
        assert_eq!(issues[1].message, "Variable 'Endpoint' references an insecure http:// URL");
    }

    #[test]
    fn test_hardcoded_tracking_id() {
        let issues = run(
            ids::HARDCODED_TRACKING_ID,
            vec![
                Tag::new("1", "Literal", "gaawc")
                    .with_parameter(Parameter::template("measurementId", "G-ABC123")),
                Tag::new("2", "Variable", "gaawc")
                    .with_parameter(Parameter::template("measurementId", "{{GA4 ID}}")),
            ],
            Vec::new(),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entity_id.as_deref(), Some("1"));
        assert_eq!(issues[0].severity, Severity::Info);
    }

    #[test]
    fn test_pii_variable() {
        let issues = run(
            ids::PII_VARIABLE,
            Vec::new(),
            vec![
                Variable::new("1", "DL - User E-Mail", "v"),
                Variable::new("2", "const - email domain", "c"),
                Variable::new("3", "DL - Page Type", "v"),
            ],
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entity_name.as_deref(), Some("DL - User E-Mail"));
    }

    #[test]
    fn test_default_entity_name() {
        let model = ContainerModel::from_entities(
            vec![Tag::new("1", "Untitled Tag", "img")],
            vec![Trigger::new("2", "New Trigger", "click")],
            vec![Variable::new("3", "Page Path", "u")],
            Vec::new(),
        );
        let issues = rule(ids::DEFAULT_ENTITY_NAME).check(&model, &AuditConfig::default());
        let kinds: Vec<_> = issues.iter().filter_map(|i| i.entity_kind).collect();
        assert_eq!(kinds, vec![EntityKind::Tag, EntityKind::Trigger]);
    }

    #[test]
    fn test_console_log_and_folders() {
        let tags = vec![html_tag("1", "<script>console.log('debug')</script>").in_folder("9")];
        assert_eq!(run(ids::CONSOLE_LOG_IN_CODE, tags.clone(), Vec::new()).len(), 1);
        assert!(run(ids::ENTITY_WITHOUT_FOLDER, tags, Vec::new()).is_empty());
        assert_eq!(
            run(ids::ENTITY_WITHOUT_FOLDER, vec![Tag::new("2", "Loose", "img")], Vec::new()).len(),
            1
        );
    }

    #[test]
    fn test_calls_respects_identifier_boundaries() {
        assert!(calls("eval(x)", "eval"));
        assert!(calls("window.eval(x)", "eval"));
        assert!(!calls("myeval(x)", "eval"));
        assert!(!calls("$eval(x)", "eval"));
    }
}
