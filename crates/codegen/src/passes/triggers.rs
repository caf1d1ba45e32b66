//! # Trigger Pass
//!
//! Server triggers (type `always`) are filtered on built-in variables
//! rather than page events. One "All Events" trigger serves the base GA4
//! and conversion-linker tags; every other server tag fires on a trigger
//! for its derived event name, shared by all tags with the same event.
//!
//! ## Event Name Derivation
//!
//! | Client trigger | Event |
//! |----------------|-------|
//! | none, unknown, built-in All Pages | `page_view` |
//! | `pageview`, `domReady`, `windowLoaded` | `page_view` |
//! | `customEvent` | the literal `{{_event}}` match value |
//! | `click`, `linkClick` | `click` |
//! | `formSubmission` | `form_submit` |
//! | `scrollDepth` | `scroll` |
//! | `timer` | `timer` |
//! | anything else | trigger name in snake_case |

use crate::context::GenerationContext;
use crate::passes::TagPlan;
use crate::passes::clients::GA4_CLIENT_NAME;
use heck::ToSnakeCase;
use tagforge_core::EntityKind;
use tagforge_ir::{Condition, ContainerModel, MigratableTag, MigrationAnalysis, Trigger, is_built_in_trigger};

/// Type code of generated triggers
pub const SERVER_TRIGGER_TYPE: &str = "always";

pub const ALL_EVENTS_TRIGGER: &str = "All Events";

/// Built-in variable holding the name of the client that claimed a request
pub const CLIENT_NAME_REFERENCE: &str = "{{Client Name}}";

/// Built-in variable holding the incoming event name
pub const EVENT_NAME_REFERENCE: &str = "{{Event Name}}";

const PAGE_VIEW: &str = "page_view";

// ============================================================================
// Public API
// ============================================================================

pub fn generate_triggers(
    ctx: &mut GenerationContext,
    model: &ContainerModel,
    analysis: &MigrationAnalysis,
    plans: &[TagPlan<'_>],
) {
    let folder = ctx.settings_folder_id().map(str::to_string);

    if analysis.has_ga4 || analysis.has_google_ads {
        let id = ctx.next_id(EntityKind::Trigger);
        let mut trigger = Trigger::new(id.clone(), ALL_EVENTS_TRIGGER, SERVER_TRIGGER_TYPE)
            .with_filter(Condition::equals(CLIENT_NAME_REFERENCE, GA4_CLIENT_NAME));
        trigger.parent_folder_id = folder.clone();
        ctx.triggers.push(trigger);
        ctx.set_all_events_trigger(id);
    }

    for plan in plans.iter().filter(|p| p.kind.creates_tag()) {
        let event = event_name(model, plan.source);
        if ctx.event_trigger_id(&event).is_some() {
            continue;
        }

        let id = ctx.next_id(EntityKind::Trigger);
        let mut trigger = Trigger::new(id.clone(), format!("Event - {}", event), SERVER_TRIGGER_TYPE)
            .with_filter(Condition::equals(EVENT_NAME_REFERENCE, event.clone()))
            .with_filter(Condition::equals(CLIENT_NAME_REFERENCE, GA4_CLIENT_NAME));
        trigger.parent_folder_id = folder.clone();
        ctx.triggers.push(trigger);
        ctx.register_event_trigger(event, id);
    }

    tracing::debug!(triggers = ctx.triggers().len(), "triggers generated");
}

// ============================================================================
// Event names
// ============================================================================

/// Server event name a client tag corresponds to, taken from its first
/// firing trigger
pub fn event_name(model: &ContainerModel, tag: &MigratableTag) -> String {
    let trigger_ids = if tag.firing_trigger_id.is_empty() {
        model
            .tag_by_id(&tag.tag_id)
            .map(|t| t.firing_trigger_id.as_slice())
            .unwrap_or_default()
    } else {
        tag.firing_trigger_id.as_slice()
    };

    let Some(trigger_id) = trigger_ids.first() else {
        return PAGE_VIEW.to_string();
    };
    if is_built_in_trigger(trigger_id) {
        return PAGE_VIEW.to_string();
    }
    match model.trigger_by_id(trigger_id) {
        Some(trigger) => trigger_event_name(trigger),
        None => PAGE_VIEW.to_string(),
    }
}

fn trigger_event_name(trigger: &Trigger) -> String {
    let event = match trigger.kind.as_str() {
        "pageview" | "domReady" | "windowLoaded" => PAGE_VIEW.to_string(),
        "customEvent" => trigger
            .custom_event_name()
            .map(str::to_string)
            .unwrap_or_else(|| trigger.name.to_snake_case()),
        "click" | "linkClick" => "click".to_string(),
        "formSubmission" => "form_submit".to_string(),
        "scrollDepth" => "scroll".to_string(),
        "timer" => "timer".to_string(),
        _ => trigger.name.to_snake_case(),
    };

    if event.is_empty() {
        PAGE_VIEW.to_string()
    } else {
        event
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::passes::folders::generate_folders;
    use crate::passes::plan_tags;
    use crate::passes::test_support::context;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{ALL_PAGES_TRIGGER_ID, Parameter, Tag};

    fn migratable(tag: &Tag) -> MigratableTag {
        MigratableTag::from_tag(tag)
    }

    fn model() -> ContainerModel {
        ContainerModel::from_entities(
            vec![
                Tag::new("1", "Ads Purchase", "awct").with_firing_trigger("10"),
                Tag::new("2", "Ads Lead", "awct").with_firing_trigger("11"),
                Tag::new("3", "Ads Remarketing", "sp").with_firing_trigger(ALL_PAGES_TRIGGER_ID),
                Tag::new("4", "Ads Signup", "awct").with_firing_trigger("10"),
                Tag::new("5", "GA4 Config", "gaawc").with_firing_trigger(ALL_PAGES_TRIGGER_ID),
            ],
            vec![
                Trigger::new("10", "Purchase Event", "customEvent")
                    .with_custom_event_filter(Condition::equals("{{_event}}", "purchase")),
                Trigger::new("11", "Lead Form", "formSubmission"),
                Trigger::new("12", "Hero Banner Visible", "elementVisibility"),
            ],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_event_name_derivation() {
        let model = model();
        let name = |id: &str| event_name(&model, &migratable(model.tag_by_id(id).unwrap()));

        assert_eq!(name("1"), "purchase");
        assert_eq!(name("2"), "form_submit");
        assert_eq!(name("3"), "page_view");

        let visibility = MigratableTag {
            tag_id: "99".to_string(),
            firing_trigger_id: vec!["12".to_string()],
            ..Default::default()
        };
        assert_eq!(event_name(&model, &visibility), "hero_banner_visible");

        let orphan = MigratableTag {
            tag_id: "100".to_string(),
            ..Default::default()
        };
        assert_eq!(event_name(&model, &orphan), "page_view");
    }

    #[test]
    fn test_custom_event_without_literal_uses_trigger_name() {
        let trigger = Trigger::new("1", "Checkout Step", "customEvent")
            .with_custom_event_filter(Condition::equals("{{_event}}", "{{Dynamic Event}}"));
        assert_eq!(trigger_event_name(&trigger), "checkout_step");
    }

    #[test]
    fn test_one_trigger_per_event() {
        let model = model();
        let analysis = MigrationAnalysis::from_container(&model);
        let mut ctx = context(GeneratorConfig::default());
        generate_folders(&mut ctx, &analysis);
        let plans = plan_tags(&ctx, &analysis);
        generate_triggers(&mut ctx, &model, &analysis, &plans);

        let names: Vec<&str> = ctx.triggers().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["All Events", "Event - purchase", "Event - form_submit", "Event - page_view"]
        );
        assert_eq!(ctx.all_events_trigger_id(), Some("1"));
        assert_eq!(ctx.event_trigger_id("purchase"), Some("2"));
        assert!(ctx.triggers().iter().all(|t| t.kind == "always"));
        assert_eq!(ctx.triggers()[1].filter.len(), 2);
        assert_eq!(ctx.triggers()[1].filter[0].arg1(), Some("purchase"));
    }

    #[test]
    fn test_no_triggers_for_empty_analysis() {
        let model = ContainerModel::from_entities(
            vec![Tag::new("1", "Banner", "html").with_parameter(Parameter::template("html", "<div/>"))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let analysis = MigrationAnalysis::from_container(&model);
        let mut ctx = context(GeneratorConfig::default());
        generate_triggers(&mut ctx, &model, &analysis, &[]);
        assert!(ctx.triggers().is_empty());
    }
}
