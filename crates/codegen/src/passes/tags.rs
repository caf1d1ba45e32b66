//! # Tag Pass
//!
//! Maps every migratable client tag to its server-side counterpart.
//!
//! ## Type Mapping
//!
//! | Client | Server |
//! |--------|--------|
//! | `gaawc`, `gaawe`, `googtag` | covered by `GA4 - All Events` (`sgtmgaaw`) |
//! | `gclidw` | covered by `Google Ads - Conversion Linker` (`sgtmadscl`) |
//! | `awct` | `sgtmadsct` |
//! | `sp` | `sgtmadsremarket` |
//! | `flc`, `fls` | `sgtmfl` |
//! | Facebook, LinkedIn, Microsoft Ads | custom template type from the catalogue |
//!
//! Tags that reference settings use `{{constant}}` references; values that
//! could not be found read as human-readable placeholders.

use crate::context::{ConstantKey, ConstantRole, GenerationContext};
use crate::passes::triggers::event_name;
use crate::passes::{constant_for, resolved_param};
use crate::summary::MappingKind;
use tagforge_core::EntityKind;
use tagforge_ir::{ContainerModel, MigratableTag, MigrationAnalysis, Parameter, Tag, Vendor};

pub const GA4_BASE_TAG: &str = "GA4 - All Events";
pub const GA4_BASE_TAG_TYPE: &str = "sgtmgaaw";
pub const CONVERSION_LINKER_TAG: &str = "Google Ads - Conversion Linker";
pub const CONVERSION_LINKER_TAG_TYPE: &str = "sgtmadscl";

/// Firing option stamped on every generated tag
const FIRING_OPTION: &str = "ONCE_PER_EVENT";

// ============================================================================
// Planning
// ============================================================================

/// What a migratable tag becomes on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTagKind {
    /// Served by one of the base tags
    Covered,
    AdsConversion,
    AdsRemarketing,
    Floodlight,
    /// A vendor custom template with this tag type
    Template { vendor: Vendor, type_id: String },
    /// The vendor's template is not in the catalogue
    MissingTemplate(Vendor),
    /// No server-side counterpart
    Unsupported,
}

impl ServerTagKind {
    /// Server tag type, for kinds that produce a tag of their own
    pub fn server_type(&self) -> Option<&str> {
        match self {
            ServerTagKind::AdsConversion => Some("sgtmadsct"),
            ServerTagKind::AdsRemarketing => Some("sgtmadsremarket"),
            ServerTagKind::Floodlight => Some("sgtmfl"),
            ServerTagKind::Template { type_id, .. } => Some(type_id),
            _ => None,
        }
    }

    pub fn creates_tag(&self) -> bool {
        self.server_type().is_some()
    }
}

/// A migratable tag paired with its server-side mapping
#[derive(Debug, Clone, PartialEq)]
pub struct TagPlan<'a> {
    pub source: &'a MigratableTag,
    pub kind: ServerTagKind,
}

/// Decide the server-side mapping of every migratable tag. Needs the
/// template pass to have run.
pub fn plan_tags<'a>(ctx: &GenerationContext, analysis: &'a MigrationAnalysis) -> Vec<TagPlan<'a>> {
    analysis
        .tags_to_migrate
        .iter()
        .map(|source| TagPlan {
            source,
            kind: classify(ctx, source),
        })
        .collect()
}

fn classify(ctx: &GenerationContext, tag: &MigratableTag) -> ServerTagKind {
    let Some(vendor) = tag.effective_vendor() else {
        return ServerTagKind::Unsupported;
    };

    match vendor {
        Vendor::Ga4 => ServerTagKind::Covered,
        Vendor::GoogleAds => match tag.tag_type.as_str() {
            "awct" => ServerTagKind::AdsConversion,
            "sp" => ServerTagKind::AdsRemarketing,
            "gclidw" => ServerTagKind::Covered,
            _ => ServerTagKind::Unsupported,
        },
        Vendor::Floodlight if tag.is_floodlight() => ServerTagKind::Floodlight,
        Vendor::Floodlight => ServerTagKind::Unsupported,
        Vendor::Facebook | Vendor::LinkedIn | Vendor::MicrosoftAds => match ctx.template_type(vendor) {
            Some(type_id) => ServerTagKind::Template {
                vendor,
                type_id: type_id.to_string(),
            },
            None => ServerTagKind::MissingTemplate(vendor),
        },
    }
}

// ============================================================================
// Generation
// ============================================================================

pub fn generate_tags(
    ctx: &mut GenerationContext,
    model: &ContainerModel,
    analysis: &MigrationAnalysis,
    plans: &[TagPlan<'_>],
) {
    let ga4_base = analysis.has_ga4.then(|| base_ga4_tag(ctx));
    let linker = analysis.has_google_ads.then(|| conversion_linker(ctx));

    for plan in plans {
        let source = plan.source;
        match &plan.kind {
            ServerTagKind::Covered => {
                let base = if source.effective_vendor() == Some(Vendor::Ga4) {
                    ga4_base.clone()
                } else {
                    linker.clone()
                };
                ctx.add_mapping(&source.name, base, MappingKind::Covered);
            }
            ServerTagKind::MissingTemplate(_) => {
                ctx.add_mapping(&source.name, None, MappingKind::Skipped);
            }
            ServerTagKind::Unsupported => {
                ctx.add_warning(format!(
                    "Tag '{}' ({}) has no server-side counterpart and was skipped",
                    source.name, source.tag_type
                ));
                ctx.add_mapping(&source.name, None, MappingKind::Skipped);
            }
            kind => {
                let Some(server_type) = kind.server_type().map(str::to_string) else {
                    continue;
                };
                let parameters = server_parameters(ctx, model, source, kind);
                let event = event_name(model, source);
                let trigger = ctx.event_trigger_id(&event).map(str::to_string);
                let folder = source
                    .effective_vendor()
                    .and_then(|v| ctx.vendor_folder_id(v))
                    .map(str::to_string);

                let id = ctx.next_id(EntityKind::Tag);
                let mut tag = Tag::new(id, source.name.clone(), server_type.clone());
                tag.parameter = parameters;
                tag.firing_trigger_id = trigger.into_iter().collect();
                tag.parent_folder_id = folder;
                tag.tag_firing_option = Some(FIRING_OPTION.to_string());
                ctx.tags.push(tag);

                ctx.add_mapping(&source.name, Some(source.name.clone()), MappingKind::Created(server_type));
            }
        }
    }

    tracing::debug!(tags = ctx.tags().len(), "tags generated");
}

fn base_ga4_tag(ctx: &mut GenerationContext) -> String {
    let measurement_id = setting_or(
        ctx,
        GA4_BASE_TAG,
        "measurementId",
        ConstantRole::MeasurementId,
        "<GA4 Measurement ID>",
    );
    let folder = ctx.vendor_folder_id(Vendor::Ga4).map(str::to_string);
    push_base_tag(
        ctx,
        GA4_BASE_TAG,
        GA4_BASE_TAG_TYPE,
        vec![measurement_id, Parameter::boolean("redactVisitorIp", false)],
        folder,
    )
}

fn conversion_linker(ctx: &mut GenerationContext) -> String {
    let folder = ctx.vendor_folder_id(Vendor::GoogleAds).map(str::to_string);
    push_base_tag(
        ctx,
        CONVERSION_LINKER_TAG,
        CONVERSION_LINKER_TAG_TYPE,
        vec![Parameter::boolean("enableCookieOverrides", false)],
        folder,
    )
}

fn push_base_tag(
    ctx: &mut GenerationContext,
    name: &str,
    server_type: &str,
    parameters: Vec<Parameter>,
    folder: Option<String>,
) -> String {
    let id = ctx.next_id(EntityKind::Tag);
    let mut tag = Tag::new(id, name, server_type);
    tag.parameter = parameters;
    tag.firing_trigger_id = ctx.all_events_trigger_id().map(str::to_string).into_iter().collect();
    tag.parent_folder_id = folder;
    tag.tag_firing_option = Some(FIRING_OPTION.to_string());
    ctx.tags.push(tag);
    name.to_string()
}

// ============================================================================
// Parameters
// ============================================================================

/// Fall back to a placeholder and record it in the summary as `<tag> - <key>`
fn placeholder(ctx: &mut GenerationContext, tag_name: &str, key: &str, value: &str) -> String {
    ctx.add_placeholder(format!("{} - {}", tag_name, key), value);
    value.to_string()
}

fn setting_or(
    ctx: &mut GenerationContext,
    tag_name: &str,
    key: &str,
    role: ConstantRole,
    fallback: &str,
) -> Parameter {
    let value = match ctx.constant_reference(&ConstantKey::Setting(role)) {
        Some(reference) => reference,
        None => placeholder(ctx, tag_name, key, fallback),
    };
    Parameter::template(key, value)
}

fn tag_constant_or(
    ctx: &mut GenerationContext,
    source: &MigratableTag,
    key: &str,
    role: ConstantRole,
    fallback: &str,
) -> Parameter {
    let value = match constant_for(ctx, &source.tag_id, role) {
        Some(reference) => reference,
        None => placeholder(ctx, &source.name, key, fallback),
    };
    Parameter::template(key, value)
}

/// Literal value of a source tag parameter, or a recorded placeholder
fn literal_or(
    ctx: &mut GenerationContext,
    model: &ContainerModel,
    source: &MigratableTag,
    key: &str,
    fallback: &str,
) -> Parameter {
    let value = match resolved_param(model, source, &[key]) {
        Some(value) => value.to_string(),
        None => placeholder(ctx, &source.name, key, fallback),
    };
    Parameter::template(key, value)
}

fn server_parameters(
    ctx: &mut GenerationContext,
    model: &ContainerModel,
    source: &MigratableTag,
    kind: &ServerTagKind,
) -> Vec<Parameter> {
    match kind {
        ServerTagKind::AdsConversion => vec![
            tag_constant_or(ctx, source, "conversionId", ConstantRole::ConversionId, "<Google Ads Conversion ID>"),
            tag_constant_or(
                ctx,
                source,
                "conversionLabel",
                ConstantRole::ConversionLabel,
                "<Google Ads Conversion Label>",
            ),
            Parameter::boolean("enableConversionLinker", true),
        ],
        ServerTagKind::AdsRemarketing => vec![
            tag_constant_or(ctx, source, "conversionId", ConstantRole::ConversionId, "<Google Ads Conversion ID>"),
            Parameter::boolean("enableConversionLinker", true),
        ],
        ServerTagKind::Floodlight => vec![
            tag_constant_or(
                ctx,
                source,
                "advertiserId",
                ConstantRole::FloodlightAdvertiserId,
                "<Floodlight Advertiser ID>",
            ),
            literal_or(ctx, model, source, "groupTag", "<Floodlight Group Tag>"),
            literal_or(ctx, model, source, "activityTag", "<Floodlight Activity Tag>"),
        ],
        ServerTagKind::Template { vendor, .. } => template_parameters(ctx, &source.name, *vendor),
        _ => Vec::new(),
    }
}

fn template_parameters(ctx: &mut GenerationContext, tag_name: &str, vendor: Vendor) -> Vec<Parameter> {
    match vendor {
        Vendor::Facebook => vec![
            setting_or(ctx, tag_name, "pixelId", ConstantRole::FacebookPixelId, "<Facebook Pixel ID>"),
            setting_or(
                ctx,
                tag_name,
                "accessToken",
                ConstantRole::FacebookAccessToken,
                "<Facebook Conversions API access token>",
            ),
            Parameter::template("eventNameSetupMethod", "inherit"),
            Parameter::template("actionSource", "website"),
        ],
        Vendor::LinkedIn => vec![
            setting_or(ctx, tag_name, "partnerId", ConstantRole::LinkedInPartnerId, "<LinkedIn Partner ID>"),
            setting_or(
                ctx,
                tag_name,
                "accessToken",
                ConstantRole::LinkedInAccessToken,
                "<LinkedIn Conversions API access token>",
            ),
        ],
        Vendor::MicrosoftAds => vec![setting_or(
            ctx,
            tag_name,
            "tagId",
            ConstantRole::MicrosoftUetTagId,
            "<Microsoft Ads UET Tag ID>",
        )],
        _ => Vec::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::catalog::{StaticCatalog, TemplateEntry};
    use crate::passes::clients::generate_clients;
    use crate::passes::constants::generate_constants;
    use crate::passes::folders::generate_folders;
    use crate::passes::templates::generate_templates;
    use crate::passes::test_support::context;
    use crate::passes::triggers::generate_triggers;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{Condition, Trigger};

    fn catalog() -> StaticCatalog {
        StaticCatalog::new().with_entry(
            "facebook",
            TemplateEntry {
                type_id: "cvt_fb_capi".to_string(),
                display_name: "Facebook Conversions API".to_string(),
                template_data_encoded: "___INFO___".to_string(),
            },
        )
    }

    fn run(model: &ContainerModel, catalog: &StaticCatalog) -> GenerationContext {
        let analysis = MigrationAnalysis::from_container(model);
        let mut ctx = context(GeneratorConfig::default());
        generate_folders(&mut ctx, &analysis);
        generate_constants(&mut ctx, model, &analysis);
        generate_templates(&mut ctx, &analysis, catalog);
        generate_clients(&mut ctx, &analysis);
        let plans = plan_tags(&ctx, &analysis);
        generate_triggers(&mut ctx, model, &analysis, &plans);
        generate_tags(&mut ctx, model, &analysis, &plans);
        ctx
    }

    fn mixed_model() -> ContainerModel {
        ContainerModel::from_entities(
            vec![
                Tag::new("1", "GA4 Config", "gaawc")
                    .with_parameter(Parameter::template("measurementId", "G-ABC"))
                    .with_firing_trigger("2147479553"),
                Tag::new("2", "Ads Purchase", "awct")
                    .with_parameter(Parameter::template("conversionId", "123"))
                    .with_parameter(Parameter::template("conversionLabel", "xyz"))
                    .with_firing_trigger("10"),
                Tag::new("3", "Ads Linker", "gclidw").with_firing_trigger("2147479553"),
                Tag::new("4", "FB Pixel", "html")
                    .with_parameter(Parameter::template("html", "<script>fbq('track', 'Purchase');</script>"))
                    .with_firing_trigger("10"),
            ],
            vec![Trigger::new("10", "Purchase", "customEvent")
                .with_custom_event_filter(Condition::equals("{{_event}}", "purchase"))],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_type_mapping() {
        let ctx = run(&mixed_model(), &catalog());

        let tags: Vec<(&str, &str)> = ctx
            .tags()
            .iter()
            .map(|t| (t.name.as_str(), t.kind.as_str()))
            .collect();
        assert_eq!(
            tags,
            vec![
                ("GA4 - All Events", "sgtmgaaw"),
                ("Google Ads - Conversion Linker", "sgtmadscl"),
                ("Ads Purchase", "sgtmadsct"),
                ("FB Pixel", "cvt_fb_capi"),
            ]
        );

        let mapping: Vec<&str> = ctx.summary.tag_mapping.iter().map(|m| m.kind.label()).collect();
        assert_eq!(mapping, vec!["covered", "sgtmadsct", "covered", "cvt_fb_capi"]);
        assert_eq!(
            ctx.summary.tag_mapping[2].server_side.as_deref(),
            Some("Google Ads - Conversion Linker")
        );
    }

    #[test]
    fn test_parameters_reference_constants() {
        let ctx = run(&mixed_model(), &catalog());

        let base = &ctx.tags()[0];
        assert_eq!(base.param("measurementId"), Some("{{const - ga4 measurement id}}"));
        assert_eq!(base.firing_trigger_id, vec![ctx.all_events_trigger_id().unwrap().to_string()]);

        let conversion = &ctx.tags()[2];
        assert_eq!(conversion.param("conversionId"), Some("{{const - google ads conversion id}}"));
        assert_eq!(
            conversion.param("conversionLabel"),
            Some("{{const - google ads conversion label - Ads Purchase}}")
        );
        assert_eq!(conversion.firing_trigger_id, vec![ctx.event_trigger_id("purchase").unwrap().to_string()]);

        let facebook = &ctx.tags()[3];
        assert_eq!(facebook.param("pixelId"), Some("{{const - facebook pixel id}}"));
        assert_eq!(facebook.param("actionSource"), Some("website"));
        assert_eq!(facebook.parent_folder_id.as_deref(), ctx.vendor_folder_id(Vendor::Facebook));
    }

    #[test]
    fn test_missing_template_skips_vendor_tags() {
        let ctx = run(&mixed_model(), &StaticCatalog::new());

        assert!(ctx.tags().iter().all(|t| t.name != "FB Pixel"));
        let skipped = ctx.summary.mapped("skipped");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].original, "FB Pixel");
        assert!(ctx.summary.warnings.iter().any(|w| w.contains("Facebook")));
    }

    #[test]
    fn test_floodlight_parameters() {
        let model = ContainerModel::from_entities(
            vec![Tag::new("1", "FL Sale", "fls")
                .with_parameter(Parameter::template("advertiserId", "998877"))
                .with_parameter(Parameter::template("groupTag", "sales"))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let ctx = run(&model, &StaticCatalog::new());

        let tag = &ctx.tags()[0];
        assert_eq!(tag.kind, "sgtmfl");
        assert_eq!(tag.param("advertiserId"), Some("{{const - floodlight advertiser id}}"));
        assert_eq!(tag.param("groupTag"), Some("sales"));
        assert_eq!(tag.param("activityTag"), Some("<Floodlight Activity Tag>"));
    }

    #[test]
    fn test_inline_placeholders_are_reported() {
        let model = ContainerModel::from_entities(
            vec![Tag::new("1", "FL Sale", "fls").with_parameter(Parameter::template("advertiserId", "998877"))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let ctx = run(&model, &StaticCatalog::new());

        let tag = &ctx.tags()[0];
        assert_eq!(tag.param("groupTag"), Some("<Floodlight Group Tag>"));

        let placeholders: Vec<(&str, &str)> = ctx
            .summary
            .placeholders
            .iter()
            .map(|p| (p.name.as_str(), p.placeholder.as_str()))
            .collect();
        assert!(placeholders.contains(&("FL Sale - groupTag", "<Floodlight Group Tag>")));
        assert!(placeholders.contains(&("FL Sale - activityTag", "<Floodlight Activity Tag>")));
    }

    #[test]
    fn test_resolved_parameters_add_no_placeholders() {
        let ctx = run(&mixed_model(), &catalog());
        assert!(ctx.summary.placeholders.iter().all(|p| !p.name.starts_with("Ads Purchase - ")));
        assert!(ctx.summary.placeholders.iter().all(|p| !p.name.starts_with("FB Pixel - ")));
    }
}
