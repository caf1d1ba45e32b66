//! # Constant Pass
//!
//! Hardcoded vendor ids become named constant variables (type `c`) in the
//! settings folder. Literals are deduplicated by value, so two tags sharing
//! a conversion id share one constant; `{{Var}}` values are followed through
//! the source container's constant variables.
//!
//! Every constant is bound to a [`ConstantKey`] so the tag pass can look up
//! the reference for a source tag (or fall back to the container-wide
//! setting). When no literal can be found a placeholder constant is created
//! and listed in the summary.
//!
//! | Constant | Source |
//! |----------|--------|
//! | `const - ga4 measurement id` | `measurementId` / `tagId` of GA4 tags |
//! | `const - google ads conversion id` | `conversionId` of Ads tags, `AW-` tag ids |
//! | `const - google ads conversion label - <tag>` | `conversionLabel` per conversion tag |
//! | `const - floodlight advertiser id` | `advertiserId` of Floodlight tags |
//! | `const - facebook pixel id` / `access token` | placeholder |
//! | `const - linkedin partner id` / `access token` | placeholder |
//! | `const - microsoft ads uet tag id` | placeholder |
//! | `const - transport url` | configured server URL or placeholder |

use crate::context::{ConstantKey, ConstantRole, GenerationContext};
use crate::passes::resolved_param;
use tagforge_ir::{ContainerModel, MigrationAnalysis, Vendor};

pub const MEASUREMENT_ID_CONSTANT: &str = "const - ga4 measurement id";
pub const CONVERSION_ID_CONSTANT: &str = "const - google ads conversion id";
pub const CONVERSION_LABEL_CONSTANT: &str = "const - google ads conversion label";
pub const FLOODLIGHT_ADVERTISER_CONSTANT: &str = "const - floodlight advertiser id";
pub const TRANSPORT_URL_CONSTANT: &str = "const - transport url";

const MEASUREMENT_ID_KEYS: &[&str] = &["measurementId", "tagId", "measurementIdOverride"];
const ADS_ID_PREFIX: &str = "AW-";

/// Vendor settings that are never present in a client container
const VENDOR_PLACEHOLDERS: &[(Vendor, ConstantRole, &str, &str)] = &[
    (
        Vendor::Facebook,
        ConstantRole::FacebookPixelId,
        "const - facebook pixel id",
        "<Facebook Pixel ID>",
    ),
    (
        Vendor::Facebook,
        ConstantRole::FacebookAccessToken,
        "const - facebook access token",
        "<Facebook Conversions API access token>",
    ),
    (
        Vendor::LinkedIn,
        ConstantRole::LinkedInPartnerId,
        "const - linkedin partner id",
        "<LinkedIn Partner ID>",
    ),
    (
        Vendor::LinkedIn,
        ConstantRole::LinkedInAccessToken,
        "const - linkedin access token",
        "<LinkedIn Conversions API access token>",
    ),
    (
        Vendor::MicrosoftAds,
        ConstantRole::MicrosoftUetTagId,
        "const - microsoft ads uet tag id",
        "<Microsoft Ads UET Tag ID>",
    ),
];

// ============================================================================
// Public API
// ============================================================================

pub fn generate_constants(ctx: &mut GenerationContext, model: &ContainerModel, analysis: &MigrationAnalysis) {
    if analysis.has_ga4 {
        measurement_ids(ctx, model, analysis);
    }
    if analysis.has_google_ads {
        conversion_ids(ctx, model, analysis);
        conversion_labels(ctx, model, analysis);
    }
    if analysis.has_floodlight_tags() {
        floodlight_advertiser(ctx, model, analysis);
    }

    for (vendor, role, name, placeholder) in VENDOR_PLACEHOLDERS {
        if analysis.has_vendor(*vendor) {
            let name = ctx.ensure_placeholder_constant(name, placeholder);
            ctx.bind_constant(ConstantKey::Setting(*role), name);
        }
    }

    transport_url(ctx);

    tracing::debug!(constants = ctx.constant_count(), "constants generated");
}

// ============================================================================
// GA4
// ============================================================================

fn measurement_ids(ctx: &mut GenerationContext, model: &ContainerModel, analysis: &MigrationAnalysis) {
    for tag in analysis.tags_for(Vendor::Ga4) {
        let Some(value) = resolved_param(model, tag, MEASUREMENT_ID_KEYS) else {
            continue;
        };
        if value.starts_with(ADS_ID_PREFIX) {
            continue;
        }
        let (name, _) = ctx.ensure_constant(MEASUREMENT_ID_CONSTANT, value);
        ctx.bind_constant(ConstantKey::tag(&tag.tag_id, ConstantRole::MeasurementId), name.clone());
        ctx.bind_constant(ConstantKey::Setting(ConstantRole::MeasurementId), name);
    }

    let setting = ConstantKey::Setting(ConstantRole::MeasurementId);
    if ctx.constant_reference(&setting).is_none() {
        let name = ctx.ensure_placeholder_constant(MEASUREMENT_ID_CONSTANT, "<GA4 Measurement ID>");
        ctx.bind_constant(setting, name);
    }
}

// ============================================================================
// Google Ads
// ============================================================================

fn conversion_ids(ctx: &mut GenerationContext, model: &ContainerModel, analysis: &MigrationAnalysis) {
    let ads_tags = analysis.tags_for(Vendor::GoogleAds);
    let google_tags = analysis
        .tags_for(Vendor::Ga4)
        .filter(|t| t.tag_type == "googtag");

    for tag in ads_tags.chain(google_tags) {
        let value = if tag.tag_type == "googtag" {
            resolved_param(model, tag, &["tagId"]).filter(|v| v.starts_with(ADS_ID_PREFIX))
        } else {
            resolved_param(model, tag, &["conversionId"])
        };
        let Some(value) = value else {
            continue;
        };
        let (name, _) = ctx.ensure_constant(CONVERSION_ID_CONSTANT, value);
        ctx.bind_constant(ConstantKey::tag(&tag.tag_id, ConstantRole::ConversionId), name.clone());
        ctx.bind_constant(ConstantKey::Setting(ConstantRole::ConversionId), name);
    }

    let setting = ConstantKey::Setting(ConstantRole::ConversionId);
    let needs_id = analysis
        .tags_for(Vendor::GoogleAds)
        .any(|t| matches!(t.tag_type.as_str(), "awct" | "sp"));
    if needs_id && ctx.constant_reference(&setting).is_none() {
        let name = ctx.ensure_placeholder_constant(CONVERSION_ID_CONSTANT, "<Google Ads Conversion ID>");
        ctx.bind_constant(setting, name);
    }
}

fn conversion_labels(ctx: &mut GenerationContext, model: &ContainerModel, analysis: &MigrationAnalysis) {
    for tag in analysis.tags_for(Vendor::GoogleAds).filter(|t| t.tag_type == "awct") {
        let base = format!("{} - {}", CONVERSION_LABEL_CONSTANT, tag.name);
        let name = match resolved_param(model, tag, &["conversionLabel"]) {
            Some(label) => ctx.ensure_constant(&base, label).0,
            None => {
                let placeholder = format!("<Conversion label for {}>", tag.name);
                ctx.ensure_placeholder_constant(&base, &placeholder)
            }
        };
        ctx.bind_constant(ConstantKey::tag(&tag.tag_id, ConstantRole::ConversionLabel), name);
    }
}

// ============================================================================
// Floodlight
// ============================================================================

fn floodlight_advertiser(ctx: &mut GenerationContext, model: &ContainerModel, analysis: &MigrationAnalysis) {
    for tag in analysis.tags_to_migrate.iter().filter(|t| t.is_floodlight()) {
        let Some(value) = resolved_param(model, tag, &["advertiserId"]) else {
            continue;
        };
        let (name, _) = ctx.ensure_constant(FLOODLIGHT_ADVERTISER_CONSTANT, value);
        ctx.bind_constant(
            ConstantKey::tag(&tag.tag_id, ConstantRole::FloodlightAdvertiserId),
            name.clone(),
        );
        ctx.bind_constant(ConstantKey::Setting(ConstantRole::FloodlightAdvertiserId), name);
    }

    let setting = ConstantKey::Setting(ConstantRole::FloodlightAdvertiserId);
    if ctx.constant_reference(&setting).is_none() {
        let name = ctx.ensure_placeholder_constant(FLOODLIGHT_ADVERTISER_CONSTANT, "<Floodlight Advertiser ID>");
        ctx.bind_constant(setting, name);
    }
}

// ============================================================================
// Transport URL
// ============================================================================

fn transport_url(ctx: &mut GenerationContext) {
    let name = match ctx.config.transport_url.clone().filter(|u| !u.trim().is_empty()) {
        Some(url) => ctx.ensure_constant(TRANSPORT_URL_CONSTANT, url.trim()).0,
        None => ctx.ensure_placeholder_constant(TRANSPORT_URL_CONSTANT, crate::TRANSPORT_URL_PLACEHOLDER),
    };
    ctx.bind_constant(ConstantKey::Setting(ConstantRole::TransportUrl), name);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::passes::folders::generate_folders;
    use crate::passes::test_support::context;
    use pretty_assertions::assert_eq;
    use tagforge_ir::{Parameter, Tag, Variable};

    fn run(model: &ContainerModel, config: GeneratorConfig) -> GenerationContext {
        let analysis = MigrationAnalysis::from_container(model);
        let mut ctx = context(config);
        generate_folders(&mut ctx, &analysis);
        generate_constants(&mut ctx, model, &analysis);
        ctx
    }

    fn constant_names(ctx: &GenerationContext) -> Vec<&str> {
        ctx.variables().iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_shared_conversion_id_is_one_constant() {
        let model = ContainerModel::from_entities(
            vec![
                Tag::new("1", "Ads Purchase", "awct")
                    .with_parameter(Parameter::template("conversionId", "123456"))
                    .with_parameter(Parameter::template("conversionLabel", "abc")),
                Tag::new("2", "Ads Lead", "awct")
                    .with_parameter(Parameter::template("conversionId", "123456"))
                    .with_parameter(Parameter::template("conversionLabel", "def")),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let ctx = run(&model, GeneratorConfig::default());

        assert_eq!(
            constant_names(&ctx),
            vec![
                "const - google ads conversion id",
                "const - google ads conversion label - Ads Purchase",
                "const - google ads conversion label - Ads Lead",
                "const - transport url",
            ]
        );
        let first = ctx.constant_reference(&ConstantKey::tag("1", ConstantRole::ConversionId));
        let second = ctx.constant_reference(&ConstantKey::tag("2", ConstantRole::ConversionId));
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("{{const - google ads conversion id}}"));
    }

    #[test]
    fn test_measurement_id_resolved_through_constant_variable() {
        let model = ContainerModel::from_entities(
            vec![Tag::new("1", "GA4 Config", "gaawc")
                .with_parameter(Parameter::template("measurementId", "{{GA4 ID}}"))],
            Vec::new(),
            vec![Variable::constant("10", "GA4 ID", "G-TEST123")],
            Vec::new(),
        );
        let ctx = run(&model, GeneratorConfig::default());

        let constant = ctx
            .variables()
            .iter()
            .find(|v| v.name == MEASUREMENT_ID_CONSTANT)
            .unwrap();
        assert_eq!(constant.constant_value(), Some("G-TEST123"));
        assert_eq!(constant.parent_folder_id.as_deref(), ctx.settings_folder_id());
    }

    #[test]
    fn test_distinct_measurement_ids_are_numbered() {
        let model = ContainerModel::from_entities(
            vec![
                Tag::new("1", "GA4 A", "gaawc").with_parameter(Parameter::template("measurementId", "G-A")),
                Tag::new("2", "GA4 B", "gaawc").with_parameter(Parameter::template("measurementId", "G-B")),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let ctx = run(&model, GeneratorConfig::default());
        assert_eq!(
            &constant_names(&ctx)[..2],
            &["const - ga4 measurement id", "const - ga4 measurement id 2"]
        );
    }

    #[test]
    fn test_missing_values_become_placeholders() {
        let model = ContainerModel::from_entities(
            vec![
                Tag::new("1", "GA4 Config", "gaawc")
                    .with_parameter(Parameter::template("measurementId", "{{Lookup Table}}")),
                Tag::new("2", "Pixel", "html")
                    .with_parameter(Parameter::template("html", "<script>fbq('init', '1');</script>")),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let ctx = run(&model, GeneratorConfig::default());

        let placeholders: Vec<&str> = ctx.summary.placeholders.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            placeholders,
            vec![
                "const - ga4 measurement id",
                "const - facebook pixel id",
                "const - facebook access token",
                "const - transport url",
            ]
        );
    }

    #[test]
    fn test_configured_transport_url() {
        let model = ContainerModel::from_entities(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let ctx = run(
            &model,
            GeneratorConfig::default().with_transport_url("https://sgtm.example.com"),
        );

        assert_eq!(constant_names(&ctx), vec!["const - transport url"]);
        assert_eq!(ctx.variables()[0].constant_value(), Some("https://sgtm.example.com"));
        assert!(ctx.summary.placeholders.is_empty());
    }
}
