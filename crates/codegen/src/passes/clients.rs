//! Client pass
//!
//! Server containers receive hits through clients. GA4 and Google Ads tags
//! both send GA4-formatted requests, so one GA4 client serves them.

use crate::context::GenerationContext;
use tagforge_core::EntityKind;
use tagforge_ir::{Client, MigrationAnalysis, Parameter, Vendor};

/// Type code of the GA4 client
pub const GA4_CLIENT_TYPE: &str = "gaaw_client";

/// Name of the GA4 client, matched by trigger filters on `{{Client Name}}`
pub const GA4_CLIENT_NAME: &str = "GA4";

pub fn generate_clients(ctx: &mut GenerationContext, analysis: &MigrationAnalysis) {
    if analysis.has_ga4 || analysis.has_google_ads {
        let id = ctx.next_id(EntityKind::Client);
        let folder = ctx
            .vendor_folder_id(Vendor::Ga4)
            .or_else(|| ctx.vendor_folder_id(Vendor::GoogleAds))
            .map(str::to_string);

        ctx.clients.push(Client {
            client_id: id,
            name: GA4_CLIENT_NAME.to_string(),
            kind: GA4_CLIENT_TYPE.to_string(),
            parameter: vec![
                Parameter::boolean("activateResponseCompression", true),
                Parameter::boolean("activateGtagSupport", false),
                Parameter::boolean("activateDefaultPaths", true),
                Parameter::template("cookieManagement", "js"),
            ],
            priority: Some(0),
            parent_folder_id: folder,
            ..Default::default()
        });
    } else {
        let other_vendors = [Vendor::Floodlight, Vendor::Facebook, Vendor::LinkedIn, Vendor::MicrosoftAds];
        if other_vendors.iter().any(|v| analysis.has_vendor(*v)) {
            ctx.add_warning(
                "No GA4 client was generated; server tags only fire once a client claims GA4 requests",
            );
        }
    }

    tracing::debug!(clients = ctx.clients().len(), "clients generated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use crate::passes::folders::generate_folders;
    use crate::passes::test_support::context;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ga4_client_in_vendor_folder() {
        let analysis = MigrationAnalysis {
            has_ga4: true,
            has_google_ads: true,
            ..Default::default()
        };
        let mut ctx = context(GeneratorConfig::default());
        generate_folders(&mut ctx, &analysis);
        generate_clients(&mut ctx, &analysis);

        assert_eq!(ctx.clients().len(), 1);
        let client = &ctx.clients()[0];
        assert_eq!(client.kind, "gaaw_client");
        assert_eq!(client.priority, Some(0));
        assert_eq!(client.parent_folder_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_no_client_without_google_vendors() {
        let analysis = MigrationAnalysis {
            has_facebook: true,
            ..Default::default()
        };
        let mut ctx = context(GeneratorConfig::default());
        generate_clients(&mut ctx, &analysis);

        assert!(ctx.clients().is_empty());
        assert_eq!(ctx.summary.warnings.len(), 1);
    }
}
