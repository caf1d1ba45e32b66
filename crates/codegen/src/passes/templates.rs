//! Custom template pass
//!
//! Vendors without a built-in server tag type get a custom template from
//! the injected catalogue. A catalogue miss emits no template; the vendor's
//! tags are later skipped and the miss is reported as a warning.

use crate::catalog::TemplateCatalog;
use crate::context::GenerationContext;
use tagforge_core::EntityKind;
use tagforge_ir::{CustomTemplate, MigrationAnalysis, Vendor};

pub fn generate_templates(
    ctx: &mut GenerationContext,
    analysis: &MigrationAnalysis,
    catalog: &dyn TemplateCatalog,
) {
    let vendors = Vendor::all()
        .iter()
        .filter(|v| v.needs_custom_template() && analysis.has_vendor(**v));

    for vendor in vendors {
        let Some(entry) = catalog.resolve(vendor.key()) else {
            let skipped = analysis.tags_for(*vendor).count();
            ctx.add_warning(format!(
                "No template for {} in the template catalogue; {} tag(s) skipped",
                vendor.display_name(),
                skipped
            ));
            continue;
        };

        let id = ctx.next_id(EntityKind::Template);
        ctx.templates.push(CustomTemplate {
            template_id: id,
            name: entry.display_name,
            template_data: Some(entry.template_data_encoded),
            ..Default::default()
        });
        ctx.register_template(*vendor, entry.type_id);
    }

    tracing::debug!(templates = ctx.templates().len(), "custom templates generated");
}
