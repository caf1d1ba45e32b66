//! Folder pass
//!
//! The settings and event-data folders always exist. Vendor folders follow
//! in [`Vendor::all`] order for each vendor present; the Floodlight folder
//! is keyed on actual Floodlight tags rather than the flag.

use crate::EVENT_DATA_FOLDER;
use crate::context::GenerationContext;
use tagforge_ir::{MigrationAnalysis, Vendor};

pub fn generate_folders(ctx: &mut GenerationContext, analysis: &MigrationAnalysis) {
    let settings = ctx.config.settings_folder_name.clone();
    ctx.add_folder(&settings);
    ctx.add_folder(EVENT_DATA_FOLDER);

    for vendor in Vendor::all() {
        let present = match vendor {
            Vendor::Floodlight => analysis.has_floodlight_tags(),
            other => analysis.has_vendor(*other),
        };
        if present {
            ctx.add_folder(vendor.display_name());
        }
    }

    tracing::debug!(folders = ctx.folders().len(), "folders generated");
}
