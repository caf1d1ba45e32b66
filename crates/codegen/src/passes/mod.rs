//! # Generation Passes
//!
//! Each pass reads the container model and the (already vendor-filtered)
//! migration analysis and appends entities to the [`GenerationContext`].
//! Passes run in a fixed order because later ones look up what earlier ones
//! registered:
//!
//! ```text
//! folders → constants → event data → templates → clients
//!         → plan tags → triggers → tags
//! ```
//!
//! [`GenerationContext`]: crate::context::GenerationContext

pub mod clients;
pub mod constants;
pub mod folders;
pub mod tags;
pub mod templates;
pub mod triggers;
pub mod variables;

pub use tags::{ServerTagKind, TagPlan, plan_tags};

use crate::context::{ConstantKey, ConstantRole, GenerationContext};
use tagforge_ir::{ContainerModel, MigratableTag, Tag};

/// Client tag a migratable entry points at, if the container has it
pub(crate) fn source_tag<'a>(model: &'a ContainerModel, migratable: &MigratableTag) -> Option<&'a Tag> {
    model.tag_by_id(&migratable.tag_id)
}

/// Parameter of the source tag resolved to a literal through constant
/// variables
pub(crate) fn resolved_param<'a>(
    model: &'a ContainerModel,
    migratable: &MigratableTag,
    keys: &[&str],
) -> Option<&'a str> {
    let tag = source_tag(model, migratable)?;
    let value = tagforge_ir::first_parameter_value(&tag.parameter, keys)?;
    model.resolve_literal(value)
}

/// Reference to the constant bound to a tag, falling back to the
/// container-wide setting for the same role
pub(crate) fn constant_for(ctx: &GenerationContext, tag_id: &str, role: ConstantRole) -> Option<String> {
    ctx.constant_reference(&ConstantKey::tag(tag_id, role))
        .or_else(|| ctx.constant_reference(&ConstantKey::Setting(role)))
}
