//! Event-data pass
//!
//! A fixed catalogue of event-data variables (type `ed`) that server tags
//! use to read fields of the incoming event.

use crate::EVENT_DATA_FOLDER;
use crate::context::GenerationContext;
use tagforge_core::EntityKind;
use tagforge_ir::{Parameter, Variable};

/// Type code of event-data variables
pub const EVENT_DATA_VARIABLE_TYPE: &str = "ed";

/// Event fields exposed as variables, in creation order
pub const EVENT_DATA_KEYS: &[&str] = &[
    "event_name",
    "client_id",
    "page_location",
    "page_referrer",
    "page_title",
    "user_agent",
    "ip_override",
    "value",
    "currency",
    "transaction_id",
    "items",
    "email_address",
    "phone_number",
    "first_name",
    "last_name",
    "city",
    "postal_code",
    "country",
];

pub fn generate_event_data_variables(ctx: &mut GenerationContext) {
    let folder_id = ctx.folder_id(EVENT_DATA_FOLDER).map(str::to_string);

    for key in EVENT_DATA_KEYS {
        let id = ctx.next_id(EntityKind::Variable);
        let mut variable = Variable::new(id, format!("ed - {}", key), EVENT_DATA_VARIABLE_TYPE)
            .with_parameter(Parameter::template("keyPath", *key));
        variable.parent_folder_id = folder_id.clone();
        ctx.variables.push(variable);
    }

    tracing::debug!(count = EVENT_DATA_KEYS.len(), "event data variables generated");
}
