//! Client container patch
//!
//! Points the client container's GA4 tags at the server container. The
//! input document is never modified; a patched deep copy is returned.
//! Patching an already patched container updates the existing parameter
//! in place.

use serde_json::{Map, Value, json};
use tagforge_ir::CONTAINER_VERSION_KEY;
use tagforge_ir::vendor::{GA4_CONFIG_TAG_TYPES, GA4_EVENT_TAG_TYPE};

/// Parameter set on GA4 configuration tags
pub const TRANSPORT_URL_KEY: &str = "transport_url";

/// Parameter set on GA4 event tags
pub const SERVER_CONTAINER_URL_KEY: &str = "server_container_url";

/// Return a copy of `raw` whose GA4 tags send to `transport_url`
pub fn patch_client_container(raw: &Value, transport_url: &str) -> Value {
    let mut patched = raw.clone();

    let tags = patched
        .get_mut(CONTAINER_VERSION_KEY)
        .and_then(|version| version.get_mut("tag"))
        .and_then(Value::as_array_mut);

    let Some(tags) = tags else {
        return patched;
    };

    let mut count = 0;
    for tag in tags.iter_mut().filter_map(Value::as_object_mut) {
        let tag_type = tag.get("type").and_then(Value::as_str).unwrap_or_default();
        let key = if GA4_CONFIG_TAG_TYPES.contains(&tag_type) {
            TRANSPORT_URL_KEY
        } else if tag_type == GA4_EVENT_TAG_TYPE {
            SERVER_CONTAINER_URL_KEY
        } else {
            continue;
        };
        upsert_parameter(tag, key, transport_url);
        count += 1;
    }

    tracing::debug!(tags = count, "client container patched");
    patched
}

/// Set a top-level template parameter, replacing an existing one with the
/// same key
fn upsert_parameter(tag: &mut Map<String, Value>, key: &str, value: &str) {
    let parameters = tag
        .entry("parameter")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !parameters.is_array() {
        *parameters = Value::Array(Vec::new());
    }
    let Some(parameters) = parameters.as_array_mut() else {
        return;
    };

    let existing = parameters
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|p| p.get("key").and_then(Value::as_str) == Some(key));

    match existing {
        Some(parameter) => {
            parameter.insert("type".to_string(), json!("template"));
            parameter.insert("value".to_string(), json!(value));
        }
        None => parameters.push(json!({"type": "template", "key": key, "value": value})),
    }
}
