//! Parameters and trigger conditions
//!
//! Every configurable entity carries an ordered list of typed parameters.
//! `list` and `map` parameters nest further parameters, so the structure is
//! recursive; the helpers here walk it without assuming any depth.

use serde::{Deserialize, Serialize};

// ============================================================================
// ParameterType
// ============================================================================

/// Wire type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterType {
    #[default]
    Template,
    Boolean,
    Integer,
    List,
    Map,
    TriggerReference,
    TagReference,
    /// Any type this model does not know about; kept so decoding never fails
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Parameter
// ============================================================================

/// A single `{type, key, value}` parameter, possibly nesting others
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type", default)]
    pub kind: ParameterType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map: Vec<Parameter>,
}

impl Parameter {
    /// Create a template (string) parameter
    pub fn template(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ParameterType::Template,
            key: Some(key.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Create a boolean parameter
    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self {
            kind: ParameterType::Boolean,
            key: Some(key.into()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    /// Create an integer parameter
    pub fn integer(key: impl Into<String>, value: i64) -> Self {
        Self {
            kind: ParameterType::Integer,
            key: Some(key.into()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    /// Create a list parameter
    pub fn list(key: impl Into<String>, items: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::List,
            key: Some(key.into()),
            list: items,
            ..Default::default()
        }
    }

    /// Create an unkeyed map parameter, as used for list rows
    pub fn map(entries: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::Map,
            map: entries,
            ..Default::default()
        }
    }

    /// Create a trigger reference parameter
    pub fn trigger_reference(key: impl Into<String>, trigger_id: impl Into<String>) -> Self {
        Self {
            kind: ParameterType::TriggerReference,
            key: Some(key.into()),
            value: Some(trigger_id.into()),
            ..Default::default()
        }
    }

    /// Whether this parameter has the given key
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// Value as a string slice, if present
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Nested parameters (list items followed by map entries)
    pub fn children(&self) -> impl Iterator<Item = &Parameter> {
        self.list.iter().chain(self.map.iter())
    }
}

// ============================================================================
// Parameter list helpers
// ============================================================================

/// Find a top-level parameter by key
pub fn find_parameter<'a>(params: &'a [Parameter], key: &str) -> Option<&'a Parameter> {
    params.iter().find(|p| p.has_key(key))
}

/// Value of a top-level parameter by key
pub fn parameter_value<'a>(params: &'a [Parameter], key: &str) -> Option<&'a str> {
    find_parameter(params, key).and_then(Parameter::value_str)
}

/// Non-empty value of the first key that has one
pub fn first_parameter_value<'a>(params: &'a [Parameter], keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| parameter_value(params, key))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// Every template-typed value in a parameter tree, depth first
pub fn template_values(params: &[Parameter]) -> Vec<&str> {
    let mut out = Vec::new();
    collect_values(params, ParameterType::Template, &mut out);
    out
}

/// Every trigger-reference value in a parameter tree, depth first
pub fn trigger_reference_values(params: &[Parameter]) -> Vec<&str> {
    let mut out = Vec::new();
    collect_values(params, ParameterType::TriggerReference, &mut out);
    out
}

fn collect_values<'a>(params: &'a [Parameter], kind: ParameterType, out: &mut Vec<&'a str>) {
    for param in params {
        if param.kind == kind {
            if let Some(value) = param.value_str() {
                out.push(value);
            }
        }
        collect_values(&param.list, kind, out);
        collect_values(&param.map, kind, out);
    }
}

/// Every keyed template parameter in a tree as `(key, value)` pairs
pub fn keyed_template_values(params: &[Parameter]) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    collect_keyed(params, &mut out);
    out
}

fn collect_keyed<'a>(params: &'a [Parameter], out: &mut Vec<(&'a str, &'a str)>) {
    for param in params {
        if param.kind == ParameterType::Template {
            if let (Some(key), Some(value)) = (param.key.as_deref(), param.value_str()) {
                out.push((key, value));
            }
        }
        collect_keyed(&param.list, out);
        collect_keyed(&param.map, out);
    }
}

// ============================================================================
// Condition
// ============================================================================

/// A trigger condition such as `equals(arg0, arg1)`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,
}

impl Condition {
    /// Create an `equals` condition
    pub fn equals(arg0: impl Into<String>, arg1: impl Into<String>) -> Self {
        Self {
            kind: "equals".to_string(),
            parameter: vec![
                Parameter::template("arg0", arg0),
                Parameter::template("arg1", arg1),
            ],
        }
    }

    /// Left operand, usually a `{{Variable}}` reference
    pub fn arg0(&self) -> Option<&str> {
        parameter_value(&self.parameter, "arg0")
    }

    /// Right operand, usually a literal
    pub fn arg1(&self) -> Option<&str> {
        parameter_value(&self.parameter, "arg1")
    }
}

// ============================================================================
// Tests
// ============================================================================
