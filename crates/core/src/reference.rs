//! Soft reference extraction
//!
//! Variables are referenced by name through `{{Name}}` placeholders inside
//! template-typed parameter values. This module is the single tokenizer for
//! those placeholders; the container model runs it once and stores the
//! resulting edges.

use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("reference pattern is valid")
});

/// Extract every `{{Name}}` reference in a value, in order of appearance.
///
/// Repeated references are returned once.
pub fn extract_references(value: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in REFERENCE_PATTERN.captures_iter(value) {
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Check whether a whole value is a single `{{Name}}` reference
pub fn is_reference(value: &str) -> bool {
    reference_name(value).is_some()
}

/// Name inside a value that consists of exactly one reference
pub fn reference_name(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") || inner.trim().is_empty() {
        return None;
    }
    Some(inner.trim())
}

/// Wrap a name into a `{{Name}}` reference
pub fn to_reference(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_single_reference() {
        assert_eq!(extract_references("{{Page URL}}"), vec!["Page URL"]);
    }

    #[test]
    fn test_extract_multiple_references() {
        let refs = extract_references("https://x.test/?a={{DL - a}}&b={{ DL - b }}&c={{DL - a}}");
        assert_eq!(refs, vec!["DL - a", "DL - b"]);
    }

    #[test]
    fn test_extract_ignores_plain_text() {
        assert!(extract_references("G-ABC123").is_empty());
        assert!(extract_references("{{}}").is_empty());
        assert!(extract_references("{ {x} }").is_empty());
    }

    #[test]
    fn test_reference_name() {
        assert_eq!(reference_name(" {{GA4 ID}} "), Some("GA4 ID"));
        assert_eq!(reference_name("id-{{GA4 ID}}"), None);
        assert_eq!(reference_name("{{a}}{{b}}"), None);
        assert!(is_reference("{{x}}"));
        assert!(!is_reference("x"));
    }

    #[test]
    fn test_to_reference() {
        assert_eq!(to_reference("const - transport url"), "{{const - transport url}}");
    }
}
