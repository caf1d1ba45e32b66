//! Content hashing helpers
//!
//! Duplicate detection groups entities by a short content signature. The
//! hash is a 32-bit polynomial rolling hash over UTF-16 code units
//! (`h = h * 31 + unit`, wrapping). It is order-sensitive and cheap.
//! Different inputs may collide; identical inputs always produce the same
//! signature, which is the only property the rules engine relies on.

use serde_json::Value;

/// Hash a string with the rolling hash
pub fn rolling_hash(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as u32))
}

/// Render a hash as a fixed-width lowercase hex signature
pub fn format_signature(hash: u32) -> String {
    format!("{:08x}", hash)
}

/// Signature of a JSON value.
///
/// `serde_json` serializes object keys in sorted order, so two values that
/// are equal produce the same text and therefore the same signature.
pub fn value_signature(value: &Value) -> String {
    format_signature(rolling_hash(&value.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rolling_hash_known_values() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_rolling_hash_is_order_sensitive() {
        assert_ne!(rolling_hash("ab"), rolling_hash("ba"));
    }

    #[test]
    fn test_rolling_hash_wraps_on_long_input() {
        let long = "x".repeat(10_000);
        // Must not panic on overflow and must be stable
        assert_eq!(rolling_hash(&long), rolling_hash(&long));
    }

    #[test]
    fn test_identical_values_share_signature() {
        let a = json!({"type": "html", "parameter": [{"key": "html", "value": "<b>"}]});
        let b = json!({"parameter": [{"key": "html", "value": "<b>"}], "type": "html"});
        assert_eq!(value_signature(&a), value_signature(&b));
        assert_eq!(value_signature(&a).len(), 8);
    }
}
