//! Core traits for Tagforge
//!
//! Every container entity has an identifier and a display name. Rules that
//! work on any entity kind (duplicates, unused detection, naming) are written
//! against these traits.

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a container-scoped identifier
pub trait Identifiable {
    /// Get the identifier (an opaque numeric string on the platform)
    fn id(&self) -> &str;

    /// Check if this matches another identifier
    fn matches_id(&self, id: &str) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a display name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        id: String,
        name: String,
    }

    impl Identifiable for Probe {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl Named for Probe {
        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn test_default_methods() {
        let probe = Probe {
            id: "7".to_string(),
            name: "GA4 - Config".to_string(),
        };
        assert!(probe.matches_id("7"));
        assert!(!probe.matches_id("8"));
        assert!(probe.name_matches("ga4 - config"));
    }
}
