//! Vendor detection
//!
//! Maps client-side tags to the advertising/analytics vendor they belong to.
//! Built-in tag types are unambiguous; Custom HTML and community-template
//! tags are recognised by well-known snippet markers and names.

use crate::entity::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tagforge_core::EngineError;

/// Tag types of GA4 tags
pub const GA4_TAG_TYPES: &[&str] = &["gaawc", "gaawe", "googtag"];

/// Tag types of GA4 configuration tags
pub const GA4_CONFIG_TAG_TYPES: &[&str] = &["gaawc", "googtag"];

/// Tag type of GA4 event tags
pub const GA4_EVENT_TAG_TYPE: &str = "gaawe";

/// Tag types of Google Ads tags
pub const GOOGLE_ADS_TAG_TYPES: &[&str] = &["awct", "sp", "gclidw"];

/// Tag types of Floodlight tags
pub const FLOODLIGHT_TAG_TYPES: &[&str] = &["flc", "fls"];

/// Tag type of the Microsoft Advertising UET tag
pub const MICROSOFT_ADS_TAG_TYPE: &str = "baut";

// ============================================================================
// Vendor
// ============================================================================

/// A vendor whose tags can be moved to a server container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    Ga4,
    GoogleAds,
    Floodlight,
    Facebook,
    #[serde(rename = "linkedin")]
    LinkedIn,
    MicrosoftAds,
}

impl Vendor {
    /// All vendors in folder order
    pub fn all() -> &'static [Vendor] {
        &[
            Vendor::Ga4,
            Vendor::GoogleAds,
            Vendor::Facebook,
            Vendor::LinkedIn,
            Vendor::MicrosoftAds,
            Vendor::Floodlight,
        ]
    }

    /// Stable key used in configuration and catalogue lookups
    pub fn key(&self) -> &'static str {
        match self {
            Vendor::Ga4 => "ga4",
            Vendor::GoogleAds => "google_ads",
            Vendor::Floodlight => "floodlight",
            Vendor::Facebook => "facebook",
            Vendor::LinkedIn => "linkedin",
            Vendor::MicrosoftAds => "microsoft_ads",
        }
    }

    /// Human-readable name, also used as the vendor folder name
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::Ga4 => "GA4",
            Vendor::GoogleAds => "Google Ads",
            Vendor::Floodlight => "Floodlight",
            Vendor::Facebook => "Facebook",
            Vendor::LinkedIn => "LinkedIn",
            Vendor::MicrosoftAds => "Microsoft Ads",
        }
    }

    /// Whether the server container has no built-in tag type for this
    /// vendor, so a custom template is needed
    pub fn needs_custom_template(&self) -> bool {
        matches!(
            self,
            Vendor::Facebook | Vendor::LinkedIn | Vendor::MicrosoftAds
        )
    }

    /// Vendor implied by a built-in tag type alone
    pub fn from_tag_type(tag_type: &str) -> Option<Vendor> {
        if GA4_TAG_TYPES.contains(&tag_type) {
            Some(Vendor::Ga4)
        } else if GOOGLE_ADS_TAG_TYPES.contains(&tag_type) {
            Some(Vendor::GoogleAds)
        } else if FLOODLIGHT_TAG_TYPES.contains(&tag_type) {
            Some(Vendor::Floodlight)
        } else if tag_type == MICROSOFT_ADS_TAG_TYPE {
            Some(Vendor::MicrosoftAds)
        } else {
            None
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Vendor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "ga4" | "google_analytics" => Ok(Vendor::Ga4),
            "google_ads" | "ads" | "adwords" => Ok(Vendor::GoogleAds),
            "floodlight" | "cm360" => Ok(Vendor::Floodlight),
            "facebook" | "meta" => Ok(Vendor::Facebook),
            "linkedin" => Ok(Vendor::LinkedIn),
            "microsoft_ads" | "microsoft" | "bing" => Ok(Vendor::MicrosoftAds),
            _ => Err(EngineError::UnknownVendor(s.to_string())),
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

const FACEBOOK_MARKERS: &[&str] = &["fbq(", "connect.facebook.net"];
const LINKEDIN_MARKERS: &[&str] = &["_linkedin_partner_id", "snap.licdn.com"];
const MICROSOFT_MARKERS: &[&str] = &["bat.bing.com", "uetq"];

/// Detect which vendor a client-side tag belongs to
pub fn detect_vendor(tag: &Tag) -> Option<Vendor> {
    if tag.kind == "googtag" {
        // The Google tag serves both GA4 and Google Ads destinations
        return match tag.param("tagId") {
            Some(id) if id.trim_start().starts_with("AW-") => Some(Vendor::GoogleAds),
            _ => Some(Vendor::Ga4),
        };
    }

    if let Some(vendor) = Vendor::from_tag_type(&tag.kind) {
        return Some(vendor);
    }

    if let Some(html) = tag.html() {
        return detect_by_markers(html);
    }

    if tag.kind.starts_with("cvt_") {
        let name = tag.name.to_lowercase();
        if name.contains("facebook") || name.contains("meta pixel") {
            return Some(Vendor::Facebook);
        }
        if name.contains("linkedin") {
            return Some(Vendor::LinkedIn);
        }
        if name.contains("bing") || name.contains("microsoft") || name.contains("uet") {
            return Some(Vendor::MicrosoftAds);
        }
    }

    None
}

fn detect_by_markers(html: &str) -> Option<Vendor> {
    let contains_any = |markers: &[&str]| markers.iter().any(|m| html.contains(m));
    if contains_any(FACEBOOK_MARKERS) {
        Some(Vendor::Facebook)
    } else if contains_any(LINKEDIN_MARKERS) {
        Some(Vendor::LinkedIn)
    } else if contains_any(MICROSOFT_MARKERS) {
        Some(Vendor::MicrosoftAds)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
