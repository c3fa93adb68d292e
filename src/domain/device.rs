//! Device categories derived from client User-Agent strings.

use serde::Serialize;
use std::fmt;

/// Coarse device classification recorded with every click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Desktop,
    Mobile,
    Tablet,
    Bot,
    Unknown,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Bot => "bot",
            Self::Unknown => "unknown",
        }
    }

    /// Minimal substring classifier used when no real classifier is available.
    ///
    /// Matching is case-insensitive and ordered: bot tokens win over tablet
    /// tokens, which win over mobile tokens. iPad user agents also carry
    /// `Mobile`, so the tablet check must come first. This differs from a
    /// mobile-first substring check, which would file those iPads as `mobile`;
    /// the order here agrees with [`crate::infrastructure::classifier::WootheeClassifier`].
    ///
    /// ```
    /// use click_pipeline::domain::device::DeviceCategory;
    ///
    /// assert_eq!(DeviceCategory::from_heuristic("Mozilla/5.0 (iPhone; ...)"), DeviceCategory::Mobile);
    /// assert_eq!(DeviceCategory::from_heuristic(""), DeviceCategory::Unknown);
    /// ```
    pub fn from_heuristic(user_agent: &str) -> Self {
        if user_agent.trim().is_empty() {
            return Self::Unknown;
        }

        let ua = user_agent.to_ascii_lowercase();
        let has_any = |tokens: &[&str]| tokens.iter().any(|t| ua.contains(t));

        if has_any(&["bot", "spider", "crawler"]) {
            Self::Bot
        } else if has_any(&["tablet", "ipad"]) {
            Self::Tablet
        } else if has_any(&["mobile", "android", "iphone"]) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed device details for a single User-Agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub category: DeviceCategory,
    pub browser: String,
    pub os: String,
}

impl DeviceInfo {
    pub fn unknown() -> Self {
        Self {
            category: DeviceCategory::Unknown,
            browser: "unknown".to_string(),
            os: "unknown".to_string(),
        }
    }

    /// Heuristic-only info; browser and OS are not inferred.
    pub fn from_heuristic(user_agent: &str) -> Self {
        Self {
            category: DeviceCategory::from_heuristic(user_agent),
            ..Self::unknown()
        }
    }
}
