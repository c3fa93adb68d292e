//! Device classifier backed by the woothee User-Agent parser.

use tracing::debug;
use woothee::parser::Parser;

use crate::domain::classifier::DeviceClassifier;
use crate::domain::device::{DeviceCategory, DeviceInfo};

/// Classifies User-Agents with woothee's bundled dataset.
///
/// woothee reports phones and tablets alike as `smartphone`, so tablets are
/// told apart by OS (`iPad`) or by an Android agent without the `Mobile`
/// token.
pub struct WootheeClassifier {
    parser: Parser,
}

impl WootheeClassifier {
    pub fn new() -> Self {
        debug!("Using woothee device classifier");
        Self {
            parser: Parser::new(),
        }
    }
}

impl Default for WootheeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClassifier for WootheeClassifier {
    fn classify(&self, user_agent: &str) -> DeviceInfo {
        let Some(result) = self.parser.parse(user_agent) else {
            return DeviceInfo::unknown();
        };

        let category = match &*result.category {
            "crawler" => DeviceCategory::Bot,
            "pc" => DeviceCategory::Desktop,
            "smartphone" | "mobilephone" if is_tablet(&result.os, user_agent) => {
                DeviceCategory::Tablet
            }
            "smartphone" | "mobilephone" => DeviceCategory::Mobile,
            _ => DeviceCategory::Unknown,
        };

        DeviceInfo {
            category,
            browser: known_or_unknown(&result.name),
            os: known_or_unknown(&result.os),
        }
    }
}

fn is_tablet(os: &str, user_agent: &str) -> bool {
    os == "iPad" || (os == "Android" && !user_agent.contains("Mobile"))
}

fn known_or_unknown(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        "unknown".to_string()
    } else {
        value.to_string()
    }
}
