//! Click record handed to the durable store.

use chrono::{DateTime, Utc};

use crate::domain::click_event::ClickEvent;
use crate::domain::device::DeviceCategory;

/// A classified click, ready to be persisted.
///
/// Produced from a [`ClickEvent`] once its device category is known. The
/// fallback path builds one with [`DeviceCategory::Unknown`] because it skips
/// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRecord {
    pub alias: String,
    pub device_category: DeviceCategory,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ClickRecord {
    pub fn from_event(event: &ClickEvent, device_category: DeviceCategory) -> Self {
        Self {
            alias: event.alias.clone(),
            device_category,
            ip: event.source_ip.clone(),
            user_agent: event.user_agent.clone(),
            referer: event.referer.clone(),
            occurred_at: event.occurred_at,
        }
    }
}
