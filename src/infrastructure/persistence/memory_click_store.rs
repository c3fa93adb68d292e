//! In-memory click store for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::device::DeviceCategory;
use crate::domain::entities::ClickRecord;
use crate::domain::repositories::ClickStore;
use crate::error::StoreError;

/// Click totals for a single alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasClicks {
    pub total: u64,
    pub by_device: HashMap<DeviceCategory, u64>,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

/// A [`ClickStore`] that keeps aggregated counts in process memory.
///
/// Only registered aliases accept clicks; anything else is rejected with
/// [`StoreError::NotFound`], mirroring a real store that validates the alias.
///
/// # Use Cases
///
/// - Running the pipeline binary without a database
/// - Integration tests that need a realistic `NotFound` path
#[derive(Debug, Default)]
pub struct MemoryClickStore {
    links: RwLock<HashMap<String, AliasClicks>>,
}

impl MemoryClickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given aliases already registered.
    pub fn with_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for alias in aliases {
            store.register(alias);
        }
        store
    }

    /// Registers an alias; re-registering keeps existing counts.
    pub fn register(&self, alias: impl Into<String>) {
        self.links.write().entry(alias.into()).or_default();
    }

    pub fn clicks(&self, alias: &str) -> Option<AliasClicks> {
        self.links.read().get(alias).cloned()
    }

    /// Total clicks across all aliases.
    pub fn total_clicks(&self) -> u64 {
        self.links.read().values().map(|c| c.total).sum()
    }
}

#[async_trait]
impl ClickStore for MemoryClickStore {
    async fn record_click(&self, record: ClickRecord) -> Result<(), StoreError> {
        let mut links = self.links.write();
        let clicks = links
            .get_mut(&record.alias)
            .ok_or_else(|| StoreError::NotFound(record.alias.clone()))?;

        clicks.total += 1;
        *clicks.by_device.entry(record.device_category).or_insert(0) += 1;
        clicks.last_clicked_at = Some(record.occurred_at.unwrap_or_else(Utc::now));

        debug!(alias = %record.alias, device_category = %record.device_category, "stored click");
        Ok(())
    }
}
