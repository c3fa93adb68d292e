//! Durable store contract for click records.

use crate::domain::entities::ClickRecord;
use crate::error::StoreError;
use async_trait::async_trait;

/// Durable destination for classified clicks.
///
/// Calls may be repeated for the same click after a transient failure, so
/// implementations should tolerate the occasional duplicate.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryClickStore`] - In-memory store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Records one click.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the alias does not exist.
    /// Returns [`StoreError::Transient`] on recoverable backend failures.
    async fn record_click(&self, record: ClickRecord) -> Result<(), StoreError>;
}
