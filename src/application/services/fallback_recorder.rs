//! Synchronous, degraded click recording for rejected submissions.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::device::DeviceCategory;
use crate::domain::entities::ClickRecord;
use crate::domain::repositories::ClickStore;
use crate::telemetry::FALLBACK_TOTAL;

/// Result of a fallback write. Informational only; the redirect never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOutcome {
    Recorded,
    Failed,
    TimedOut,
}

impl FallbackOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Writes a click straight to the store when the queue rejects it.
///
/// Runs on the caller's time budget, so it skips classification (the device
/// category is always [`DeviceCategory::Unknown`]), makes exactly one
/// attempt and gives up after `timeout`. Errors are logged and swallowed.
#[derive(Clone)]
pub struct FallbackRecorder {
    store: Arc<dyn ClickStore>,
    timeout: Duration,
}

impl FallbackRecorder {
    pub fn new(store: Arc<dyn ClickStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn record(&self, event: &ClickEvent) -> FallbackOutcome {
        let record = ClickRecord::from_event(event, DeviceCategory::Unknown);

        let outcome = match tokio::time::timeout(self.timeout, self.store.record_click(record)).await
        {
            Ok(Ok(())) => {
                debug!(alias = %event.alias, "click recorded synchronously");
                FallbackOutcome::Recorded
            }
            Ok(Err(err)) => {
                warn!(alias = %event.alias, error = %err, "synchronous click fallback failed");
                FallbackOutcome::Failed
            }
            Err(_) => {
                warn!(alias = %event.alias, timeout = ?self.timeout, "synchronous click fallback timed out");
                FallbackOutcome::TimedOut
            }
        };

        counter!(FALLBACK_TOTAL, "result" => outcome.as_label()).increment(1);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickStore;
    use crate::error::StoreError;

    fn event() -> ClickEvent {
        ClickEvent::new("abc123", None, Some("Mozilla/5.0 (iPhone; ...)"), None)
    }

    #[tokio::test]
    async fn test_records_with_unknown_category() {
        let mut store = MockClickStore::new();
        store
            .expect_record_click()
            .withf(|r| r.alias == "abc123" && r.device_category == DeviceCategory::Unknown)
            .times(1)
            .returning(|_| Ok(()));

        let recorder = FallbackRecorder::new(Arc::new(store), Duration::from_secs(1));

        assert_eq!(recorder.record(&event()).await, FallbackOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let mut store = MockClickStore::new();
        store
            .expect_record_click()
            .times(1)
            .returning(|_| Err(StoreError::transient("db down")));

        let recorder = FallbackRecorder::new(Arc::new(store), Duration::from_secs(1));

        assert_eq!(recorder.record(&event()).await, FallbackOutcome::Failed);
    }
}
