//! Entry point for the redirect path: queue first, inline write second.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::click_processor::ClickProcessor;
use crate::application::services::fallback_recorder::{FallbackOutcome, FallbackRecorder};
use crate::domain::click_event::ClickEvent;

/// What happened to a tracked click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Accepted by the async pipeline.
    Queued,
    /// Rejected by the queue and written inline with a degraded category.
    RecordedInline,
    /// Rejected by the queue and the inline write failed too.
    Lost,
}

/// Combines [`ClickProcessor::submit`] with the [`FallbackRecorder`].
///
/// Infallible by construction so a redirect handler can call it and ignore
/// the result.
#[derive(Clone)]
pub struct ClickTracker {
    processor: Arc<ClickProcessor>,
    fallback: FallbackRecorder,
}

impl ClickTracker {
    pub fn new(processor: Arc<ClickProcessor>, fallback: FallbackRecorder) -> Self {
        Self {
            processor,
            fallback,
        }
    }

    pub fn processor(&self) -> &Arc<ClickProcessor> {
        &self.processor
    }

    pub async fn track(&self, event: ClickEvent) -> TrackOutcome {
        let event = match self.processor.try_submit(event) {
            Ok(()) => return TrackOutcome::Queued,
            Err((reason, event)) => {
                debug!(alias = %event.alias, reason = reason.as_label(), "falling back to inline click write");
                event
            }
        };

        match self.fallback.record(&event).await {
            FallbackOutcome::Recorded => TrackOutcome::RecordedInline,
            FallbackOutcome::Failed | FallbackOutcome::TimedOut => TrackOutcome::Lost,
        }
    }
}
