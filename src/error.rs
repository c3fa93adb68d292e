//! Error types for the click pipeline.
//!
//! Errors are split by who has to react to them:
//!
//! - [`SubmitError`] - returned to the redirect path; always answered by the fallback recorder
//! - [`LifecycleError`] - misuse of `start`/`stop` or an expired shutdown deadline
//! - [`StoreError`] - durable store failures, classified for the retry loop
//! - [`ClassifierError`] - device classifier installation problems

use std::time::Duration;

use thiserror::Error;

/// Rejection of a non-blocking submission.
///
/// Neither variant is a failure of the redirect itself: the caller is
/// expected to hand the event to the fallback recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The bounded queue has no free slot.
    #[error("click queue is full")]
    QueueFull,

    /// The processor has not been started or is shutting down.
    #[error("click processor is not running")]
    NotRunning,
}

impl SubmitError {
    /// Short label used for metrics and structured logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::QueueFull => "queue_full",
            Self::NotRunning => "not_running",
        }
    }
}

/// Errors raised by the processor lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("click processor already started")]
    AlreadyStarted,

    #[error("click processor is not running")]
    NotRunning,

    /// Workers did not drain the queue before the deadline.
    ///
    /// The processor is left in `Draining` and workers may still be active,
    /// so some accepted events may never reach the store.
    #[error("click processor did not drain within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Failures reported by a [`crate::domain::repositories::ClickStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The alias does not exist; retrying cannot help.
    #[error("alias not found: {0}")]
    NotFound(String),

    /// A temporary backend failure (connection loss, timeout, overload).
    #[error("transient store error: {0}")]
    Transient(String),
}

impl StoreError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Whether the retry loop may spend another attempt on this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("device classifier already installed")]
    AlreadyInstalled,

    #[error("device classifier failed to initialize: {0}")]
    Init(String),
}
