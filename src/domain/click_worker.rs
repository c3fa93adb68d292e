//! Background workers that drain the click queue.
//!
//! Each worker owns nothing but its id; the queue receiver and every
//! collaborator are shared through [`WorkerContext`]. A worker exits when the
//! queue is closed and empty, so already accepted events are always drained.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::classifier::ClassifierSlot;
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::ClickRecord;
use crate::domain::repositories::ClickStore;
use crate::domain::retry::RetryPolicy;
use crate::error::StoreError;
use crate::telemetry::PipelineCounters;

/// Receiving half of the click queue, shared by all workers.
pub type SharedReceiver = Arc<Mutex<mpsc::Receiver<ClickEvent>>>;

/// Why an accepted event never reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The store rejected the alias; not retried.
    NotFound,
    /// Every attempt failed with a retryable error.
    RetriesExhausted,
    /// Shutdown cancelled a pending retry.
    Shutdown,
}

impl DropReason {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RetriesExhausted => "retries_exhausted",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Final result of processing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Recorded { attempts: u32 },
    Dropped { reason: DropReason, attempts: u32 },
}

/// Everything a worker needs besides the queue.
pub struct WorkerContext {
    pub store: Arc<dyn ClickStore>,
    pub classifier: Arc<ClassifierSlot>,
    pub retry: RetryPolicy,
    pub attempt_timeout: Duration,
    pub shutdown: CancellationToken,
    pub counters: Arc<PipelineCounters>,
    /// Events accepted by `submit` and not yet dequeued.
    pub queued: Arc<AtomicUsize>,
}

/// Runs one worker until the queue is closed and empty.
pub async fn run_click_worker(worker_id: usize, queue: SharedReceiver, ctx: Arc<WorkerContext>) {
    info!(worker_id, "click worker started");

    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };

        let Some(event) = next else {
            break;
        };
        ctx.queued.fetch_sub(1, Ordering::AcqRel);

        match process_click(&ctx, worker_id, event).await {
            ClickOutcome::Recorded { .. } => ctx.counters.recorded(),
            ClickOutcome::Dropped { reason, .. } => ctx.counters.dropped(reason.as_label()),
        }
    }

    info!(worker_id, "click worker stopped");
}

/// Classifies one event and records it, retrying transient failures.
///
/// Attempts and backoff are sequential: the wait starts only after the
/// previous attempt has resolved or hit `attempt_timeout`. Shutdown cancels a
/// pending wait but never an attempt that is already running.
pub async fn process_click(ctx: &WorkerContext, worker_id: usize, event: ClickEvent) -> ClickOutcome {
    let info = ctx.classifier.classify(event.user_agent.as_deref());
    debug!(
        worker_id,
        alias = %event.alias,
        device_category = %info.category,
        browser = %info.browser,
        os = %info.os,
        "classified click"
    );

    let record = ClickRecord::from_event(&event, info.category);
    let max_attempts = ctx.retry.max_attempts;
    let mut delays = ctx.retry.delays();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match record_once(ctx, record.clone()).await {
            Ok(()) => {
                if attempt > 1 {
                    info!(worker_id, alias = %record.alias, attempt, "click recorded after retry");
                } else {
                    debug!(worker_id, alias = %record.alias, device_category = %record.device_category, "click recorded");
                }
                return ClickOutcome::Recorded { attempts: attempt };
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            warn!(worker_id, alias = %record.alias, error = %err, "dropping click, not retryable");
            return ClickOutcome::Dropped {
                reason: DropReason::NotFound,
                attempts: attempt,
            };
        }

        warn!(
            worker_id,
            alias = %record.alias,
            attempt,
            max_attempts,
            error = %err,
            "click recording failed"
        );

        let Some(delay) = delays.next() else {
            error!(
                worker_id,
                alias = %record.alias,
                attempts = attempt,
                error = %err,
                "dropping click after all retries"
            );
            return ClickOutcome::Dropped {
                reason: DropReason::RetriesExhausted,
                attempts: attempt,
            };
        };

        if ctx.shutdown.is_cancelled() {
            warn!(worker_id, alias = %record.alias, attempts = attempt, "dropping click, shutting down");
            return ClickOutcome::Dropped {
                reason: DropReason::Shutdown,
                attempts: attempt,
            };
        }

        ctx.counters.retried();
        tokio::select! {
            _ = sleep(delay) => {}
            _ = ctx.shutdown.cancelled() => {
                warn!(worker_id, alias = %record.alias, attempts = attempt, "shutdown during retry delay, dropping click");
                return ClickOutcome::Dropped {
                    reason: DropReason::Shutdown,
                    attempts: attempt,
                };
            }
        }
    }
}

async fn record_once(ctx: &WorkerContext, record: ClickRecord) -> Result<(), StoreError> {
    match timeout(ctx.attempt_timeout, ctx.store.record_click(record)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::transient(format!(
            "attempt timed out after {:?}",
            ctx.attempt_timeout
        ))),
    }
}
