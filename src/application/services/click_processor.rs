//! Asynchronous click processor: bounded queue, worker pool and lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --start()--> Running --stop()--> Draining --drained--> Stopped
//! ```
//!
//! `stop()` cancels pending backoff waits, closes the queue and waits for
//! the workers to drain what was already accepted. If the deadline passes
//! first the processor stays in `Draining` and `ShutdownTimeout` is returned.
//! A stopped processor cannot be restarted.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::classifier::ClassifierSlot;
use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::{SharedReceiver, WorkerContext, run_click_worker};
use crate::domain::repositories::ClickStore;
use crate::domain::retry::RetryPolicy;
use crate::error::{LifecycleError, SubmitError};
use crate::telemetry::PipelineCounters;

/// Immutable processor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub retry_attempts: u32,
    pub retry_base_delay: Duration,
    /// Upper bound for a single backoff wait.
    pub retry_max_delay: Duration,
    /// Upper bound for a single durable store call.
    pub attempt_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            queue_capacity: 1000,
            retry_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(60),
            attempt_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ProcessorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            self.retry_base_delay,
            self.retry_max_delay,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    NotStarted,
    Running,
    Draining,
    Stopped,
}

/// Point-in-time view of the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub running: bool,
    pub state: LifecycleState,
    pub queue_length: usize,
    pub queue_capacity: usize,
    pub worker_count: usize,
    pub retry_attempts: u32,
    pub recorded: u64,
    pub retried: u64,
    pub dropped: u64,
    pub rejected: u64,
}

struct Lifecycle {
    state: LifecycleState,
    sender: Option<mpsc::Sender<ClickEvent>>,
    receiver: Option<mpsc::Receiver<ClickEvent>>,
    workers: Vec<JoinHandle<()>>,
}

/// Decouples the redirect path from durable click recording.
///
/// [`ClickProcessor::submit`] never waits: it either places the event in the
/// bounded queue or tells the caller to use the fallback path. A fixed pool
/// of workers drains the queue, classifies each click and records it with
/// bounded exponential retry.
pub struct ClickProcessor {
    config: ProcessorConfig,
    lifecycle: RwLock<Lifecycle>,
    shutdown: CancellationToken,
    queued: Arc<AtomicUsize>,
    counters: Arc<PipelineCounters>,
    store: Arc<dyn ClickStore>,
    classifier: Arc<ClassifierSlot>,
}

impl ClickProcessor {
    /// Creates a processor; no tasks run until [`ClickProcessor::start`].
    ///
    /// `worker_count` and `queue_capacity` are raised to at least one.
    pub fn new(
        config: ProcessorConfig,
        store: Arc<dyn ClickStore>,
        classifier: Arc<ClassifierSlot>,
    ) -> Self {
        let config = ProcessorConfig {
            worker_count: config.worker_count.max(1),
            queue_capacity: config.queue_capacity.max(1),
            ..config
        };
        let (sender, receiver) = mpsc::channel(config.queue_capacity);

        Self {
            config,
            lifecycle: RwLock::new(Lifecycle {
                state: LifecycleState::NotStarted,
                sender: Some(sender),
                receiver: Some(receiver),
                workers: Vec::new(),
            }),
            shutdown: CancellationToken::new(),
            queued: Arc::new(AtomicUsize::new(0)),
            counters: Arc::new(PipelineCounters::default()),
            store,
            classifier,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.read().state
    }

    /// Spawns exactly `worker_count` workers on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyStarted`] unless the processor is `NotStarted`.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut lifecycle = self.lifecycle.write();

        if lifecycle.state != LifecycleState::NotStarted {
            return Err(LifecycleError::AlreadyStarted);
        }
        let Some(receiver) = lifecycle.receiver.take() else {
            return Err(LifecycleError::AlreadyStarted);
        };

        info!(
            workers = self.config.worker_count,
            queue_capacity = self.config.queue_capacity,
            retry_attempts = self.config.retry_attempts,
            "starting click processor"
        );

        let queue: SharedReceiver = Arc::new(Mutex::new(receiver));
        let ctx = Arc::new(WorkerContext {
            store: self.store.clone(),
            classifier: self.classifier.clone(),
            retry: self.config.retry_policy(),
            attempt_timeout: self.config.attempt_timeout,
            shutdown: self.shutdown.clone(),
            counters: self.counters.clone(),
            queued: self.queued.clone(),
        });

        lifecycle.workers = (0..self.config.worker_count)
            .map(|worker_id| tokio::spawn(run_click_worker(worker_id, queue.clone(), ctx.clone())))
            .collect();
        lifecycle.state = LifecycleState::Running;

        Ok(())
    }

    /// Enqueues a click without waiting.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::QueueFull`] if no slot is free
    /// - [`SubmitError::NotRunning`] before `start()` or once `stop()` has begun
    pub fn submit(&self, event: ClickEvent) -> Result<(), SubmitError> {
        self.try_submit(event).map_err(|(err, _)| err)
    }

    /// Like [`ClickProcessor::submit`] but hands a rejected event back to the
    /// caller, so it can be recorded inline without cloning it up front.
    pub fn try_submit(&self, event: ClickEvent) -> Result<(), (SubmitError, ClickEvent)> {
        let lifecycle = self.lifecycle.read();

        let result = match (&lifecycle.state, &lifecycle.sender) {
            (LifecycleState::Running, Some(sender)) => {
                // Count before sending so a fast worker never sees it underflow.
                self.queued.fetch_add(1, Ordering::AcqRel);
                sender.try_send(event).map_err(|err| {
                    self.queued.fetch_sub(1, Ordering::AcqRel);
                    match err {
                        mpsc::error::TrySendError::Full(event) => (SubmitError::QueueFull, event),
                        mpsc::error::TrySendError::Closed(event) => {
                            (SubmitError::NotRunning, event)
                        }
                    }
                })
            }
            _ => Err((SubmitError::NotRunning, event)),
        };

        match &result {
            Ok(()) => self.counters.submitted(),
            Err((err, event)) => {
                debug!(alias = %event.alias, reason = err.as_label(), "click submission rejected");
                self.counters.rejected(err.as_label());
            }
        }
        result
    }

    /// Stops accepting clicks and drains the queue within `timeout`.
    ///
    /// An attempt already talking to the store is not aborted; it finishes or
    /// hits its own timeout, after which no further retries happen.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotRunning`] unless the processor is `Running`
    /// - [`LifecycleError::ShutdownTimeout`] if workers are still busy at the
    ///   deadline; the processor stays `Draining`
    pub async fn stop(&self, timeout: Duration) -> Result<(), LifecycleError> {
        let workers = {
            let mut lifecycle = self.lifecycle.write();
            if lifecycle.state != LifecycleState::Running {
                return Err(LifecycleError::NotRunning);
            }

            info!(
                pending = self.queued.load(Ordering::Acquire),
                "stopping click processor"
            );
            lifecycle.state = LifecycleState::Draining;
            self.shutdown.cancel();
            // Dropping the only sender closes the queue; workers exit once it is empty.
            lifecycle.sender = None;
            std::mem::take(&mut lifecycle.workers)
        };

        let drain = async {
            for worker in workers {
                if let Err(err) = worker.await {
                    error!(error = %err, "click worker terminated abnormally");
                }
            }
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(()) => {
                self.lifecycle.write().state = LifecycleState::Stopped;
                info!("click processor stopped gracefully");
                Ok(())
            }
            Err(_) => {
                warn!(
                    ?timeout,
                    pending = self.queued.load(Ordering::Acquire),
                    "click processor shutdown timeout reached"
                );
                Err(LifecycleError::ShutdownTimeout(timeout))
            }
        }
    }

    /// [`ClickProcessor::stop`] with the configured `shutdown_timeout`.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        self.stop(self.config.shutdown_timeout).await
    }

    /// Read-only snapshot; never blocks on the queue.
    pub fn stats(&self) -> ProcessorStats {
        let (state, queue_length) = {
            let lifecycle = self.lifecycle.read();
            let queue_length = match &lifecycle.sender {
                Some(sender) => sender.max_capacity() - sender.capacity(),
                // Queue closed; only the dequeue counter is left.
                None => self.queued.load(Ordering::Acquire),
            };
            (lifecycle.state, queue_length.min(self.config.queue_capacity))
        };

        ProcessorStats {
            running: state == LifecycleState::Running,
            state,
            queue_length,
            queue_capacity: self.config.queue_capacity,
            worker_count: self.config.worker_count,
            retry_attempts: self.config.retry_attempts,
            recorded: self.counters.recorded_count(),
            retried: self.counters.retried_count(),
            dropped: self.counters.dropped_count(),
            rejected: self.counters.rejected_count(),
        }
    }
}

impl Drop for ClickProcessor {
    fn drop(&mut self) {
        // Releases workers parked in backoff; the queue closes with the sender.
        self.shutdown.cancel();
    }
}
