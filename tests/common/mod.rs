#![allow(dead_code)]

use async_trait::async_trait;
use click_pipeline::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

/// Store that answers after a fixed delay and remembers every record.
pub struct RecordingStore {
    delay: Duration,
    unknown: HashSet<String>,
    records: Mutex<Vec<ClickRecord>>,
}

impl RecordingStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            unknown: HashSet::new(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Aliases rejected with `NotFound`.
    pub fn with_unknown(mut self, aliases: &[&str]) -> Self {
        self.unknown = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub async fn records(&self) -> Vec<ClickRecord> {
        self.records.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl ClickStore for RecordingStore {
    async fn record_click(&self, record: ClickRecord) -> Result<(), StoreError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.unknown.contains(&record.alias) {
            return Err(StoreError::NotFound(record.alias));
        }
        self.records.lock().await.push(record);
        Ok(())
    }
}

/// Store that fails with a transient error a fixed number of times, then
/// succeeds, logging when each attempt started.
pub struct FlakyStore {
    failures: u32,
    calls: AtomicU32,
    attempts: Mutex<Vec<Instant>>,
}

impl FlakyStore {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Never succeeds.
    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    pub async fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().await.clone()
    }
}

#[async_trait]
impl ClickStore for FlakyStore {
    async fn record_click(&self, _record: ClickRecord) -> Result<(), StoreError> {
        self.attempts.lock().await.push(Instant::now());
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            Err(StoreError::transient("backend unavailable"))
        } else {
            Ok(())
        }
    }
}

/// Store whose calls never complete.
pub struct HangingStore;

#[async_trait]
impl ClickStore for HangingStore {
    async fn record_click(&self, _record: ClickRecord) -> Result<(), StoreError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Store whose calls park until the gate opens, tracking how many are
/// in progress at once.
pub struct GatedStore {
    gate: Semaphore,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Releases every parked and future call.
    pub fn open(&self) {
        self.gate.close();
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClickStore for GatedStore {
    async fn record_click(&self, _record: ClickRecord) -> Result<(), StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        // A closed semaphore is the open gate.
        let _ = self.gate.acquire().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn config(worker_count: usize, queue_capacity: usize) -> ProcessorConfig {
    ProcessorConfig {
        worker_count,
        queue_capacity,
        retry_attempts: 3,
        retry_base_delay: Duration::from_millis(10),
        retry_max_delay: Duration::from_secs(60),
        attempt_timeout: Duration::from_secs(30),
        shutdown_timeout: Duration::from_secs(30),
    }
}

pub fn create_processor(store: Arc<dyn ClickStore>, config: ProcessorConfig) -> ClickProcessor {
    ClickProcessor::new(config, store, Arc::new(ClassifierSlot::empty()))
}

pub fn click(alias: &str) -> ClickEvent {
    ClickEvent::new(
        alias,
        Some("127.0.0.1".to_string()),
        Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"),
        None,
    )
}

/// Polls `check` until it holds, sleeping between polls.
///
/// Under a paused clock the sleeps advance virtual time instantly.
pub async fn wait_until<F>(mut check: F)
where
    F: AsyncFnMut() -> bool,
{
    for _ in 0..10_000 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}
