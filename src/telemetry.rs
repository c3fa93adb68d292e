//! Logging setup and pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tracing_subscriber::EnvFilter;

pub const SUBMITTED_TOTAL: &str = "click_events_submitted_total";
pub const RECORDED_TOTAL: &str = "click_events_recorded_total";
pub const RETRIED_TOTAL: &str = "click_events_retried_total";
pub const DROPPED_TOTAL: &str = "click_events_dropped_total";
pub const FALLBACK_TOTAL: &str = "click_fallback_total";

/// Initialize the tracing subscriber for structured logging.
///
/// `log_level` is used when `RUST_LOG` is unset. `log_format` is either
/// `text` (human-readable) or `json` (for log aggregation).
pub fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// In-process mirror of the exported click counters.
///
/// Every increment also goes to the global `metrics` recorder, so a
/// Prometheus exporter installed by the host process sees the same numbers
/// that [`crate::application::services::ClickProcessor::stats`] reports.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    recorded: AtomicU64,
    retried: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
}

impl PipelineCounters {
    pub fn submitted(&self) {
        counter!(SUBMITTED_TOTAL, "result" => "queued").increment(1);
    }

    pub fn rejected(&self, reason: &'static str) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!(SUBMITTED_TOTAL, "result" => reason).increment(1);
    }

    pub fn recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        counter!(RECORDED_TOTAL).increment(1);
    }

    pub fn retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
        counter!(RETRIED_TOTAL).increment(1);
    }

    pub fn dropped(&self, reason: &'static str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        counter!(DROPPED_TOTAL, "reason" => reason).increment(1);
    }

    pub fn recorded_count(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }

    pub fn retried_count(&self) -> u64 {
        self.retried.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}
