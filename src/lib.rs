//! # Click Pipeline
//!
//! Asynchronous click-analytics ingestion for a URL shortener.
//!
//! The redirect path hands every click to a bounded in-memory queue without
//! waiting; a fixed pool of workers classifies the device and records the
//! click in a durable store with bounded exponential retry. When the queue
//! refuses a click, a degraded synchronous write takes over so redirects never
//! fail because analytics did.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Click events, device classification, store contract, workers
//! - **Application Layer** ([`application`]) - Processor lifecycle, fallback recorder, tracker
//! - **Infrastructure Layer** ([`infrastructure`]) - woothee classifier, in-memory store
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use click_pipeline::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryClickStore::with_aliases(["abc123"]));
//! let classifier = Arc::new(ClassifierSlot::with(Arc::new(WootheeClassifier::new())));
//!
//! let processor = Arc::new(ClickProcessor::new(ProcessorConfig::default(), store.clone(), classifier));
//! processor.start()?;
//!
//! let tracker = ClickTracker::new(processor.clone(), FallbackRecorder::new(store, Duration::from_secs(5)));
//! tracker.track(ClickEvent::new("abc123", None, Some("Mozilla/5.0 (iPhone; ...)"), None)).await;
//!
//! processor.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Pipeline configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod telemetry;

pub use error::{LifecycleError, StoreError, SubmitError};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        ClickProcessor, ClickTracker, FallbackOutcome, FallbackRecorder, LifecycleState,
        ProcessorConfig, ProcessorStats, TrackOutcome,
    };
    pub use crate::domain::classifier::{ClassifierSlot, DeviceClassifier};
    pub use crate::domain::click_event::ClickEvent;
    pub use crate::domain::device::{DeviceCategory, DeviceInfo};
    pub use crate::domain::entities::ClickRecord;
    pub use crate::domain::repositories::ClickStore;
    pub use crate::error::{LifecycleError, StoreError, SubmitError};
    pub use crate::infrastructure::classifier::WootheeClassifier;
    pub use crate::infrastructure::persistence::MemoryClickStore;
}
