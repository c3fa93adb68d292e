//! Application layer services orchestrating the click pipeline.
//!
//! This layer wires domain components (queue workers, retry policy,
//! classifier slot) into the API the redirect path consumes.
//!
//! # Available Services
//!
//! - [`services::click_processor::ClickProcessor`] - Bounded queue, worker pool and lifecycle
//! - [`services::fallback_recorder::FallbackRecorder`] - Degraded inline writes on rejection
//! - [`services::click_tracker::ClickTracker`] - Submit-or-fallback entry point

pub mod services;
