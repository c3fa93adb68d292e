//! Domain layer containing click pipeline entities and logic.
//!
//! Defines the data flowing through the pipeline, the contracts of the
//! external collaborators, and the worker logic, independent of any concrete
//! store or classifier.
//!
//! # Architecture
//!
//! - [`entities`] - Records handed to the durable store
//! - [`repositories`] - Durable store trait definition
//! - [`click_event`] - Click tracking event model
//! - [`device`] - Device categories and the fallback heuristic
//! - [`classifier`] - Device classifier contract and its set-once slot
//! - [`retry`] - Exponential backoff policy
//! - [`click_worker`] - Queue-draining worker with retry logic
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler builds a [`click_event::ClickEvent`]
//! 2. The event is submitted to the bounded queue (non-blocking)
//! 3. [`click_worker::run_click_worker`] classifies it and records it with retry
//! 4. The click is persisted via [`repositories::ClickStore`]

pub mod classifier;
pub mod click_event;
pub mod click_worker;
pub mod device;
pub mod entities;
pub mod repositories;
pub mod retry;
