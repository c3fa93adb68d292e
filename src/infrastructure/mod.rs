//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`classifier`] - woothee-backed device classifier
//! - [`persistence`] - In-memory click store

pub mod classifier;
pub mod persistence;
