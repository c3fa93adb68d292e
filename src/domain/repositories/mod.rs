//! Repository trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`ClickStore`] - Durable click recording

pub mod click_store;

pub use click_store::ClickStore;

#[cfg(test)]
pub use click_store::MockClickStore;
