//! Click store implementations.
//!
//! - [`MemoryClickStore`] - Aggregated counts kept in process memory

pub mod memory_click_store;

pub use memory_click_store::{AliasClicks, MemoryClickStore};
