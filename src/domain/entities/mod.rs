//! Core domain entities.
//!
//! - [`ClickRecord`] - A classified click ready for persistence

pub mod click;

pub use click::ClickRecord;
