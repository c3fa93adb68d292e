//! Device classifier implementations.

pub mod woothee_classifier;

pub use woothee_classifier::WootheeClassifier;
