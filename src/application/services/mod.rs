//! Click pipeline services for the application layer.

pub mod click_processor;
pub mod click_tracker;
pub mod fallback_recorder;

pub use click_processor::{ClickProcessor, LifecycleState, ProcessorConfig, ProcessorStats};
pub use click_tracker::{ClickTracker, TrackOutcome};
pub use fallback_recorder::{FallbackOutcome, FallbackRecorder};
