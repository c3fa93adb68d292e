//! Device classifier contract and its shared, set-once slot.

use std::sync::{Arc, OnceLock};

use crate::domain::device::{DeviceCategory, DeviceInfo};
use crate::error::ClassifierError;

/// Maps a raw User-Agent string to device details.
///
/// Implementations must be pure: the same input always yields the same
/// [`DeviceInfo`].
///
/// # Implementations
///
/// - [`crate::infrastructure::classifier::WootheeClassifier`] - woothee-based parser
pub trait DeviceClassifier: Send + Sync {
    fn classify(&self, user_agent: &str) -> DeviceInfo;
}

/// Shared handle to an optional [`DeviceClassifier`].
///
/// The slot starts empty and can be filled exactly once, typically during
/// startup. Workers read it on every event; while it is empty they use
/// [`DeviceCategory::from_heuristic`].
#[derive(Default)]
pub struct ClassifierSlot {
    inner: OnceLock<Arc<dyn DeviceClassifier>>,
}

impl ClassifierSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(classifier: Arc<dyn DeviceClassifier>) -> Self {
        let slot = Self::default();
        let _ = slot.inner.set(classifier);
        slot
    }

    /// Installs the classifier if the slot is still empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::AlreadyInstalled`] if another classifier won the race.
    pub fn install(&self, classifier: Arc<dyn DeviceClassifier>) -> Result<(), ClassifierError> {
        self.inner
            .set(classifier)
            .map_err(|_| ClassifierError::AlreadyInstalled)
    }

    /// Runs `init` at most once and installs its result.
    ///
    /// Racing callers may both run `init`; only the first result is kept. A
    /// failed initialization leaves the slot empty, so the heuristic stays in
    /// effect and a later call may try again.
    pub fn install_with<F>(&self, init: F) -> Result<(), ClassifierError>
    where
        F: FnOnce() -> Result<Arc<dyn DeviceClassifier>, ClassifierError>,
    {
        if self.inner.get().is_some() {
            return Err(ClassifierError::AlreadyInstalled);
        }
        let classifier = init()?;
        self.install(classifier)
    }

    pub fn get(&self) -> Option<&Arc<dyn DeviceClassifier>> {
        self.inner.get()
    }

    pub fn is_installed(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Classifies a User-Agent, falling back to the heuristic.
    ///
    /// A missing or blank User-Agent is always [`DeviceCategory::Unknown`].
    /// When the installed classifier cannot decide, the heuristic gets a
    /// chance before giving up.
    pub fn classify(&self, user_agent: Option<&str>) -> DeviceInfo {
        let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) else {
            return DeviceInfo::unknown();
        };

        match self.inner.get() {
            Some(classifier) => {
                let mut info = classifier.classify(ua);
                if info.category == DeviceCategory::Unknown {
                    info.category = DeviceCategory::from_heuristic(ua);
                }
                info
            }
            None => DeviceInfo::from_heuristic(ua),
        }
    }
}
