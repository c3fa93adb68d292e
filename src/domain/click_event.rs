//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// An in-memory representation of a click event for async processing.
///
/// Passed from the redirect path to the background workers through the
/// bounded click queue. This decouples the HTTP response from store writes,
/// allowing fast redirects without blocking.
///
/// # Design
///
/// - All client metadata is optional to handle missing headers gracefully
/// - Never mutated after creation; a worker takes ownership on dequeue
///
/// # Usage Flow
///
/// 1. Created in the redirect handler with request metadata
/// 2. Submitted to the queue (non-blocking), or recorded inline on rejection
/// 3. Classified and recorded by [`crate::domain::click_worker::run_click_worker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub alias: String,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ClickEvent {
    /// Creates a new click event.
    ///
    /// # Arguments
    ///
    /// - `alias` - The short alias that was accessed
    /// - `source_ip` - Optional client IP address
    /// - `user_agent` - Optional User-Agent header
    /// - `referer` - Optional Referer header
    ///
    /// The timestamp is left empty; the store assigns its own unless
    /// [`ClickEvent::at`] is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use click_pipeline::domain::click_event::ClickEvent;
    ///
    /// let event = ClickEvent::new(
    ///     "abc123",
    ///     Some("192.168.1.1".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    /// );
    /// assert_eq!(event.alias, "abc123");
    /// ```
    pub fn new(
        alias: impl Into<String>,
        source_ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            alias: alias.into(),
            source_ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
            occurred_at: None,
        }
    }

    /// Stamps the event with the moment the redirect was served.
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Stamps the event with the current time.
    pub fn now(self) -> Self {
        self.at(Utc::now())
    }
}
