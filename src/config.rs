//! Pipeline configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the
//! processor starts. Every value has a default, so an empty environment
//! yields a working setup.
//!
//! ## Variables
//!
//! - `CLICK_WORKER_COUNT` - Number of queue workers (default: 3, 1..=256)
//! - `CLICK_QUEUE_CAPACITY` - Click event buffer size (default: 1000, max: 1000000)
//! - `CLICK_RETRY_ATTEMPTS` - Store attempts per click (default: 3, 1..=10)
//! - `CLICK_RETRY_BASE_DELAY_MS` - First backoff wait (default: 1000)
//! - `CLICK_RETRY_MAX_DELAY_MS` - Cap for a single backoff wait (default: 60000)
//! - `CLICK_ATTEMPT_TIMEOUT_MS` - Bound for one store call (default: 30000)
//! - `CLICK_SHUTDOWN_TIMEOUT_SECS` - Drain deadline on shutdown (default: 30)
//! - `CLICK_FALLBACK_TIMEOUT_MS` - Bound for the inline fallback write (default: 5000)
//! - `UA_CLASSIFIER` - `woothee` or `heuristic` (default: `woothee`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::ProcessorConfig;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: String,
    pub click_worker_count: usize,
    pub click_queue_capacity: usize,
    pub click_retry_attempts: u32,
    pub click_retry_base_delay_ms: u64,
    /// Backoff never waits longer than this between two attempts.
    pub click_retry_max_delay_ms: u64,
    pub click_attempt_timeout_ms: u64,
    pub click_shutdown_timeout_secs: u64,
    /// Time budget of the synchronous fallback write on the redirect path.
    pub click_fallback_timeout_ms: u64,
    /// `woothee` installs the parser-based classifier; `heuristic` keeps
    /// the substring fallback only.
    pub ua_classifier: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            click_worker_count: 3,
            click_queue_capacity: 1000,
            click_retry_attempts: 3,
            click_retry_base_delay_ms: 1000,
            click_retry_max_delay_ms: 60_000,
            click_attempt_timeout_ms: 30_000,
            click_shutdown_timeout_secs: 30,
            click_fallback_timeout_ms: 5000,
            ua_classifier: "woothee".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            click_worker_count: parse_var("CLICK_WORKER_COUNT", defaults.click_worker_count)?,
            click_queue_capacity: parse_var(
                "CLICK_QUEUE_CAPACITY",
                defaults.click_queue_capacity,
            )?,
            click_retry_attempts: parse_var(
                "CLICK_RETRY_ATTEMPTS",
                defaults.click_retry_attempts,
            )?,
            click_retry_base_delay_ms: parse_var(
                "CLICK_RETRY_BASE_DELAY_MS",
                defaults.click_retry_base_delay_ms,
            )?,
            click_retry_max_delay_ms: parse_var(
                "CLICK_RETRY_MAX_DELAY_MS",
                defaults.click_retry_max_delay_ms,
            )?,
            click_attempt_timeout_ms: parse_var(
                "CLICK_ATTEMPT_TIMEOUT_MS",
                defaults.click_attempt_timeout_ms,
            )?,
            click_shutdown_timeout_secs: parse_var(
                "CLICK_SHUTDOWN_TIMEOUT_SECS",
                defaults.click_shutdown_timeout_secs,
            )?,
            click_fallback_timeout_ms: parse_var(
                "CLICK_FALLBACK_TIMEOUT_MS",
                defaults.click_fallback_timeout_ms,
            )?,
            ua_classifier: env::var("UA_CLASSIFIER").unwrap_or(defaults.ua_classifier),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range or `log_format` /
    /// `ua_classifier` hold an unknown value.
    pub fn validate(&self) -> Result<()> {
        if self.click_worker_count == 0 || self.click_worker_count > 256 {
            anyhow::bail!(
                "CLICK_WORKER_COUNT must be between 1 and 256, got {}",
                self.click_worker_count
            );
        }

        if self.click_queue_capacity == 0 {
            anyhow::bail!("CLICK_QUEUE_CAPACITY must be at least 1");
        }

        if self.click_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.click_queue_capacity
            );
        }

        if self.click_retry_attempts == 0 || self.click_retry_attempts > 10 {
            anyhow::bail!(
                "CLICK_RETRY_ATTEMPTS must be between 1 and 10, got {}",
                self.click_retry_attempts
            );
        }

        if self.click_retry_base_delay_ms == 0 {
            anyhow::bail!("CLICK_RETRY_BASE_DELAY_MS must be greater than 0");
        }

        if self.click_retry_max_delay_ms < self.click_retry_base_delay_ms {
            anyhow::bail!(
                "CLICK_RETRY_MAX_DELAY_MS ({}) must not be below CLICK_RETRY_BASE_DELAY_MS ({})",
                self.click_retry_max_delay_ms,
                self.click_retry_base_delay_ms
            );
        }

        if self.click_attempt_timeout_ms == 0 {
            anyhow::bail!("CLICK_ATTEMPT_TIMEOUT_MS must be greater than 0");
        }

        if self.click_shutdown_timeout_secs == 0 {
            anyhow::bail!("CLICK_SHUTDOWN_TIMEOUT_SECS must be greater than 0");
        }

        if self.click_fallback_timeout_ms == 0 {
            anyhow::bail!("CLICK_FALLBACK_TIMEOUT_MS must be greater than 0");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.ua_classifier != "woothee" && self.ua_classifier != "heuristic" {
            anyhow::bail!(
                "UA_CLASSIFIER must be 'woothee' or 'heuristic', got '{}'",
                self.ua_classifier
            );
        }

        Ok(())
    }

    /// Builds the immutable settings for [`crate::application::services::ClickProcessor`].
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            worker_count: self.click_worker_count,
            queue_capacity: self.click_queue_capacity,
            retry_attempts: self.click_retry_attempts,
            retry_base_delay: Duration::from_millis(self.click_retry_base_delay_ms),
            retry_max_delay: Duration::from_millis(self.click_retry_max_delay_ms),
            attempt_timeout: Duration::from_millis(self.click_attempt_timeout_ms),
            shutdown_timeout: Duration::from_secs(self.click_shutdown_timeout_secs),
        }
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.click_fallback_timeout_ms)
    }

    /// Returns whether the woothee classifier should be installed.
    pub fn is_classifier_enabled(&self) -> bool {
        self.ua_classifier == "woothee"
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Click workers: {}", self.click_worker_count);
        tracing::info!("  Click queue capacity: {}", self.click_queue_capacity);
        tracing::info!(
            "  Click retries: {} (base {}ms, max {}ms)",
            self.click_retry_attempts,
            self.click_retry_base_delay_ms,
            self.click_retry_max_delay_ms
        );
        tracing::info!("  Attempt timeout: {}ms", self.click_attempt_timeout_ms);
        tracing::info!("  Shutdown timeout: {}s", self.click_shutdown_timeout_secs);
        tracing::info!("  UA classifier: {}", self.ua_classifier);
    }
}

/// Parses an optional variable, keeping `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "CLICK_WORKER_COUNT",
        "CLICK_QUEUE_CAPACITY",
        "CLICK_RETRY_ATTEMPTS",
        "CLICK_RETRY_BASE_DELAY_MS",
        "CLICK_RETRY_MAX_DELAY_MS",
        "CLICK_ATTEMPT_TIMEOUT_MS",
        "CLICK_SHUTDOWN_TIMEOUT_SECS",
        "CLICK_FALLBACK_TIMEOUT_MS",
        "UA_CLASSIFIER",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            for var in VARS {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        // Test invalid worker count
        config.click_worker_count = 0;
        assert!(config.validate().is_err());
        config.click_worker_count = 3;

        // Test invalid queue capacity
        config.click_queue_capacity = 2_000_000;
        assert!(config.validate().is_err());
        config.click_queue_capacity = 1000;

        // Test max delay below base delay
        config.click_retry_max_delay_ms = 10;
        assert!(config.validate().is_err());
        config.click_retry_max_delay_ms = 60_000;

        // Test invalid log format
        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());

        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        // Test invalid classifier
        config.ua_classifier = "regex".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_processor_config_conversion() {
        let config = Config {
            click_retry_base_delay_ms: 250,
            click_shutdown_timeout_secs: 5,
            ..Config::default()
        };

        let processor = config.processor_config();

        assert_eq!(processor.worker_count, 3);
        assert_eq!(processor.queue_capacity, 1000);
        assert_eq!(processor.retry_base_delay, Duration::from_millis(250));
        assert_eq!(processor.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.fallback_timeout(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.click_worker_count, 3);
        assert_eq!(config.click_queue_capacity, 1000);
        assert_eq!(config.click_retry_attempts, 3);
        assert!(config.is_classifier_enabled());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("CLICK_WORKER_COUNT", "8");
            env::set_var("CLICK_QUEUE_CAPACITY", " 500 ");
            env::set_var("UA_CLASSIFIER", "heuristic");
        }

        let config = load_from_env().unwrap();

        assert_eq!(config.click_worker_count, 8);
        assert_eq!(config.click_queue_capacity, 500);
        assert!(!config.is_classifier_enabled());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("CLICK_RETRY_ATTEMPTS", "three");
        }

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("CLICK_RETRY_ATTEMPTS"));

        clear_env();
    }
}
