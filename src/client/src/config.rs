use std::time::Duration;

use packtrack_common::constants::{
    DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_HEALTH_PATH,
    DEFAULT_INITIAL_BACKOFF, DEFAULT_JITTER, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_TIMEOUT,
};
use packtrack_common::{IngestError, MetricsHooks};

/// Payload compression applied before transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

/// Retry behavior for a single logical send.
///
/// `max_attempts == 0` is treated as one attempt. `jitter` is clamped to
/// [0, 1] when the backoff policy is built. `initial_backoff` larger than
/// `max_backoff` is allowed; computed delays always clamp to `max_backoff`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// Configuration for the synchronous [`crate::Client`].
///
/// All fields are plain named values with documented defaults; construction
/// validates them and fails fast instead of silently papering over mistakes.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
    pub compression: Compression,
    pub idempotency_key: Option<String>,
    pub health_enabled: bool,
    pub health_path: String,
    pub hooks: MetricsHooks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("packtrack-sdk-rust/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryConfig::default(),
            compression: Compression::None,
            idempotency_key: None,
            health_enabled: false,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            hooks: MetricsHooks::default(),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Required fields are rejected when missing, never defaulted.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.api_key.is_empty() {
            return Err(IngestError::Config("api key is required".into()));
        }
        if self.base_url.is_empty() {
            return Err(IngestError::Config("base url is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(IngestError::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration for the [`crate::AsyncClient`] batching engine.
///
/// A zero `flush_interval` disables timer-triggered flushing; only
/// size-triggered and explicit flushes occur. Zero `batch_size` or
/// `queue_capacity` is rejected at construction.
#[derive(Debug, Clone)]
pub struct AsyncConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl AsyncConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_size == 0 {
            return Err(IngestError::Config("batch size must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(IngestError::Config(
                "queue capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(15));
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(cfg.retry.max_backoff, Duration::from_secs(2));
        assert!((cfg.retry.jitter - 0.2).abs() < f64::EPSILON);
        assert!(!cfg.health_enabled);
        assert_eq!(cfg.health_path, "/api/health");
    }

    #[test]
    fn validate_rejects_missing_required_fields() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.validate(), Err(IngestError::Config(_))));

        cfg.api_key = "key".into();
        assert!(cfg.validate().is_ok());

        cfg.base_url.clear();
        assert!(matches!(cfg.validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn async_config_rejects_zero_sizes() {
        let cfg = AsyncConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AsyncConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        assert!(AsyncConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_flush_interval_is_valid() {
        let cfg = AsyncConfig {
            flush_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
