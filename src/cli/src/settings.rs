use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config as RConfig, Environment};
use packtrack_client::{AsyncConfig, Compression, Config, RetryConfig};
use packtrack_common::constants::{
    DEFAULT_BASE_URL, DEFAULT_HEALTH_PATH, DEFAULT_INITIAL_BACKOFF, DEFAULT_JITTER,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF, DEFAULT_TIMEOUT,
};
use serde::Deserialize;

use crate::args::Cli;

/// Resolved CLI configuration: documented defaults, overridden by
/// `PACKTRACK_`-prefixed environment variables, overridden by flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
    pub jitter: f64,
    pub user_agent: Option<String>,
    pub idempotency_key: Option<String>,
    pub gzip: bool,
    pub health_path: String,

    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub queue_capacity: usize,
}

impl Settings {
    pub fn load(args: &Cli) -> Result<Self> {
        let builder = RConfig::builder()
            .set_default("api_key", "")?
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_ms", DEFAULT_TIMEOUT.as_millis() as u64)?
            .set_default("retries", DEFAULT_MAX_ATTEMPTS as u64)?
            .set_default(
                "backoff_initial_ms",
                DEFAULT_INITIAL_BACKOFF.as_millis() as u64,
            )?
            .set_default("backoff_max_ms", DEFAULT_MAX_BACKOFF.as_millis() as u64)?
            .set_default("jitter", DEFAULT_JITTER)?
            .set_default("user_agent", None::<String>)?
            .set_default("idempotency_key", None::<String>)?
            .set_default("gzip", false)?
            .set_default("health_path", DEFAULT_HEALTH_PATH)?
            .set_default("batch_size", 100u64)?
            .set_default("flush_interval_ms", 1000u64)?
            .set_default("queue_capacity", 10_000u64)?
            .add_source(Environment::with_prefix("PACKTRACK"));

        let mut settings: Settings = builder
            .build()?
            .try_deserialize()
            .context("failed to load configuration")?;
        settings.apply_flags(args);
        Ok(settings)
    }

    fn apply_flags(&mut self, args: &Cli) {
        if let Some(v) = &args.api_key {
            self.api_key = v.clone();
        }
        if let Some(v) = &args.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = args.timeout_ms {
            self.timeout_ms = v;
        }
        if let Some(v) = args.retries {
            self.retries = v;
        }
        if let Some(v) = args.backoff_initial_ms {
            self.backoff_initial_ms = v;
        }
        if let Some(v) = args.backoff_max_ms {
            self.backoff_max_ms = v;
        }
        if let Some(v) = args.jitter {
            self.jitter = v;
        }
        if let Some(v) = &args.user_agent {
            self.user_agent = Some(v.clone());
        }
        if let Some(v) = &args.idempotency_key {
            self.idempotency_key = Some(v.clone());
        }
        if args.gzip {
            self.gzip = true;
        }
        if let Some(v) = &args.health_path {
            self.health_path = v.clone();
        }
        if let Some(v) = args.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = args.flush_interval_ms {
            self.flush_interval_ms = v;
        }
        if let Some(v) = args.queue_capacity {
            self.queue_capacity = v;
        }
    }

    pub fn client_config(&self, health_enabled: bool) -> Config {
        let mut cfg = Config::new(self.base_url.clone(), self.api_key.clone());
        cfg.timeout = Duration::from_millis(self.timeout_ms);
        cfg.retry = RetryConfig {
            max_attempts: self.retries,
            initial_backoff: Duration::from_millis(self.backoff_initial_ms),
            max_backoff: Duration::from_millis(self.backoff_max_ms),
            jitter: self.jitter.clamp(0.0, 1.0),
        };
        if let Some(user_agent) = &self.user_agent {
            cfg.user_agent = format!(
                "{user_agent} packtrack-logger/{}",
                env!("CARGO_PKG_VERSION")
            );
        }
        cfg.idempotency_key = self.idempotency_key.clone();
        if self.gzip {
            cfg.compression = Compression::Gzip;
        }
        cfg.health_enabled = health_enabled;
        cfg.health_path = self.health_path.clone();
        cfg
    }

    pub fn async_config(&self) -> AsyncConfig {
        AsyncConfig {
            batch_size: self.batch_size,
            flush_interval: Duration::from_millis(self.flush_interval_ms),
            queue_capacity: self.queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("packtrack-logger").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_match_sdk_documentation() {
        let settings = Settings::load(&parse(&[])).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_ms, 15_000);
        assert_eq!(settings.retries, 3);
        assert_eq!(settings.backoff_initial_ms, 100);
        assert_eq!(settings.backoff_max_ms, 2_000);
        assert_eq!(settings.batch_size, 100);
        assert_eq!(settings.flush_interval_ms, 1_000);
        assert_eq!(settings.queue_capacity, 10_000);
        assert!(!settings.gzip);
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--api-key",
            "k1",
            "--base-url",
            "http://localhost:9000",
            "--retries",
            "5",
            "--gzip",
            "--batch-size",
            "7",
        ]);
        let settings = Settings::load(&args).unwrap();
        assert_eq!(settings.api_key, "k1");
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.retries, 5);
        assert!(settings.gzip);
        assert_eq!(settings.batch_size, 7);
    }

    #[test]
    fn client_config_carries_retry_and_compression() {
        let args = parse(&["--api-key", "k", "--gzip", "--jitter", "0.5"]);
        let settings = Settings::load(&args).unwrap();
        let cfg = settings.client_config(false);
        assert_eq!(cfg.compression, Compression::Gzip);
        assert!((cfg.retry.jitter - 0.5).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }
}
