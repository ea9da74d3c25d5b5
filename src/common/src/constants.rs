use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pack.shimcounty.com";
pub const INGEST_PATH: &str = "/api/ingest";
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_JITTER: f64 = 0.2;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Response bodies are read up to this many bytes; the rest is discarded.
pub const MAX_RESPONSE_BODY_BYTES: usize = 1 << 20;
