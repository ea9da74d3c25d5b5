use std::path::PathBuf;

use clap::Parser;
use packtrack_common::{Severity, Status};

/// Submit structured telemetry events to a PackTrack ingestion service.
///
/// Every flag has an environment-variable counterpart with the `PACKTRACK_`
/// prefix (e.g. `PACKTRACK_API_KEY`, `PACKTRACK_BASE_URL`); flags take
/// precedence over the environment.
#[derive(Debug, Parser)]
#[command(name = "packtrack-logger", version, about)]
pub struct Cli {
    /// PackTrack API key (or set PACKTRACK_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,
    /// PackTrack base URL
    #[arg(long)]
    pub base_url: Option<String>,
    /// Request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Retry attempts per send
    #[arg(long)]
    pub retries: Option<u32>,
    /// Initial backoff in milliseconds
    #[arg(long)]
    pub backoff_initial_ms: Option<u64>,
    /// Maximum backoff in milliseconds
    #[arg(long)]
    pub backoff_max_ms: Option<u64>,
    /// Backoff jitter fraction in [0, 1]
    #[arg(long)]
    pub jitter: Option<f64>,
    /// Override the User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Optional idempotency key header
    #[arg(long)]
    pub idempotency_key: Option<String>,
    /// Gzip request payloads
    #[arg(long)]
    pub gzip: bool,
    /// Verbose output to stderr
    #[arg(long, short)]
    pub verbose: bool,
    /// Validate inputs without sending
    #[arg(long)]
    pub dry_run: bool,
    /// Perform a health check and exit
    #[arg(long)]
    pub health: bool,
    /// Health check path
    #[arg(long)]
    pub health_path: Option<String>,

    /// RFC3339 timestamp (default: now)
    #[arg(long)]
    pub timestamp: Option<String>,
    /// Event source system (required unless using --file/--stdin)
    #[arg(long)]
    pub source_system: Option<String>,
    /// Event source environment
    #[arg(long)]
    pub source_env: Option<String>,
    /// Workflow id (required unless using --file/--stdin)
    #[arg(long)]
    pub workflow_id: Option<String>,
    /// Workflow name
    #[arg(long)]
    pub workflow_name: Option<String>,
    /// Workflow run id
    #[arg(long)]
    pub run_id: Option<String>,
    /// Workflow step id
    #[arg(long)]
    pub step_id: Option<String>,
    /// Actor type (required unless using --file/--stdin)
    #[arg(long)]
    pub actor_type: Option<String>,
    /// Actor id (required unless using --file/--stdin)
    #[arg(long)]
    pub actor_id: Option<String>,
    /// Actor display name
    #[arg(long)]
    pub actor_display: Option<String>,
    /// Severity [debug|info|warn|error]
    #[arg(long)]
    pub severity: Option<Severity>,
    /// Status [ok|failed|skipped|timeout|retrying|unknown]
    #[arg(long)]
    pub status: Option<Status>,
    /// Message text
    #[arg(long)]
    pub message: Option<String>,
    /// Metadata JSON object
    #[arg(long)]
    pub metadata: Option<String>,
    /// Extra JSON object
    #[arg(long)]
    pub extra: Option<String>,

    /// Read event(s) from a JSON file (object or array); use --ndjson for NDJSON
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Read event(s) from STDIN
    #[arg(long)]
    pub stdin: bool,
    /// Treat input as newline-delimited JSON
    #[arg(long)]
    pub ndjson: bool,

    /// Use async batching
    #[arg(long = "async")]
    pub use_async: bool,
    /// Batch size for async mode, or split size in sync mode
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Async flush interval in milliseconds
    #[arg(long)]
    pub flush_interval_ms: Option<u64>,
    /// Async queue capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}
