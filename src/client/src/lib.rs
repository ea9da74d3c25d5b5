pub mod async_client;
pub mod backoff;
pub mod client;
pub mod config;

mod compress;
mod retry;
mod transport;

pub use async_client::AsyncClient;
pub use backoff::BackoffPolicy;
pub use client::Client;
pub use config::{AsyncConfig, Compression, Config, RetryConfig};
pub use transport::IngestResponse;

pub use packtrack_common::{
    Actor, Event, IngestError, MetricsHooks, Severity, Source, Status, Workflow,
};
