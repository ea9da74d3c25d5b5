use packtrack_common::{Event, IngestError, MetricsHooks};
use tracing::debug;

use crate::backoff::BackoffPolicy;
use crate::compress;
use crate::config::{Compression, Config};
use crate::retry::RetrySender;
use crate::transport::{IngestResponse, Transmitter};

/// Synchronous PackTrack ingestion client.
///
/// Stateless beyond configuration: every ingest call encodes the payload and
/// drives it through the retrying sender. Use [`crate::AsyncClient`] for
/// buffered background submission.
pub struct Client {
    cfg: Config,
    http: reqwest::Client,
    sender: RetrySender,
}

impl Client {
    pub fn new(cfg: Config) -> Result<Self, IngestError> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(&cfg.user_agent)
            .build()
            .map_err(|e| IngestError::Config(format!("failed to build http client: {e}")))?;
        let transmitter = Transmitter::new(&cfg, http.clone());
        let sender = RetrySender::new(
            transmitter,
            BackoffPolicy::from_retry(&cfg.retry),
            cfg.retry.max_attempts,
            cfg.hooks.clone(),
        );
        Ok(Self { cfg, http, sender })
    }

    /// Submits a single event, blocking until it is accepted or a final
    /// failure is returned.
    pub async fn ingest_event(&self, event: &Event) -> Result<IngestResponse, IngestError> {
        let payload = serde_json::to_vec(event)?;
        self.send(payload, 1).await
    }

    /// Submits an ordered batch of events in one transmission attempt chain.
    pub async fn ingest_batch(&self, events: &[Event]) -> Result<IngestResponse, IngestError> {
        let payload = serde_json::to_vec(events)?;
        self.send(payload, events.len()).await
    }

    /// Polls the configured health endpoint. Returns false when health
    /// checking is disabled or on any failure; never errors.
    pub async fn health_check(&self) -> bool {
        if !self.cfg.health_enabled {
            return false;
        }
        let url = format!(
            "{}{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.health_path
        );
        match self
            .http
            .get(&url)
            .header("X-PackTrack-Key", &self.cfg.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    pub(crate) fn hooks(&self) -> &MetricsHooks {
        &self.cfg.hooks
    }

    async fn send(
        &self,
        payload: Vec<u8>,
        event_count: usize,
    ) -> Result<IngestResponse, IngestError> {
        let (payload, encoding) = match self.cfg.compression {
            Compression::Gzip => (compress::gzip(&payload)?, Some("gzip")),
            Compression::None => (payload, None),
        };
        self.sender.send(&payload, encoding, event_count).await
    }
}
