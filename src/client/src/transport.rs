use packtrack_common::constants::{INGEST_PATH, MAX_RESPONSE_BODY_BYTES};
use packtrack_common::IngestError;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;

use crate::config::Config;

/// Minimal response surface for a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Outcome of a single transmission attempt. Drives loop termination in the
/// retrying sender.
#[derive(Debug)]
pub(crate) enum DeliveryOutcome {
    Success(IngestResponse),
    Retryable(IngestError),
    Terminal(IngestError),
}

/// Performs exactly one request/response exchange with the ingest endpoint
/// and classifies the result.
pub(crate) struct Transmitter {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    idempotency_key: Option<String>,
}

impl Transmitter {
    pub(crate) fn new(cfg: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", cfg.base_url.trim_end_matches('/'), INGEST_PATH),
            api_key: cfg.api_key.clone(),
            idempotency_key: cfg.idempotency_key.clone(),
        }
    }

    /// Classification: transport failure and 5xx/429 are retryable, other
    /// non-2xx statuses are terminal.
    pub(crate) async fn attempt(
        &self,
        payload: &[u8],
        content_encoding: Option<&str>,
    ) -> DeliveryOutcome {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("X-PackTrack-Key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec());
        if let Some(encoding) = content_encoding {
            request = request.header(CONTENT_ENCODING, encoding);
        }
        if let Some(key) = &self.idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                return DeliveryOutcome::Retryable(IngestError::Transport { source });
            }
        };

        let status = response.status().as_u16();
        let body = read_capped_body(response).await;
        debug!(status, body_len = body.len(), "ingest attempt completed");

        if (200..300).contains(&status) {
            return DeliveryOutcome::Success(IngestResponse { status, body });
        }

        let retryable = status >= 500 || status == 429;
        let err = IngestError::Status {
            status,
            retryable,
            body: String::from_utf8_lossy(&body).into_owned(),
        };
        if retryable {
            DeliveryOutcome::Retryable(err)
        } else {
            DeliveryOutcome::Terminal(err)
        }
    }
}

/// Reads at most [`MAX_RESPONSE_BODY_BYTES`]; anything beyond the cap is
/// discarded without an error.
async fn read_capped_body(mut response: reqwest::Response) -> Vec<u8> {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        let remaining = MAX_RESPONSE_BODY_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    body
}
