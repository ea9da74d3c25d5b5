use packtrack_common::{IngestError, MetricsHooks};
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::transport::{DeliveryOutcome, IngestResponse, Transmitter};

/// Drives the transmitter across attempts: stop on success or terminal
/// failure, back off and retry on retryable failure while budget remains.
pub(crate) struct RetrySender {
    transmitter: Transmitter,
    backoff: BackoffPolicy,
    max_attempts: u32,
    hooks: MetricsHooks,
}

impl RetrySender {
    pub(crate) fn new(
        transmitter: Transmitter,
        backoff: BackoffPolicy,
        max_attempts: u32,
        hooks: MetricsHooks,
    ) -> Self {
        Self {
            transmitter,
            backoff,
            // At least one attempt always occurs.
            max_attempts: max_attempts.max(1),
            hooks,
        }
    }

    pub(crate) async fn send(
        &self,
        payload: &[u8],
        content_encoding: Option<&str>,
        event_count: usize,
    ) -> Result<IngestResponse, IngestError> {
        let mut attempt: u32 = 0;
        loop {
            match self.transmitter.attempt(payload, content_encoding).await {
                DeliveryOutcome::Success(response) => {
                    debug!(
                        attempts = attempt + 1,
                        status = response.status,
                        "ingest succeeded"
                    );
                    self.hooks.ingest_success(event_count);
                    return Ok(response);
                }
                DeliveryOutcome::Terminal(err) => {
                    warn!(attempts = attempt + 1, error = %err, "terminal ingest failure");
                    self.hooks.ingest_failure(event_count);
                    return Err(err);
                }
                DeliveryOutcome::Retryable(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(
                            attempts = attempt,
                            error = %err,
                            "ingest retries exhausted"
                        );
                        self.hooks.ingest_failure(event_count);
                        return Err(err);
                    }
                    let delay = self.backoff.delay(attempt - 1);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying ingest after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
