use thiserror::Error;

/// Typed error surface for the PackTrack SDK.
///
/// The retry loop only re-attempts errors for which [`IngestError::is_retryable`]
/// returns true: transport failures, 5xx responses and 429. Any other HTTP
/// rejection is terminal and surfaces immediately.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("async client is closed")]
    Closed,

    #[error("event queue is full")]
    QueueFull,

    #[error("operation timed out")]
    Timeout,

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to compress payload: {0}")]
    Compress(#[from] std::io::Error),

    #[error("ingest rejected: status={status} retryable={retryable}: {body}")]
    Status {
        status: u16,
        retryable: bool,
        body: String,
    },

    #[error("ingest transport error: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
}

impl IngestError {
    pub fn is_retryable(&self) -> bool {
        match self {
            IngestError::Transport { .. } => true,
            IngestError::Status { retryable, .. } => *retryable,
            IngestError::Timeout => true,
            _ => false,
        }
    }

    /// HTTP status code of the rejection, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            IngestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify_by_code() {
        let server = IngestError::Status {
            status: 503,
            retryable: true,
            body: String::new(),
        };
        let client = IngestError::Status {
            status: 400,
            retryable: false,
            body: String::new(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert_eq!(server.status_code(), Some(503));
    }

    #[test]
    fn lifecycle_errors_are_not_retryable() {
        assert!(!IngestError::Closed.is_retryable());
        assert!(!IngestError::QueueFull.is_retryable());
        assert!(!IngestError::Config("bad".into()).is_retryable());
    }
}
