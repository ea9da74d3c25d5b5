use std::time::Duration;

use packtrack_client::{Config, RetryConfig};
use packtrack_common::{Actor, Event, Severity, Source, Status, Workflow};
use serde_json::Map;
use wiremock::MockServer;

pub fn test_event(message: &str) -> Event {
    Event {
        timestamp: chrono::Utc::now(),
        source: Source {
            system: "test".into(),
            env: None,
        },
        workflow: Workflow {
            id: "wf".into(),
            name: None,
            run_id: Some("run-1".into()),
            step_id: None,
        },
        actor: Actor {
            actor_type: "agent".into(),
            id: "a1".into(),
            display_name: None,
        },
        severity: Severity::Info,
        status: Status::Ok,
        message: message.into(),
        metadata: Map::new(),
        extra: Map::new(),
    }
}

/// Client config pointed at a mock server, with fast deterministic retries.
pub fn test_config(server: &MockServer, max_attempts: u32) -> Config {
    let mut cfg = Config::new(server.uri(), "test-key");
    cfg.retry = RetryConfig {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        jitter: 0.0,
    };
    cfg
}

/// Polls until the server has received at least `want` requests, panicking
/// after a few seconds so stuck tests fail fast.
pub async fn wait_for_requests(server: &MockServer, want: usize) -> Vec<wiremock::Request> {
    for _ in 0..300 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= want {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("mock server did not receive {want} requests in time");
}

pub fn decode_batch(request: &wiremock::Request) -> Vec<Event> {
    serde_json::from_slice(&request.body).expect("request body should be a JSON batch")
}
