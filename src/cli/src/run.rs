use std::time::Duration;

use packtrack_client::{AsyncClient, Client};
use packtrack_common::{Event, IngestError};
use tracing::{debug, info};

use crate::args::Cli;
use crate::event::build_event;
use crate::input::{read_events_from_file, read_events_from_stdin};
use crate::settings::Settings;

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_SDK_ERROR: i32 = 2;
pub const EXIT_RETRY_EXHAUSTED: i32 = 3;
pub const EXIT_INPUT_ERROR: i32 = 4;

/// Deadline for the async flush and final drain on shutdown.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

pub async fn run(args: Cli) -> i32 {
    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err:#}");
            return EXIT_INVALID;
        }
    };

    if args.health {
        return run_health_check(&settings).await;
    }

    // Input precedence: file, then stdin, then a single event from flags.
    let events = if let Some(path) = &args.file {
        match read_events_from_file(path, args.ndjson) {
            Ok(events) => events,
            Err(err) => {
                eprintln!("input error: {err:#}");
                return EXIT_INPUT_ERROR;
            }
        }
    } else if args.stdin {
        match read_events_from_stdin(args.ndjson) {
            Ok(events) => events,
            Err(err) => {
                eprintln!("input error: {err:#}");
                return EXIT_INPUT_ERROR;
            }
        }
    } else {
        match build_event(&args) {
            Ok(event) => vec![event],
            Err(err) => {
                eprintln!("invalid: {err:#}");
                return EXIT_INVALID;
            }
        }
    };

    if args.dry_run {
        info!(count = events.len(), "dry-run: validation passed");
        return EXIT_OK;
    }

    if settings.api_key.is_empty() {
        eprintln!("error: missing --api-key or PACKTRACK_API_KEY");
        return EXIT_INVALID;
    }

    let client = match Client::new(settings.client_config(false)) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_INVALID;
        }
    };

    if args.use_async {
        run_async(client, &settings, events).await
    } else {
        run_sync(client, &settings, events).await
    }
}

async fn run_health_check(settings: &Settings) -> i32 {
    let client = match Client::new(settings.client_config(true)) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_INVALID;
        }
    };
    let healthy = client.health_check().await;
    info!(healthy, "health check completed");
    if healthy {
        EXIT_OK
    } else {
        EXIT_INVALID
    }
}

async fn run_sync(client: Client, settings: &Settings, events: Vec<Event>) -> i32 {
    if events.len() == 1 {
        if let Err(err) = client.ingest_event(&events[0]).await {
            eprintln!("ingest error: {err}");
            return classify(&err);
        }
        return EXIT_OK;
    }

    // Split large inputs into batch-size chunks.
    for chunk in events.chunks(settings.batch_size.max(1)) {
        if let Err(err) = client.ingest_batch(chunk).await {
            eprintln!("batch ingest error: {err}");
            return classify(&err);
        }
        debug!(count = chunk.len(), "batch submitted");
    }
    EXIT_OK
}

async fn run_async(client: Client, settings: &Settings, events: Vec<Event>) -> i32 {
    let async_client = match AsyncClient::new(client, settings.async_config()) {
        Ok(async_client) => async_client,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_INVALID;
        }
    };

    for event in events {
        if let Err(err) = async_client.enqueue(event) {
            eprintln!("enqueue error: {err}");
            return EXIT_SDK_ERROR;
        }
    }
    if let Err(err) = async_client.flush(SHUTDOWN_DEADLINE).await {
        eprintln!("flush error: {err}");
        return classify(&err);
    }
    if let Err(err) = async_client.close(SHUTDOWN_DEADLINE).await {
        eprintln!("close error: {err}");
        return classify(&err);
    }
    EXIT_OK
}

fn classify(err: &IngestError) -> i32 {
    if err.is_retryable() {
        EXIT_RETRY_EXHAUSTED
    } else {
        EXIT_SDK_ERROR
    }
}
