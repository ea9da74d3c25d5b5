use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use packtrack_common::{Actor, Event, Source, Workflow};
use serde_json::{Map, Value};

use crate::args::Cli;

/// Builds a single event from command-line flags, validating required fields.
pub fn build_event(args: &Cli) -> Result<Event> {
    let timestamp = match &args.timestamp {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --timestamp: {raw}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let source_system = require(&args.source_system, "--source-system")?;
    let workflow_id = require(&args.workflow_id, "--workflow-id")?;
    let actor_type = require(&args.actor_type, "--actor-type")?;
    let actor_id = require(&args.actor_id, "--actor-id")?;
    let severity = args
        .severity
        .context("missing required --severity")?;
    let status = args.status.context("missing required --status")?;
    let message = require(&args.message, "--message")?;

    Ok(Event {
        timestamp,
        source: Source {
            system: source_system,
            env: args.source_env.clone(),
        },
        workflow: Workflow {
            id: workflow_id,
            name: args.workflow_name.clone(),
            run_id: args.run_id.clone(),
            step_id: args.step_id.clone(),
        },
        actor: Actor {
            actor_type,
            id: actor_id,
            display_name: args.actor_display.clone(),
        },
        severity,
        status,
        message,
        metadata: parse_json_object(&args.metadata, "--metadata")?,
        extra: parse_json_object(&args.extra, "--extra")?,
    })
}

fn require(field: &Option<String>, flag: &str) -> Result<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => bail!("missing required {flag}"),
    }
}

fn parse_json_object(raw: &Option<String>, flag: &str) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => bail!("invalid {flag} JSON: expected an object"),
            Err(err) => bail!("invalid {flag} JSON: {err}"),
        },
    }
}
