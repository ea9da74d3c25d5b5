use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use packtrack_common::Event;

/// Reads events from a JSON file. The file may hold a single event object
/// or an array of events; with `ndjson` each non-blank line is one event.
pub fn read_events_from_file(path: &Path, ndjson: bool) -> Result<Vec<Event>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if ndjson {
        parse_ndjson(&raw)
    } else {
        parse_json(&raw).context("file is not a valid JSON event or array")
    }
}

pub fn read_events_from_stdin(ndjson: bool) -> Result<Vec<Event>> {
    let mut raw = Vec::new();
    std::io::stdin()
        .read_to_end(&mut raw)
        .context("failed to read STDIN")?;
    if ndjson {
        parse_ndjson(&raw)
    } else {
        parse_json(&raw)
            .context("STDIN is not a valid JSON event or array; use --ndjson for newline-delimited input")
    }
}

fn parse_json(raw: &[u8]) -> Result<Vec<Event>> {
    if let Ok(events) = serde_json::from_slice::<Vec<Event>>(raw) {
        return Ok(events);
    }
    let event: Event = serde_json::from_slice(raw)?;
    Ok(vec![event])
}

fn parse_ndjson(raw: &[u8]) -> Result<Vec<Event>> {
    let text = std::str::from_utf8(raw).context("input is not valid UTF-8")?;
    let mut events = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(event) => events.push(event),
            Err(err) => bail!("invalid NDJSON line {}: {err}", number + 1),
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EVENT_JSON: &str = r#"{
        "timestamp": "2025-06-01T12:00:00Z",
        "source": {"system": "ci"},
        "workflow": {"id": "wf-1"},
        "actor": {"type": "agent", "id": "a1"},
        "severity": "info",
        "status": "ok",
        "message": "done"
    }"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_single_object_file() {
        let file = write_temp(EVENT_JSON);
        let events = read_events_from_file(file.path(), false).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "done");
    }

    #[test]
    fn reads_array_file() {
        let file = write_temp(&format!("[{EVENT_JSON},{EVENT_JSON}]"));
        let events = read_events_from_file(file.path(), false).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn reads_ndjson_skipping_blank_lines() {
        let line = EVENT_JSON.replace('\n', " ");
        let file = write_temp(&format!("{line}\n\n{line}\n"));
        let events = read_events_from_file(file.path(), true).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn rejects_invalid_ndjson_line_with_position() {
        let line = EVENT_JSON.replace('\n', " ");
        let file = write_temp(&format!("{line}\nnot-json\n"));
        let err = read_events_from_file(file.path(), true).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_non_event_json() {
        let file = write_temp(r#"{"unexpected": true}"#);
        assert!(read_events_from_file(file.path(), false).is_err());
    }
}
