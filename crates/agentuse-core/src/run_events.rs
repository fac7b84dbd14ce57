use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::log_rotation::{append_line_with_rotation, LogRotationPolicy};

/// One line of the run's NDJSON event log: orchestrator lifecycle events
/// (a trial starting or finishing, a cost budget tripping) recorded
/// alongside the tracing output, so a run's shape survives after its
/// process exits.
#[derive(Debug, Clone, Serialize)]
pub struct RunEventRecord<'a> {
    pub ts_unix_ms: u64,
    pub run_id: &'a str,
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'a str>,
}

/// Appends [`RunEventRecord`]s to a rotating NDJSON file.
pub struct RunEventLog {
    path: PathBuf,
    policy: LogRotationPolicy,
}

impl RunEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: LogRotationPolicy::from_env(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: &RunEventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        append_line_with_rotation(&self.path, &line, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::{RunEventLog, RunEventRecord};

    #[test]
    fn records_round_trip_through_the_log_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = RunEventLog::new(temp.path().join("run-events.jsonl"));

        log.record(&RunEventRecord {
            ts_unix_ms: 1,
            run_id: "run-1",
            kind: "trial_started",
            model: Some("openai:gpt-4o"),
            scenario_id: Some("scenario-1"),
            trial_number: Some(1),
            detail: None,
        })
        .expect("record event");

        let contents = std::fs::read_to_string(log.path()).expect("read log");
        assert!(contents.contains("\"kind\":\"trial_started\""));
        assert!(contents.contains("\"scenario_id\":\"scenario-1\""));
    }
}
