//! Export run results to JSON.
//!
//! Every export is wrapped in a small envelope (tool name, generation time,
//! policy version) so files stay self-describing when archived.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::{RunOutput, ScenarioOutcome};
use crate::error::{AppError, EngineError};

const TOOL: &str = "alloc";

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    policy_version: &'a str,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize)]
struct RunBody<'a> {
    run: &'a RunOutput,
}

#[derive(Debug, Serialize)]
struct BatchBody<'a> {
    scenarios: Vec<ScenarioRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct ScenarioRecord<'a> {
    name: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<&'a RunOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> ScenarioRecord<'a> {
    fn from_outcome(outcome: &'a ScenarioOutcome) -> Self {
        match &outcome.result {
            Ok(run) => Self {
                name: &outcome.name,
                status: "ok",
                run: Some(run),
                error: None,
            },
            Err(err) => Self {
                name: &outcome.name,
                status: match err {
                    EngineError::DegenerateAllocation => "no_signal",
                    _ => "error",
                },
                run: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Render a single run as pretty JSON.
pub fn run_to_json(run: &RunOutput) -> Result<String, AppError> {
    let envelope = Envelope {
        tool: TOOL,
        generated_at: Utc::now(),
        policy_version: &run.policy_version,
        body: RunBody { run },
    };
    serde_json::to_string_pretty(&envelope).map_err(|e| AppError::config(format!("Failed to render JSON: {e}")))
}

/// Render a batch as pretty JSON.
pub fn batch_to_json(outcomes: &[ScenarioOutcome], policy_version: &str) -> Result<String, AppError> {
    let envelope = Envelope {
        tool: TOOL,
        generated_at: Utc::now(),
        policy_version,
        body: BatchBody {
            scenarios: outcomes.iter().map(ScenarioRecord::from_outcome).collect(),
        },
    };
    serde_json::to_string_pretty(&envelope).map_err(|e| AppError::config(format!("Failed to render JSON: {e}")))
}

/// Write rendered JSON to `path`.
pub fn write_json(path: &Path, json: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export '{}': {e}", path.display())))?;
    writeln!(file, "{json}").map_err(|e| AppError::config(format!("Failed to write export: {e}")))?;
    tracing::info!(path = %path.display(), "wrote export");
    Ok(())
}
