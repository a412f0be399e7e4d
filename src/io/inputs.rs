//! Read crisp inputs and scenario lists from TOML.
//!
//! Inputs file:
//!
//! ```toml
//! [inputs]
//! cape_ratio = 37.63
//! fed_funds_rate = 0.25
//! time_horizon = 20
//! cashflow = 1.0
//! cpi = 4.8
//! ```
//!
//! Scenario file (the optional top-level `[inputs]` is a base every scenario
//! overlays):
//!
//! ```toml
//! [inputs]
//! time_horizon = 20
//! cashflow = 1.0
//!
//! [[scenario]]
//! name = "2021"
//! inputs = { cape_ratio = 37.63, fed_funds_rate = 0.25, cpi = 4.8 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::data::Scenario;
use crate::domain::CrispVar;
use crate::error::AppError;
use crate::fuzzy::CrispInputs;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputsFile {
    #[serde(default)]
    inputs: BTreeMap<String, f64>,
    #[serde(default)]
    scenario: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioEntry {
    name: String,
    #[serde(default)]
    inputs: BTreeMap<String, f64>,
}

fn to_crisp(raw: BTreeMap<String, f64>) -> Result<CrispInputs, AppError> {
    let mut out = CrispInputs::new();
    for (key, value) in raw {
        let var: CrispVar = key.parse().map_err(AppError::config)?;
        out.set(var, value);
    }
    Ok(out)
}

fn parse_file(text: &str) -> Result<InputsFile, AppError> {
    toml::from_str(text).map_err(|e| AppError::config(format!("Invalid inputs TOML: {e}")))
}

/// Parse an `[inputs]` table.
pub fn parse_inputs(text: &str) -> Result<CrispInputs, AppError> {
    let file = parse_file(text)?;
    if !file.scenario.is_empty() {
        return Err(AppError::config(
            "Inputs file contains [[scenario]] entries; use `alloc batch` for scenario files.",
        ));
    }
    to_crisp(file.inputs)
}

/// Parse a scenario list; each scenario overlays the optional base `[inputs]`.
pub fn parse_scenarios(text: &str) -> Result<Vec<Scenario>, AppError> {
    let file = parse_file(text)?;
    if file.scenario.is_empty() {
        return Err(AppError::config("Scenario file has no [[scenario]] entries."));
    }
    let base = to_crisp(file.inputs)?;

    let mut out = Vec::with_capacity(file.scenario.len());
    for entry in file.scenario {
        let overrides = to_crisp(entry.inputs)
            .map_err(|e| AppError::config(format!("Scenario '{}': {e}", entry.name)))?;
        out.push(Scenario {
            name: entry.name,
            inputs: base.merged(&overrides),
        });
    }
    Ok(out)
}

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Failed to read '{}': {e}", path.display())))
}

pub fn load_inputs(path: &Path) -> Result<CrispInputs, AppError> {
    parse_inputs(&read(path)?).map_err(|e| AppError::config(format!("{}: {e}", path.display())))
}

pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, AppError> {
    parse_scenarios(&read(path)?).map_err(|e| AppError::config(format!("{}: {e}", path.display())))
}
