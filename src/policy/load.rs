//! Read/write policy tables as TOML.
//!
//! File layout:
//!
//! ```toml
//! version = "reference-1"
//!
//! [[membership]]
//! var = "high_growth"
//! input = "cape_ratio"
//! shape = "line"
//! min = 16.85
//! max = 10.0
//!
//! [[rule]]
//! kind = "and"
//! left = "low_growth"
//! right = "high_rate"
//! output = "contractionary"
//! asset = "bonds"
//! weight = 50.0
//!
//! [labels.fuzzy]
//! deflation = "a deflationary environment"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{CrispVar, FuzzyVar};
use crate::error::{AppError, EngineError};
use crate::fuzzy::Shape;
use crate::policy::table::{Labels, MembershipDef, PolicyTable, Rule};

/// Environment variable naming a policy file to use when `--policy` is absent.
pub const POLICY_ENV: &str = "FUZZY_ALLOC_POLICY";

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    version: String,
    #[serde(default)]
    membership: Vec<MembershipEntry>,
    #[serde(default)]
    rule: Vec<Rule>,
    #[serde(default, skip_serializing_if = "LabelsFile::is_empty")]
    labels: LabelsFile,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LabelsFile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    crisp: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fuzzy: BTreeMap<String, String>,
}

impl LabelsFile {
    fn is_empty(&self) -> bool {
        self.crisp.is_empty() && self.fuzzy.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ShapeKind {
    Line,
    Triangle,
}

/// One `[[membership]]` table. Kept flat so unknown keys are rejected.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MembershipEntry {
    var: FuzzyVar,
    input: CrispVar,
    shape: ShapeKind,
    min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    middle: Option<f64>,
    max: f64,
}

impl MembershipEntry {
    fn into_def(self) -> Result<MembershipDef, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidShape {
            var: self.var,
            reason: reason.to_string(),
        };
        let shape = match (self.shape, self.middle) {
            (ShapeKind::Line, None) => Shape::Line {
                min: self.min,
                max: self.max,
            },
            (ShapeKind::Triangle, Some(middle)) => Shape::Triangle {
                min: self.min,
                middle,
                max: self.max,
            },
            (ShapeKind::Line, Some(_)) => return Err(invalid("a line shape takes no 'middle'")),
            (ShapeKind::Triangle, None) => return Err(invalid("a triangle shape needs 'middle'")),
        };
        Ok(MembershipDef {
            var: self.var,
            input: self.input,
            shape,
        })
    }
}

impl From<&MembershipDef> for MembershipEntry {
    fn from(def: &MembershipDef) -> Self {
        let (shape, min, middle, max) = match def.shape {
            Shape::Line { min, max } => (ShapeKind::Line, min, None, max),
            Shape::Triangle { min, middle, max } => (ShapeKind::Triangle, min, Some(middle), max),
        };
        Self {
            var: def.var,
            input: def.input,
            shape,
            min,
            middle,
            max,
        }
    }
}

/// Parse and validate a policy table from TOML text.
pub fn parse_policy(text: &str) -> Result<PolicyTable, EngineError> {
    let file: PolicyFile = toml::from_str(text).map_err(|e| EngineError::InvalidPolicy(e.to_string()))?;

    let mut labels = Labels::default();
    for (key, label) in file.labels.crisp {
        let var: CrispVar = key.parse().map_err(EngineError::InvalidPolicy)?;
        labels.crisp.insert(var, label);
    }
    for (key, label) in file.labels.fuzzy {
        let var: FuzzyVar = key.parse().map_err(EngineError::InvalidPolicy)?;
        labels.fuzzy.insert(var, label);
    }

    let memberships = file
        .membership
        .into_iter()
        .map(MembershipEntry::into_def)
        .collect::<Result<Vec<_>, _>>()?;

    let table = PolicyTable {
        version: file.version,
        memberships,
        rules: file.rule,
        labels,
    };
    table.validate()?;
    Ok(table)
}

/// Render a policy table as TOML (the same layout `parse_policy` reads).
pub fn policy_to_toml(table: &PolicyTable) -> Result<String, AppError> {
    let file = PolicyFile {
        version: table.version.clone(),
        membership: table.memberships.iter().map(MembershipEntry::from).collect(),
        rule: table.rules.clone(),
        labels: LabelsFile {
            crisp: table
                .labels
                .crisp
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect(),
            fuzzy: table
                .labels
                .fuzzy
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect(),
        },
    };
    toml::to_string_pretty(&file).map_err(|e| AppError::config(format!("Failed to render policy TOML: {e}")))
}

/// Read a policy file from disk.
pub fn load_policy(path: &Path) -> Result<PolicyTable, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Failed to read policy file '{}': {e}", path.display())))?;
    let table = parse_policy(&text)
        .map_err(|e| AppError::config(format!("Policy file '{}': {e}", path.display())))?;
    tracing::debug!(
        path = %path.display(),
        version = %table.version,
        memberships = table.memberships.len(),
        rules = table.rules.len(),
        "loaded policy table"
    );
    Ok(table)
}

/// Pick the policy for a run: explicit path, then `$FUZZY_ALLOC_POLICY` (a `.env`
/// file is honored), then the bundled reference table.
pub fn resolve_policy(explicit: Option<&Path>) -> Result<PolicyTable, AppError> {
    if let Some(path) = explicit {
        return load_policy(path);
    }

    dotenvy::dotenv().ok();
    match std::env::var(POLICY_ENV) {
        Ok(value) if !value.trim().is_empty() => load_policy(&PathBuf::from(value.trim())),
        _ => {
            tracing::debug!("no policy file configured; using the bundled reference table");
            Ok(PolicyTable::reference())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::Asset;

    const SHIPPED: &str = include_str!("../../policy/reference.toml");

    #[test]
    fn shipped_reference_file_matches_builtin_table() {
        let parsed = parse_policy(SHIPPED).unwrap();
        assert_eq!(parsed, PolicyTable::reference());
    }

    #[test]
    fn rendered_toml_parses_back() {
        let mut table = PolicyTable::reference();
        table.labels.fuzzy.insert(FuzzyVar::Stagflationary, "stagflation risk".to_string());
        let text = policy_to_toml(&table).unwrap();
        assert!(text.contains("[[rule]]"));
        assert_eq!(parse_policy(&text).unwrap(), table);
    }

    #[test]
    fn parses_minimal_file_with_integer_weights() {
        let text = r#"
            version = "tiny"

            [[membership]]
            var = "long_term"
            input = "time_horizon"
            shape = "line"
            min = 5
            max = 15

            [[rule]]
            kind = "simple"
            var = "long_term"
            asset = "equities"
            weight = 10

            [labels.crisp]
            time_horizon = "years until the money is needed"
        "#;
        let table = parse_policy(text).unwrap();
        assert_eq!(table.version, "tiny");
        assert_eq!(table.memberships[0].shape, Shape::Line { min: 5.0, max: 15.0 });
        assert_eq!(table.rules[0], Rule::simple(FuzzyVar::LongTerm, Asset::Equities, 10.0));
        assert_eq!(
            table.labels.crisp_label(CrispVar::TimeHorizon),
            "years until the money is needed"
        );
    }

    #[test]
    fn rejects_unknown_identifiers() {
        let text = r#"
            version = "typo"

            [[membership]]
            var = "hi_growth"
            input = "cape_ratio"
            shape = "line"
            min = 16.85
            max = 10.0
        "#;
        assert!(matches!(parse_policy(text), Err(EngineError::InvalidPolicy(_))));

        let text = r#"
            version = "typo"

            [labels.fuzzy]
            deflaton = "x"
        "#;
        let err = parse_policy(text).unwrap_err();
        assert!(err.to_string().contains("deflaton"), "{err}");
    }

    #[test]
    fn load_policy_reads_from_disk_and_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHIPPED.as_bytes()).unwrap();
        let table = load_policy(file.path()).unwrap();
        assert_eq!(table.version, "reference-1");

        let missing = load_policy(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(missing.exit_code(), crate::error::EXIT_CONFIG);
        assert!(missing.to_string().contains("here.toml"));
    }

    #[test]
    fn misspelled_sections_and_keys_are_rejected() {
        let err = parse_policy(&SHIPPED.replace("[[rule]]", "[[rules]]")).unwrap_err();
        assert!(err.to_string().contains("rules"), "{err}");

        let text = r#"
            version = "typo"

            [label.fuzzy]
            deflation = "x"
        "#;
        assert!(matches!(parse_policy(text), Err(EngineError::InvalidPolicy(_))));

        let text = r#"
            version = "typo"

            [labels.fuzy]
            deflation = "x"
        "#;
        assert!(matches!(parse_policy(text), Err(EngineError::InvalidPolicy(_))));
    }

    #[test]
    fn membership_and_rule_entries_reject_extra_keys() {
        let text = r#"
            version = "extra"

            [[membership]]
            var = "long_term"
            input = "time_horizon"
            shape = "line"
            min = 5
            max = 15
            scale = 2
        "#;
        let err = parse_policy(text).unwrap_err();
        assert!(err.to_string().contains("scale"), "{err}");

        let text = r#"
            version = "extra"

            [[membership]]
            var = "long_term"
            input = "time_horizon"
            shape = "line"
            min = 5
            max = 15

            [[rule]]
            kind = "simple"
            var = "long_term"
            asset = "equities"
            weight = 10
            note = "why"
        "#;
        assert!(matches!(parse_policy(text), Err(EngineError::InvalidPolicy(_))));
    }

    #[test]
    fn middle_must_match_the_shape_kind() {
        let text = r#"
            version = "shapes"

            [[membership]]
            var = "long_term"
            input = "time_horizon"
            shape = "line"
            min = 5
            middle = 10
            max = 15
        "#;
        assert!(matches!(
            parse_policy(text),
            Err(EngineError::InvalidShape { var: FuzzyVar::LongTerm, .. })
        ));

        let text = r#"
            version = "shapes"

            [[membership]]
            var = "low_inflation"
            input = "cpi"
            shape = "triangle"
            min = 0
            max = 7
        "#;
        let err = parse_policy(text).unwrap_err();
        assert!(err.to_string().contains("middle"), "{err}");
    }

    #[test]
    fn resolve_policy_reads_env_then_falls_back_to_reference() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHIPPED.replace("reference-1", "from-env").as_bytes())
            .unwrap();

        unsafe {
            std::env::set_var(POLICY_ENV, file.path());
        }
        assert_eq!(resolve_policy(None).unwrap().version, "from-env");

        // An explicit path wins over the environment.
        let explicit = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(explicit.path(), SHIPPED.replace("reference-1", "explicit")).unwrap();
        assert_eq!(resolve_policy(Some(explicit.path())).unwrap().version, "explicit");

        unsafe {
            std::env::set_var(POLICY_ENV, "   ");
        }
        assert_eq!(resolve_policy(None).unwrap(), PolicyTable::reference());

        unsafe {
            std::env::set_var(POLICY_ENV, "/definitely/not/here.toml");
        }
        let err = resolve_policy(None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);

        unsafe {
            std::env::remove_var(POLICY_ENV);
        }
        assert_eq!(resolve_policy(None).unwrap(), PolicyTable::reference());
    }
}
