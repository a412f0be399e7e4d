//! Reporting utilities: batch statistics and formatted terminal output.

pub mod format;

pub use format::*;

use std::collections::BTreeMap;

use crate::app::pipeline::ScenarioOutcome;
use crate::domain::FuzzyVar;
use crate::error::EngineError;

/// Distribution of outcomes over a batch or sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub scenarios: usize,
    pub allocated: usize,
    pub no_signal: usize,
    pub failed: usize,
    /// Equity-fraction statistics over the allocated scenarios.
    pub fraction: Option<FractionStats>,
    /// How often each variable was the top reason, most frequent first.
    pub top_reasons: Vec<(FuzzyVar, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub p05: f64,
    pub median: f64,
    pub p95: f64,
    pub max: f64,
}

/// Summarize a batch.
pub fn summarize_batch(outcomes: &[ScenarioOutcome]) -> BatchSummary {
    let mut fractions = Vec::new();
    let mut no_signal = 0;
    let mut failed = 0;
    let mut counts: BTreeMap<FuzzyVar, usize> = BTreeMap::new();

    for outcome in outcomes {
        match &outcome.result {
            Ok(run) => {
                fractions.push(run.allocation.equity_fraction);
                if let Some(first) = run.allocation.reasons.first() {
                    *counts.entry(first.reason).or_default() += 1;
                }
            }
            Err(EngineError::DegenerateAllocation) => no_signal += 1,
            Err(_) => failed += 1,
        }
    }

    let mut top_reasons: Vec<(FuzzyVar, usize)> = counts.into_iter().collect();
    top_reasons.sort_by(|a, b| b.1.cmp(&a.1));

    BatchSummary {
        scenarios: outcomes.len(),
        allocated: fractions.len(),
        no_signal,
        failed,
        fraction: fraction_stats(&mut fractions),
        top_reasons,
    }
}

fn fraction_stats(values: &mut [f64]) -> Option<FractionStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    // Population std dev; a single scenario has zero spread.
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(FractionStats {
        mean,
        std_dev: variance.sqrt(),
        min: values[0],
        p05: quantile(values, 0.05),
        median: quantile(values, 0.5),
        p95: quantile(values, 0.95),
        max: values[values.len() - 1],
    })
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
