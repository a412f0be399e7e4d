//! Formatted terminal output.
//!
//! All formatting lives here so the engine stays free of presentation code.

use crate::app::pipeline::{RunOutput, ScenarioOutcome};
use crate::domain::FuzzyVar;
use crate::policy::Labels;
use crate::report::BatchSummary;

/// Format a single run: inputs, degrees, split and ranked reasons.
///
/// With `verbose`, every contribution is listed as well.
pub fn format_run_summary(run: &RunOutput, labels: &Labels, verbose: bool) -> String {
    let mut out = String::new();
    let a = &run.allocation;

    out.push_str("=== alloc - fuzzy two-asset allocation ===\n");
    out.push_str(&format!("Policy: {}\n", run.policy_version));

    out.push_str("\nCrisp inputs:\n");
    for (var, value) in run.inputs.iter() {
        out.push_str(&format!("  {:<16} {:>10.4}  {}\n", var.as_str(), value, labels.crisp_label(var)));
    }

    out.push_str("\nFuzzy degrees:\n");
    for (var, degree) in run.fuzzy.iter() {
        out.push_str(&format!(
            "  {:<16} {:>6.3} {:<10} {}\n",
            var.as_str(),
            degree,
            bar(degree, 10),
            labels.fuzzy_label(var)
        ));
    }

    if verbose {
        out.push_str("\nContributions (rule order):\n");
        for (i, c) in run.contributions.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {:<16} -> {:<8} {:>9.4}\n",
                i + 1,
                c.reason.as_str(),
                c.asset.display_name(),
                c.weight
            ));
        }
    }

    out.push_str(&format!(
        "\nWeights: equities={:.4} bonds={:.4} total={:.4}\n",
        a.equity_weight, a.bond_weight, a.total_weight
    ));
    out.push_str(&format!(
        "Recommended split: {:.1}% equities / {:.1}% bonds\n",
        a.equity_fraction * 100.0,
        a.bond_fraction() * 100.0
    ));

    out.push_str("\nTop reasons:\n");
    for r in &a.reasons {
        out.push_str(&format!(
            "  {:.2} indicating {} due to {}.\n",
            r.share,
            r.asset.display_name(),
            labels.fuzzy_label(r.reason)
        ));
    }

    out
}

/// One line per scenario.
pub fn format_batch_table(outcomes: &[ScenarioOutcome]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24} {:>9} {:>9} {:<16}\n", "scenario", "equities", "bonds", "top reason"));
    out.push_str(&format!("{:-<24} {:-<9} {:-<9} {:-<16}\n", "", "", "", ""));

    for outcome in outcomes {
        match &outcome.result {
            Ok(run) => {
                let a = &run.allocation;
                let top = a.reasons.first().map(|r| r.reason.as_str()).unwrap_or("-");
                out.push_str(&format!(
                    "{:<24} {:>8.1}% {:>8.1}% {:<16}\n",
                    truncate(&outcome.name, 24),
                    a.equity_fraction * 100.0,
                    a.bond_fraction() * 100.0,
                    top
                ));
            }
            Err(err) => {
                out.push_str(&format!("{:<24} {:>9} {:>9} {err}\n", truncate(&outcome.name, 24), "-", "-"));
            }
        }
    }
    out
}

/// Distribution summary for a batch or sweep.
pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Scenarios: {} | allocated={} no_signal={} failed={}\n",
        summary.scenarios, summary.allocated, summary.no_signal, summary.failed
    ));

    match &summary.fraction {
        Some(s) => {
            out.push_str(&format!(
                "Equity fraction: mean={:.4} sd={:.4} min={:.4} p05={:.4} median={:.4} p95={:.4} max={:.4}\n",
                s.mean, s.std_dev, s.min, s.p05, s.median, s.p95, s.max
            ));
        }
        None => out.push_str("Equity fraction: n/a (no scenario produced an allocation)\n"),
    }

    if !summary.top_reasons.is_empty() {
        out.push_str("Leading reason frequency:\n");
        for (var, count) in &summary.top_reasons {
            out.push_str(&format!("  {:<16} {:>6}\n", FuzzyVar::as_str(*var), count));
        }
    }
    out
}

fn bar(degree: f64, width: usize) -> String {
    let filled = (degree.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
