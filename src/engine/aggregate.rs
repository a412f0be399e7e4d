//! Aggregation: contributions -> allocation fraction and ranked reasons.

use std::cmp::Ordering;

use crate::domain::{Allocation, Asset, Reason};
use crate::engine::rules::ContributionLog;
use crate::error::EngineError;

/// Number of reasons reported by default.
pub const DEFAULT_TOP_N: usize = 3;

/// Sum weights per asset and compute the equity fraction.
///
/// A zero total (empty table, or every degree exactly zero) is reported as
/// `DegenerateAllocation` rather than as a 0% or 100% split.
pub fn allocate(log: &ContributionLog, top_n: usize) -> Result<Allocation, EngineError> {
    let equity_weight = log.weight_for(Asset::Equities);
    let bond_weight = log.weight_for(Asset::Bonds);
    let total_weight = equity_weight + bond_weight;

    if !(total_weight.is_finite() && total_weight > 0.0) {
        return Err(EngineError::DegenerateAllocation);
    }

    let reasons = factorize(log, total_weight, top_n);
    Ok(Allocation {
        total_weight,
        equity_weight,
        bond_weight,
        equity_fraction: equity_weight / total_weight,
        reasons,
    })
}

/// Top `top_n` contributions by weight with their share of `total_weight`.
///
/// The sort is stable, so equal weights keep rule order. Fewer than `top_n`
/// entries are returned when the log is shorter.
pub fn factorize(log: &ContributionLog, total_weight: f64, top_n: usize) -> Vec<Reason> {
    let mut sorted = log.as_slice().to_vec();
    sorted.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    sorted
        .into_iter()
        .take(top_n)
        .map(|c| Reason {
            share: c.weight / total_weight,
            asset: c.asset,
            reason: c.reason,
            weight: c.weight,
        })
        .collect()
}
