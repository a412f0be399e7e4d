//! Rule evaluation.
//!
//! Rules fire strictly in table order. A simple rule reads one degree; an AND
//! rule first stores `min(left, right)` under its output name and then fires
//! as a simple rule on that name, so later rules can cite it too.

use serde::Serialize;

use crate::domain::{Asset, Contribution, FuzzyVar};
use crate::error::EngineError;
use crate::fuzzy::FuzzySnapshot;
use crate::policy::Rule;

/// Append-only record of rule firings, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContributionLog {
    entries: Vec<Contribution>,
}

impl ContributionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, contribution: Contribution) {
        self.entries.push(contribution);
    }

    pub fn as_slice(&self) -> &[Contribution] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of contribution weights for one asset.
    pub fn weight_for(&self, asset: Asset) -> f64 {
        self.entries.iter().filter(|c| c.asset == asset).map(|c| c.weight).sum()
    }
}

impl FromIterator<Contribution> for ContributionLog {
    fn from_iter<I: IntoIterator<Item = Contribution>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// `degree(var) * weight` toward `asset`.
pub fn weigh(
    snapshot: &FuzzySnapshot,
    log: &mut ContributionLog,
    var: FuzzyVar,
    asset: Asset,
    weight: f64,
) -> Result<(), EngineError> {
    let degree = snapshot.get(var)?;
    log.push(Contribution {
        asset,
        weight: degree * weight,
        reason: var,
    });
    Ok(())
}

/// Store `min(left, right)` as `output`, then weigh `output`.
pub fn weigh_and(
    snapshot: &mut FuzzySnapshot,
    log: &mut ContributionLog,
    (left, right): (FuzzyVar, FuzzyVar),
    output: FuzzyVar,
    asset: Asset,
    weight: f64,
) -> Result<(), EngineError> {
    let combined = snapshot.and(left, right)?;
    snapshot.derive(output, combined);
    weigh(snapshot, log, output, asset, weight)
}

/// Fire every rule against `snapshot`.
///
/// Compound outputs are added to `snapshot`; primary degrees are only read.
pub fn apply_rules(snapshot: &mut FuzzySnapshot, rules: &[Rule]) -> Result<ContributionLog, EngineError> {
    let mut log = ContributionLog::new();
    for rule in rules {
        match *rule {
            Rule::Simple { var, asset, weight } => weigh(snapshot, &mut log, var, asset, weight)?,
            Rule::And {
                left,
                right,
                output,
                asset,
                weight,
            } => weigh_and(snapshot, &mut log, (left, right), output, asset, weight)?,
        }
    }
    tracing::debug!(
        rules = rules.len(),
        equities = log.weight_for(Asset::Equities),
        bonds = log.weight_for(Asset::Bonds),
        "rules applied"
    );
    Ok(log)
}
