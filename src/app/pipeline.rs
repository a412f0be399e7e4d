//! Shared allocation pipeline used by every `alloc` subcommand.
//!
//! crisp inputs -> fuzzify -> rules -> aggregate
//!
//! Each run owns its snapshots and contribution log; only the policy table is
//! shared, by reference, so batches can fan out across threads without locks.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::Scenario;
use crate::domain::{Allocation, RunConfig};
use crate::engine::{ContributionLog, allocate, apply_rules, fuzzify};
use crate::error::EngineError;
use crate::fuzzy::{CrispInputs, FuzzySnapshot};
use crate::policy::PolicyTable;

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    pub policy_version: String,
    pub inputs: CrispInputs,
    pub fuzzy: FuzzySnapshot,
    pub contributions: ContributionLog,
    pub allocation: Allocation,
}

/// Execute the full pipeline for one input snapshot.
pub fn run_allocation(
    inputs: &CrispInputs,
    policy: &PolicyTable,
    config: &RunConfig,
) -> Result<RunOutput, EngineError> {
    // 1) Primary memberships.
    let mut fuzzy = fuzzify(inputs, policy)?;

    // 2) Rules (adds compound variables to the snapshot).
    let contributions = apply_rules(&mut fuzzy, &policy.rules)?;

    // 3) Aggregate and rank.
    let allocation = allocate(&contributions, config.top_n)?;

    tracing::info!(
        policy = %policy.version,
        equity_fraction = allocation.equity_fraction,
        total_weight = allocation.total_weight,
        "allocation computed"
    );

    Ok(RunOutput {
        policy_version: policy.version.clone(),
        inputs: inputs.clone(),
        fuzzy,
        contributions,
        allocation,
    })
}

/// Result of one scenario in a batch.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<RunOutput, EngineError>,
}

/// Run independent scenarios in parallel; outcomes are returned in input order.
///
/// A failing scenario does not stop the others.
pub fn run_batch(scenarios: &[Scenario], policy: &PolicyTable, config: &RunConfig) -> Vec<ScenarioOutcome> {
    let outcomes: Vec<ScenarioOutcome> = scenarios
        .par_iter()
        .map(|scenario| ScenarioOutcome {
            name: scenario.name.clone(),
            result: run_allocation(&scenario.inputs, policy, config),
        })
        .collect();

    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            tracing::warn!(scenario = %outcome.name, error = %err, "scenario produced no allocation");
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, CrispVar, FuzzyVar};
    use crate::fuzzy::Shape;
    use crate::policy::{MembershipDef, Rule};

    const EPS: f64 = 1e-9;

    #[test]
    fn reference_run_regression_vector() {
        let out = run_allocation(&CrispInputs::reference(), &PolicyTable::reference(), &RunConfig::default()).unwrap();
        let a = &out.allocation;

        assert!((a.equity_weight - 15.5).abs() < EPS);
        assert!((a.bond_weight - 24.25).abs() < EPS);
        assert!((a.total_weight - 39.75).abs() < EPS);
        assert!((a.equity_fraction - 15.5 / 39.75).abs() < EPS);
        assert!((a.equity_fraction - 0.389937).abs() < 1e-6);

        let top: Vec<(FuzzyVar, Asset)> = a.reasons.iter().map(|r| (r.reason, r.asset)).collect();
        assert_eq!(
            top,
            vec![
                (FuzzyVar::LowGrowth, Asset::Bonds),
                (FuzzyVar::LongTerm, Asset::Equities),
                (FuzzyVar::LowRate, Asset::Bonds),
            ]
        );
        assert!((a.reasons[0].share - 10.0 / 39.75).abs() < EPS);
        assert!((a.reasons[1].share - 10.0 / 39.75).abs() < EPS);
        assert!((a.reasons[2].share - 8.75 / 39.75).abs() < EPS);

        // One contribution per rule, compound variables added to the snapshot.
        assert_eq!(out.contributions.len(), 15);
        assert_eq!(out.fuzzy.len(), 16);
        assert_eq!(out.fuzzy.get(FuzzyVar::FallingRate).unwrap(), 0.0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let policy = PolicyTable::reference();
        let config = RunConfig { top_n: 15 };
        let first = run_allocation(&CrispInputs::reference(), &policy, &config).unwrap();
        for _ in 0..5 {
            let again = run_allocation(&CrispInputs::reference(), &policy, &config).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn inflation_ramps_can_be_rewired_through_the_table() {
        // Feeding the inflation categories from the horizon instead of CPI
        // saturates high_inflation and changes the answer.
        let mut policy = PolicyTable::reference();
        for def in policy.memberships.iter_mut() {
            if matches!(def.var, FuzzyVar::Deflation | FuzzyVar::LowInflation | FuzzyVar::HighInflation) {
                def.input = CrispVar::TimeHorizon;
            }
        }
        policy.validate().unwrap();

        let out = run_allocation(&CrispInputs::reference(), &policy, &RunConfig::default()).unwrap();
        let a = &out.allocation;
        // equities: long_term 10 + high_inflation 30 + rising_rate 0.4375*50 + stagflationary 20
        assert!((a.equity_weight - 81.875).abs() < EPS);
        // bonds: low_growth 10 + low_rate 8.75
        assert!((a.bond_weight - 18.75).abs() < EPS);
        assert_eq!(a.reasons[0].reason, FuzzyVar::HighInflation);
        assert_eq!(a.reasons[1].reason, FuzzyVar::RisingRate);
        assert_eq!(a.reasons[2].reason, FuzzyVar::Stagflationary);
    }

    #[test]
    fn empty_rule_table_is_degenerate() {
        let mut policy = PolicyTable::reference();
        policy.rules.clear();
        let err = run_allocation(&CrispInputs::reference(), &policy, &RunConfig::default()).unwrap_err();
        assert_eq!(err, EngineError::DegenerateAllocation);
    }

    #[test]
    fn all_zero_memberships_are_degenerate() {
        let policy = PolicyTable {
            version: "zero".to_string(),
            memberships: vec![MembershipDef {
                var: FuzzyVar::Deflation,
                input: CrispVar::Cpi,
                shape: Shape::Line { min: 0.0, max: -3.0 },
            }],
            rules: vec![Rule::simple(FuzzyVar::Deflation, Asset::Bonds, 50.0)],
            labels: Default::default(),
        };
        let err = run_allocation(&CrispInputs::reference(), &policy, &RunConfig::default()).unwrap_err();
        assert_eq!(err, EngineError::DegenerateAllocation);
    }

    #[test]
    fn batch_matches_sequential_runs_in_order() {
        let policy = PolicyTable::reference();
        let config = RunConfig::default();
        let mut scenarios = Vec::new();
        for (i, cpi) in [-2.0, 0.5, 3.0, 4.8, 9.0, 20.0].into_iter().enumerate() {
            let mut inputs = CrispInputs::reference();
            inputs.set(CrispVar::Cpi, cpi);
            scenarios.push(Scenario {
                name: format!("cpi-{i}"),
                inputs,
            });
        }
        scenarios.push(Scenario {
            name: "missing".to_string(),
            inputs: CrispInputs::new(),
        });

        let outcomes = run_batch(&scenarios, &policy, &config);
        assert_eq!(outcomes.len(), scenarios.len());
        for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
            assert_eq!(outcome.name, scenario.name);
            let expected = run_allocation(&scenario.inputs, &policy, &config);
            assert_eq!(outcome.result, expected);
        }
        assert_eq!(
            outcomes.last().unwrap().result.as_ref().unwrap_err(),
            &EngineError::MissingCrisp(CrispVar::CapeRatio)
        );
    }
}
