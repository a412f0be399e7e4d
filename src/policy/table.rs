//! Policy tables: which memberships to derive, which rules to fire, and how to
//! label variables in reports.
//!
//! A table is plain data. The engine never hardcodes weights or shapes; it is
//! handed a validated `PolicyTable` and walks it in order.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Asset, CrispVar, FuzzyVar};
use crate::error::EngineError;
use crate::fuzzy::Shape;

/// Version tag of the bundled table.
pub const REFERENCE_VERSION: &str = "reference-1";

/// Long-run mean CAPE ratio; the neutral point of both growth ramps.
pub const MEAN_CAPE_RATIO: f64 = 16.85;

/// Derive `var` from the crisp reading `input` through `shape`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembershipDef {
    pub var: FuzzyVar,
    pub input: CrispVar,
    pub shape: Shape,
}

/// One entry of the ordered rule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum Rule {
    /// `degree(var) * weight` toward `asset`.
    Simple { var: FuzzyVar, asset: Asset, weight: f64 },
    /// `output = min(left, right)`, then a simple rule on `output`.
    And {
        left: FuzzyVar,
        right: FuzzyVar,
        output: FuzzyVar,
        asset: Asset,
        weight: f64,
    },
}

impl Rule {
    pub fn simple(var: FuzzyVar, asset: Asset, weight: f64) -> Self {
        Rule::Simple { var, asset, weight }
    }

    pub fn and(left: FuzzyVar, right: FuzzyVar, output: FuzzyVar, asset: Asset, weight: f64) -> Self {
        Rule::And {
            left,
            right,
            output,
            asset,
            weight,
        }
    }

    pub fn weight(&self) -> f64 {
        match *self {
            Rule::Simple { weight, .. } | Rule::And { weight, .. } => weight,
        }
    }

    /// The variable cited as the reason for this rule's contribution.
    pub fn reason(&self) -> FuzzyVar {
        match *self {
            Rule::Simple { var, .. } => var,
            Rule::And { output, .. } => output,
        }
    }
}

/// Human-readable descriptions keyed by identifier.
///
/// Entries override the built-in `description()` of each variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    pub crisp: BTreeMap<CrispVar, String>,
    pub fuzzy: BTreeMap<FuzzyVar, String>,
}

impl Labels {
    pub fn crisp_label(&self, var: CrispVar) -> &str {
        self.crisp.get(&var).map(String::as_str).unwrap_or(var.description())
    }

    pub fn fuzzy_label(&self, var: FuzzyVar) -> &str {
        self.fuzzy.get(&var).map(String::as_str).unwrap_or(var.description())
    }
}

/// A complete, versioned calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    pub version: String,
    pub memberships: Vec<MembershipDef>,
    pub rules: Vec<Rule>,
    pub labels: Labels,
}

impl PolicyTable {
    /// The bundled calibration (`reference-1`).
    pub fn reference() -> Self {
        use Asset::{Bonds, Equities};
        use CrispVar as C;
        use FuzzyVar as F;

        let line = |min, max| Shape::Line { min, max };
        let m = |var, input, shape| MembershipDef { var, input, shape };

        let memberships = vec![
            m(F::HighGrowth, C::CapeRatio, line(MEAN_CAPE_RATIO, 10.0)),
            m(F::LowGrowth, C::CapeRatio, line(MEAN_CAPE_RATIO, 30.0)),
            m(F::LowRate, C::FedFundsRate, line(2.0, -2.0)),
            m(F::HighRate, C::FedFundsRate, line(2.0, 10.0)),
            m(F::ShortTerm, C::TimeHorizon, line(5.0, 1.0)),
            m(F::LongTerm, C::TimeHorizon, line(5.0, 15.0)),
            m(F::Accumulation, C::Cashflow, line(0.0, 20.0)),
            m(
                F::Drawdown,
                C::Cashflow,
                Shape::Triangle {
                    min: -10.0,
                    middle: -3.0,
                    max: 0.0,
                },
            ),
            m(F::Deflation, C::Cpi, line(0.0, -3.0)),
            m(
                F::LowInflation,
                C::Cpi,
                Shape::Triangle {
                    min: 0.0,
                    middle: 3.0,
                    max: 7.0,
                },
            ),
            m(F::HighInflation, C::Cpi, line(5.0, 15.0)),
        ];

        let rules = vec![
            Rule::simple(F::HighGrowth, Equities, 10.0),
            Rule::simple(F::LowGrowth, Bonds, 10.0),
            Rule::simple(F::LowRate, Bonds, 20.0),
            Rule::simple(F::HighRate, Bonds, 20.0),
            // Bonds damp volatility over short horizons; equities win over long ones.
            Rule::simple(F::ShortTerm, Bonds, 10.0),
            Rule::simple(F::LongTerm, Equities, 10.0),
            Rule::simple(F::Deflation, Bonds, 50.0),
            Rule::simple(F::LowInflation, Equities, 10.0),
            Rule::simple(F::LowInflation, Bonds, 10.0),
            Rule::simple(F::HighInflation, Equities, 30.0),
            Rule::and(F::LowGrowth, F::HighRate, F::Contractionary, Bonds, 50.0),
            Rule::and(F::HighGrowth, F::LowRate, F::Expansionary, Equities, 100.0),
            Rule::and(F::HighInflation, F::LowRate, F::RisingRate, Equities, 50.0),
            Rule::and(F::LowInflation, F::HighRate, F::FallingRate, Bonds, 50.0),
            Rule::and(F::LowGrowth, F::HighInflation, F::Stagflationary, Equities, 20.0),
        ];

        Self {
            version: REFERENCE_VERSION.to_string(),
            memberships,
            rules,
            labels: Labels::default(),
        }
    }

    /// Check the table before any run uses it.
    ///
    /// Rejects:
    /// - empty version tags
    /// - malformed shapes (see `Shape::validate`)
    /// - two memberships for the same variable
    /// - negative or non-finite rule weights
    /// - rules reading a variable not derived by a membership or an earlier AND rule
    /// - AND rules writing over a primary (membership-derived) variable
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.version.trim().is_empty() {
            return Err(EngineError::InvalidPolicy("version tag is empty".to_string()));
        }

        let mut primary = HashSet::new();
        for def in &self.memberships {
            def.shape.validate(def.var)?;
            if !primary.insert(def.var) {
                return Err(EngineError::InvalidPolicy(format!(
                    "membership for '{}' is defined more than once",
                    def.var
                )));
            }
        }

        let mut available = primary.clone();
        for (idx, rule) in self.rules.iter().enumerate() {
            let weight = rule.weight();
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(EngineError::InvalidPolicy(format!(
                    "rule #{} has invalid weight {weight} (must be finite and >= 0)",
                    idx + 1
                )));
            }

            match *rule {
                Rule::Simple { var, .. } => require(&available, var, idx)?,
                Rule::And { left, right, output, .. } => {
                    require(&available, left, idx)?;
                    require(&available, right, idx)?;
                    if primary.contains(&output) {
                        return Err(EngineError::InvalidPolicy(format!(
                            "rule #{} would overwrite primary variable '{output}'",
                            idx + 1
                        )));
                    }
                    available.insert(output);
                }
            }
        }

        Ok(())
    }

    /// Crisp inputs read by at least one membership.
    pub fn required_inputs(&self) -> Vec<CrispVar> {
        CrispVar::ALL
            .into_iter()
            .filter(|c| self.memberships.iter().any(|m| m.input == *c))
            .collect()
    }
}

fn require(available: &HashSet<FuzzyVar>, var: FuzzyVar, idx: usize) -> Result<(), EngineError> {
    if available.contains(&var) {
        Ok(())
    } else {
        Err(EngineError::InvalidPolicy(format!(
            "rule #{} reads '{var}' before it is derived",
            idx + 1
        )))
    }
}
