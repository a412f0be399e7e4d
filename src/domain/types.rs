//! Shared domain types.
//!
//! Variable identifiers are closed enums so a typo in a rule or membership
//! definition is rejected when the policy file is parsed rather than surfacing
//! as a missing key halfway through a run. The rule table itself stays data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_TOP_N;

/// The two asset classes the allocator splits between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Equities,
    Bonds,
}

impl Asset {
    pub fn display_name(self) -> &'static str {
        match self {
            Asset::Equities => "equities",
            Asset::Bonds => "bonds",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Raw macro readings supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrispVar {
    /// Cyclically adjusted price/earnings ratio.
    CapeRatio,
    /// Policy rate, in percent.
    FedFundsRate,
    /// Investing horizon, in years.
    TimeHorizon,
    /// Annual flow into (+) or out of (-) the portfolio, in percent.
    Cashflow,
    /// Inflation index reading, in percent.
    Cpi,
}

impl CrispVar {
    pub const ALL: [CrispVar; 5] = [
        CrispVar::CapeRatio,
        CrispVar::FedFundsRate,
        CrispVar::TimeHorizon,
        CrispVar::Cashflow,
        CrispVar::Cpi,
    ];

    /// Identifier used in policy and input files.
    pub fn as_str(self) -> &'static str {
        match self {
            CrispVar::CapeRatio => "cape_ratio",
            CrispVar::FedFundsRate => "fed_funds_rate",
            CrispVar::TimeHorizon => "time_horizon",
            CrispVar::Cashflow => "cashflow",
            CrispVar::Cpi => "cpi",
        }
    }

    /// Default human-readable label (overridable by the policy label table).
    pub fn description(self) -> &'static str {
        match self {
            CrispVar::CapeRatio => "Cyclically Adjusted Price to Earnings (CAPE) ratio",
            CrispVar::FedFundsRate => "US Federal Reserve funds rate",
            CrispVar::TimeHorizon => "investing time horizon",
            CrispVar::Cashflow => "annual cashflow into or out of the portfolio (percent)",
            CrispVar::Cpi => "consumer price index as a measure of inflation",
        }
    }
}

impl fmt::Display for CrispVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrispVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrispVar::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| format!("unknown crisp variable '{s}'"))
    }
}

/// Fuzzy categories, both primary (derived from one crisp input) and compound
/// (derived from two fuzzy variables by an AND rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyVar {
    HighGrowth,
    LowGrowth,
    LowRate,
    HighRate,
    ShortTerm,
    LongTerm,
    Accumulation,
    Drawdown,
    Deflation,
    LowInflation,
    HighInflation,

    Contractionary,
    Expansionary,
    RisingRate,
    FallingRate,
    Stagflationary,
}

impl FuzzyVar {
    pub const ALL: [FuzzyVar; 16] = [
        FuzzyVar::HighGrowth,
        FuzzyVar::LowGrowth,
        FuzzyVar::LowRate,
        FuzzyVar::HighRate,
        FuzzyVar::ShortTerm,
        FuzzyVar::LongTerm,
        FuzzyVar::Accumulation,
        FuzzyVar::Drawdown,
        FuzzyVar::Deflation,
        FuzzyVar::LowInflation,
        FuzzyVar::HighInflation,
        FuzzyVar::Contractionary,
        FuzzyVar::Expansionary,
        FuzzyVar::RisingRate,
        FuzzyVar::FallingRate,
        FuzzyVar::Stagflationary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FuzzyVar::HighGrowth => "high_growth",
            FuzzyVar::LowGrowth => "low_growth",
            FuzzyVar::LowRate => "low_rate",
            FuzzyVar::HighRate => "high_rate",
            FuzzyVar::ShortTerm => "short_term",
            FuzzyVar::LongTerm => "long_term",
            FuzzyVar::Accumulation => "accumulation",
            FuzzyVar::Drawdown => "drawdown",
            FuzzyVar::Deflation => "deflation",
            FuzzyVar::LowInflation => "low_inflation",
            FuzzyVar::HighInflation => "high_inflation",
            FuzzyVar::Contractionary => "contractionary",
            FuzzyVar::Expansionary => "expansionary",
            FuzzyVar::RisingRate => "rising_rate",
            FuzzyVar::FallingRate => "falling_rate",
            FuzzyVar::Stagflationary => "stagflationary",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FuzzyVar::HighGrowth => "low valuation for stocks",
            FuzzyVar::LowGrowth => "high valuation for stocks",
            FuzzyVar::LowRate => "low interest rate environment",
            FuzzyVar::HighRate => "high interest rate environment",
            FuzzyVar::ShortTerm => "short investment period",
            FuzzyVar::LongTerm => "long investment period",
            FuzzyVar::Accumulation => "accumulation period",
            FuzzyVar::Drawdown => "drawdown period",
            FuzzyVar::Deflation => "a deflationary environment",
            FuzzyVar::LowInflation => "an optimal inflationary environment",
            FuzzyVar::HighInflation => "a highly inflationary environment",
            FuzzyVar::Contractionary => "risk of low growth and high rates",
            FuzzyVar::Expansionary => "accommodative policy and expected high growth",
            FuzzyVar::RisingRate => "rates expected to rise due to high inflation",
            FuzzyVar::FallingRate => "rates expected to fall due to low inflation",
            FuzzyVar::Stagflationary => "risk of low growth and high inflation",
        }
    }
}

impl fmt::Display for FuzzyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuzzyVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuzzyVar::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| format!("unknown fuzzy variable '{s}'"))
    }
}

/// One rule firing: a weighted vote for an asset and the variable behind it.
///
/// Recorded even when `weight == 0` so the log mirrors the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub asset: Asset,
    pub weight: f64,
    pub reason: FuzzyVar,
}

/// A ranked explanation entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    /// `weight / total`.
    pub share: f64,
    pub asset: Asset,
    pub reason: FuzzyVar,
    pub weight: f64,
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub total_weight: f64,
    pub equity_weight: f64,
    pub bond_weight: f64,
    /// Recommended equity share in `[0, 1]`.
    pub equity_fraction: f64,
    pub reasons: Vec<Reason>,
}

impl Allocation {
    pub fn bond_fraction(&self) -> f64 {
        1.0 - self.equity_fraction
    }

    pub fn weight_for(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Equities => self.equity_weight,
            Asset::Bonds => self.bond_weight,
        }
    }
}

/// A run's configuration as understood by the pipeline.
///
/// Derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// How many ranked reasons to report.
    pub top_n: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { top_n: DEFAULT_TOP_N }
    }
}
