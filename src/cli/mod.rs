//! Command-line parsing for the fuzzy allocator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::CrispVar;
use crate::engine::DEFAULT_TOP_N;
use crate::fuzzy::CrispInputs;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "alloc", version, about = "Fuzzy-inference equity/bond allocation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the split for one set of macro readings.
    Run(RunArgs),
    /// Evaluate every scenario in a TOML scenario file.
    Batch(BatchArgs),
    /// Perturb the readings randomly and summarize how the split moves.
    Sweep(SweepArgs),
    /// Print the active policy table as TOML.
    Policy(PolicyArgs),
}

/// Crisp reading flags shared by `run` and `sweep`.
///
/// Without `--inputs` the bundled reference readings are the base; any flag
/// given overrides the base value.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// TOML file with an `[inputs]` table.
    #[arg(long, value_name = "TOML")]
    pub inputs: Option<PathBuf>,

    /// CAPE ratio.
    #[arg(long, allow_negative_numbers = true)]
    pub cape: Option<f64>,

    /// Fed funds rate, percent.
    #[arg(long = "fed-funds", allow_negative_numbers = true)]
    pub fed_funds: Option<f64>,

    /// Investing horizon, years.
    #[arg(long, allow_negative_numbers = true)]
    pub horizon: Option<f64>,

    /// Annual portfolio cashflow, percent (negative for withdrawals).
    #[arg(long, allow_negative_numbers = true)]
    pub cashflow: Option<f64>,

    /// Inflation (CPI), percent.
    #[arg(long, allow_negative_numbers = true)]
    pub cpi: Option<f64>,
}

impl InputArgs {
    /// Flag values as a partial input set.
    pub fn overrides(&self) -> CrispInputs {
        let pairs = [
            (CrispVar::CapeRatio, self.cape),
            (CrispVar::FedFundsRate, self.fed_funds),
            (CrispVar::TimeHorizon, self.horizon),
            (CrispVar::Cashflow, self.cashflow),
            (CrispVar::Cpi, self.cpi),
        ];
        CrispInputs::from_pairs(pairs.into_iter().filter_map(|(var, v)| v.map(|v| (var, v))))
    }
}

/// Policy selection shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct PolicyArgs {
    /// Policy TOML (membership shapes, rules, labels). Defaults to
    /// `$FUZZY_ALLOC_POLICY`, then the bundled reference table.
    #[arg(long, value_name = "TOML")]
    pub policy: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Number of ranked reasons to report.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Print JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Also write JSON results to this path.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// List every rule contribution, not just the top reasons.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Scenario TOML with `[[scenario]]` entries.
    #[arg(long, value_name = "TOML")]
    pub scenarios: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Number of perturbed scenarios.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub samples: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Multiplier on the per-input noise levels.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Write per-scenario JSON results to this path.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
