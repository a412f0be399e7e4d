//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the policy table and crisp inputs
//! - runs the allocation pipeline (single run, batch, or sweep)
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{BatchArgs, Command, InputArgs, OutputArgs, PolicyArgs, RunArgs, SweepArgs};
use crate::data::{SweepConfig, generate_sweep};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::fuzzy::CrispInputs;
use crate::policy::{Labels, PolicyTable, policy_to_toml, resolve_policy};

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `alloc` binary.
pub fn run() -> Result<(), AppError> {
    // `alloc` and `alloc --cpi 3` behave like `alloc run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Batch(args) => handle_batch(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Policy(args) => handle_policy(args),
    }
}

fn load_policy(args: &PolicyArgs) -> Result<PolicyTable, AppError> {
    resolve_policy(args.policy.as_deref())
}

/// Base readings (file or reference snapshot) with flag overrides applied.
pub fn resolve_inputs(args: &InputArgs) -> Result<CrispInputs, AppError> {
    let base = match &args.inputs {
        Some(path) => crate::io::load_inputs(path)?,
        None => CrispInputs::reference(),
    };
    Ok(base.merged(&args.overrides()))
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let policy = load_policy(&args.policy)?;
    let inputs = resolve_inputs(&args.inputs)?;
    let config = RunConfig { top_n: args.output.top };

    let run = pipeline::run_allocation(&inputs, &policy, &config)?;

    let (stdout, export) = render_run(&run, &policy.labels, &args.output, args.verbose)?;
    println!("{stdout}");
    if let (Some(path), Some(json)) = (&args.output.export, &export) {
        crate::io::write_json(path, json)?;
    }
    Ok(())
}

/// Text for stdout plus the JSON to export, if any.
///
/// The JSON is rendered once so stdout and the export carry the same `generated_at`.
fn render_run(
    run: &RunOutput,
    labels: &Labels,
    output: &OutputArgs,
    verbose: bool,
) -> Result<(String, Option<String>), AppError> {
    let json = if output.json || output.export.is_some() {
        Some(crate::io::run_to_json(run)?)
    } else {
        None
    };
    let stdout = match &json {
        Some(json) if output.json => json.clone(),
        _ => crate::report::format_run_summary(run, labels, verbose),
    };
    Ok((stdout, json))
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let policy = load_policy(&args.policy)?;
    let scenarios = crate::io::load_scenarios(&args.scenarios)?;
    let config = RunConfig { top_n: args.output.top };

    let outcomes = pipeline::run_batch(&scenarios, &policy, &config);

    if args.output.json || args.output.export.is_some() {
        let json = crate::io::batch_to_json(&outcomes, &policy.version)?;
        if args.output.json {
            println!("{json}");
        }
        if let Some(path) = &args.output.export {
            crate::io::write_json(path, &json)?;
        }
    }
    if !args.output.json {
        println!("{}", crate::report::format_batch_table(&outcomes));
        println!(
            "{}",
            crate::report::format_batch_summary(&crate::report::summarize_batch(&outcomes))
        );
    }
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let policy = load_policy(&args.policy)?;
    let base = resolve_inputs(&args.inputs)?;
    let sweep = SweepConfig {
        samples: args.samples,
        seed: args.seed,
        scale: args.scale,
    };

    let scenarios = generate_sweep(&base, &sweep)?;
    let outcomes = pipeline::run_batch(&scenarios, &policy, &RunConfig::default());

    // The unperturbed base run anchors the summary.
    match pipeline::run_allocation(&base, &policy, &RunConfig::default()) {
        Ok(run) => println!(
            "Base: {:.1}% equities / {:.1}% bonds",
            run.allocation.equity_fraction * 100.0,
            run.allocation.bond_fraction() * 100.0
        ),
        Err(err) => println!("Base: {err}"),
    }
    println!(
        "Sweep: n={} seed={} scale={:.2}",
        sweep.samples, sweep.seed, sweep.scale
    );
    println!(
        "{}",
        crate::report::format_batch_summary(&crate::report::summarize_batch(&outcomes))
    );

    if let Some(path) = &args.export {
        let json = crate::io::batch_to_json(&outcomes, &policy.version)?;
        crate::io::write_json(path, &json)?;
    }
    Ok(())
}

fn handle_policy(args: PolicyArgs) -> Result<(), AppError> {
    let policy = load_policy(&args)?;
    print!("{}", policy_to_toml(&policy)?);
    Ok(())
}

/// Rewrite argv so `alloc` defaults to `alloc run`.
///
/// Rules:
/// - `alloc`                      -> `alloc run`
/// - `alloc --cpi 3 ...`          -> `alloc run --cpi 3 ...`
/// - `alloc --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "batch" | "sweep" | "policy");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
