use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use spendopt_core::model::AllocationProblem;
use spendopt_core::solver::{self, ConvergenceTracker, SolverOptions};
use spendopt_core::sweep;

mod config;
mod logging;
mod report;
mod synth;
mod util;

use config::AppConfig;
use logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "spendopt")]
#[command(about = "Marketing budget allocation optimizer")]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate synthetic channel benchmarks
    Synth {
        /// Output CSV path
        #[arg(long, default_value = "data/channel_benchmarks.csv")]
        out: PathBuf,
    },
    /// Optimize the budget allocation for a benchmarks file
    Optimize {
        /// Channel benchmarks CSV (from `synth`)
        #[arg(long, default_value = "data/channel_benchmarks.csv")]
        benchmarks: PathBuf,

        /// Record per-iteration convergence history, overriding the config
        #[arg(long)]
        track: bool,
    },
    /// Solve across a range of budget levels
    Sweep {
        /// Channel benchmarks CSV (from `synth`)
        #[arg(long, default_value = "data/channel_benchmarks.csv")]
        benchmarks: PathBuf,

        /// Lowest budget level (default: sum of channel minimums)
        #[arg(long)]
        min_budget: Option<f64>,

        /// Highest budget level (default: the configured budget)
        #[arg(long)]
        max_budget: Option<f64>,

        /// Number of budget levels
        #[arg(long, default_value_t = 20)]
        steps: usize,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = AppConfig::load(&args.config)?;

    match args.command {
        Command::Synth { out } => cmd_synth(&config, &out),
        Command::Optimize { benchmarks, track } => cmd_optimize(&config, &benchmarks, track),
        Command::Sweep {
            benchmarks,
            min_budget,
            max_budget,
            steps,
        } => cmd_sweep(&config, &benchmarks, min_budget, max_budget, steps),
    }
}

fn cmd_synth(config: &AppConfig, out: &PathBuf) -> Result<()> {
    tracing::info!("generating synthetic channel benchmarks");
    let benchmarks = synth::generate_channel_benchmarks(config);

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    report::write_benchmarks_csv(&benchmarks, out)?;

    tracing::info!(
        "generated {} channel benchmarks -> {}",
        benchmarks.len(),
        out.display()
    );
    for bench in &benchmarks {
        let roi_at_max = bench.curve_a - 2.0 * bench.curve_b * bench.max_spend;
        tracing::info!(
            "  {}: max_spend=${:.0}, roi@max={:.4}",
            bench.channel,
            bench.max_spend,
            roi_at_max
        );
    }

    Ok(())
}

fn cmd_optimize(config: &AppConfig, benchmarks_path: &PathBuf, track: bool) -> Result<()> {
    let benchmarks = report::read_benchmarks_csv(benchmarks_path)?;
    let channels = report::benchmarks_to_curves(&benchmarks);
    let budget = config.budget.total;

    tracing::info!(
        "optimizing ${budget:.0} across {} channels",
        channels.len()
    );

    let problem = AllocationProblem::new(channels, budget)?;
    let options = SolverOptions {
        ftol: config.optimization.tolerance,
        max_iterations: config.optimization.max_iterations,
    };

    let track = track || config.optimization.track_history;
    let mut tracker = track.then(|| ConvergenceTracker::new(&problem));
    let allocation = solver::solve_with_options(&problem, &options, tracker.as_mut())?;

    let results_dir = &config.output.results_dir;
    fs::create_dir_all(results_dir)
        .wrap_err_with(|| format!("failed to create {}", results_dir.display()))?;

    let allocation_path = results_dir.join("allocation.csv");
    report::write_allocation_csv(problem.channels(), &allocation, &allocation_path)?;
    tracing::info!("allocation report -> {}", allocation_path.display());

    if let Some(tracker) = tracker {
        let history = tracker.into_history();
        let history_path = results_dir.join("history.json");
        report::write_history_json(&history, &history_path)?;
        tracing::info!(
            "convergence history ({} iterations) -> {}",
            history.num_iterations(),
            history_path.display()
        );
    }

    for ch in problem.channels() {
        if let Some(spend) = allocation.get(&ch.channel) {
            tracing::info!(
                "  {}: spend=${spend:.2}, conversions={:.2}",
                ch.channel,
                ch.conversions_at(spend)
            );
        }
    }

    Ok(())
}

fn cmd_sweep(
    config: &AppConfig,
    benchmarks_path: &PathBuf,
    min_budget: Option<f64>,
    max_budget: Option<f64>,
    steps: usize,
) -> Result<()> {
    let benchmarks = report::read_benchmarks_csv(benchmarks_path)?;
    let channels = report::benchmarks_to_curves(&benchmarks);

    let total_min: f64 = channels.iter().map(|ch| ch.min_spend).sum();
    let lo = min_budget.unwrap_or(total_min.max(1.0));
    let hi = max_budget.unwrap_or(config.budget.total);

    tracing::info!("sweeping {steps} budget levels from ${lo:.0} to ${hi:.0}");

    let budgets = sweep::budget_levels(lo, hi, steps);
    let points = sweep::solve_sweep(&channels, &budgets)?;

    let results_dir = &config.output.results_dir;
    fs::create_dir_all(results_dir)
        .wrap_err_with(|| format!("failed to create {}", results_dir.display()))?;

    let sweep_path = results_dir.join("sweep.csv");
    report::write_sweep_csv(&points, &sweep_path)?;
    tracing::info!("budget sweep -> {}", sweep_path.display());

    Ok(())
}
