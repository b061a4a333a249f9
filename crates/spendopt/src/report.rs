//! Report writers and readers for generated artifacts
//!
//! Three artifact kinds:
//! - Channel benchmark CSVs, written by `synth` and read back by
//!   `optimize` and `sweep`
//! - Allocation report CSVs with per-channel spend and derived metrics
//! - Convergence history JSON, one aligned series per tracked quantity
//!
//! All writes go through [`util::atomic_write`] so interrupted runs never
//! leave truncated files in the results directory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use serde_json::{Map, Value, json};
use spendopt_core::curves;
use spendopt_core::model::{Allocation, ChannelCurve};
use spendopt_core::solver::ConvergenceHistory;
use spendopt_core::sweep::BudgetPoint;

use crate::synth::ChannelBenchmark;
use crate::util;

const BENCHMARKS_HEADER: &str = "channel,cpc,ctr,cvr,min_spend,max_spend,curve_a,curve_b";

/// Write channel benchmarks as CSV.
pub fn write_benchmarks_csv(benchmarks: &[ChannelBenchmark], path: &Path) -> Result<()> {
    let mut out = String::new();
    writeln!(out, "{BENCHMARKS_HEADER}")?;
    for b in benchmarks {
        // A delimiter in the name would corrupt the CSV and break the
        // round-trip through read_benchmarks_csv.
        if b.channel.contains([',', '\n']) {
            bail!("channel name {:?} cannot be written to CSV", b.channel);
        }
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            b.channel, b.cpc, b.ctr, b.cvr, b.min_spend, b.max_spend, b.curve_a, b.curve_b
        )?;
    }

    util::atomic_write(path, &out)
        .wrap_err_with(|| format!("failed to write benchmarks to {}", path.display()))
}

/// Read channel benchmarks back from a CSV written by
/// [`write_benchmarks_csv`].
pub fn read_benchmarks_csv(path: &Path) -> Result<Vec<ChannelBenchmark>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read benchmarks from {}", path.display()))?;

    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header.trim() == BENCHMARKS_HEADER => {}
        _ => bail!("{} is not a channel benchmarks CSV", path.display()),
    }

    let mut benchmarks = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 8 {
            bail!(
                "{}: line {} has {} fields, expected 8",
                path.display(),
                idx + 2,
                fields.len()
            );
        }

        let parse = |field: &str, name: &str| -> Result<f64> {
            field
                .trim()
                .parse()
                .map_err(|_| eyre!("{}: line {} has invalid {name}", path.display(), idx + 2))
        };

        benchmarks.push(ChannelBenchmark {
            channel: fields[0].trim().to_string(),
            cpc: parse(fields[1], "cpc")?,
            ctr: parse(fields[2], "ctr")?,
            cvr: parse(fields[3], "cvr")?,
            min_spend: parse(fields[4], "min_spend")?,
            max_spend: parse(fields[5], "max_spend")?,
            curve_a: parse(fields[6], "curve_a")?,
            curve_b: parse(fields[7], "curve_b")?,
        });
    }

    if benchmarks.is_empty() {
        bail!("{} contains no channel benchmarks", path.display());
    }

    Ok(benchmarks)
}

/// Write the allocation report CSV: one row per channel with the optimal
/// spend and derived performance metrics, in channel order.
pub fn write_allocation_csv(
    channels: &[ChannelCurve],
    allocation: &Allocation,
    path: &Path,
) -> Result<()> {
    let mut out = String::new();
    writeln!(
        out,
        "channel,optimal_spend,predicted_conversions,cost_per_acquisition,marginal_roi"
    )?;
    for ch in channels {
        let spend = allocation
            .get(&ch.channel)
            .ok_or_else(|| eyre!("allocation is missing channel '{}'", ch.channel))?;
        let conversions = ch.conversions_at(spend);
        let cpa = curves::cost_per_acquisition(spend, conversions);
        let marginal = ch.marginal_at(spend);
        writeln!(
            out,
            "{},{spend:.2},{conversions:.4},{cpa:.2},{marginal:.6}",
            ch.channel
        )?;
    }

    util::atomic_write(path, &out)
        .wrap_err_with(|| format!("failed to write allocation report to {}", path.display()))
}

/// Write the convergence history as JSON with one aligned array per
/// series: `iteration`, `objective`, `budget_error` and one
/// `spend_<channel>` per channel.
pub fn write_history_json(history: &ConvergenceHistory, path: &Path) -> Result<()> {
    let mut root = Map::new();
    root.insert(
        "generated_at".to_string(),
        json!(jiff::Timestamp::now().to_string()),
    );
    root.insert("iteration".to_string(), json!(history.iterations()));
    root.insert("objective".to_string(), json!(history.objectives()));
    root.insert("budget_error".to_string(), json!(history.budget_errors()));
    for channel in history.channels() {
        let series = history
            .spend_series(channel)
            .ok_or_else(|| eyre!("history is missing series for channel '{channel}'"))?;
        root.insert(format!("spend_{channel}"), json!(series));
    }

    let content = serde_json::to_string_pretty(&Value::Object(root))?;
    util::atomic_write(path, &content)
        .wrap_err_with(|| format!("failed to write history to {}", path.display()))
}

/// Write a budget sweep as CSV: one row per budget level.
pub fn write_sweep_csv(points: &[BudgetPoint], path: &Path) -> Result<()> {
    let mut out = String::new();
    writeln!(out, "budget,total_conversions")?;
    for point in points {
        writeln!(out, "{:.2},{:.4}", point.budget, point.total_conversions)?;
    }

    util::atomic_write(path, &out)
        .wrap_err_with(|| format!("failed to write sweep to {}", path.display()))
}

/// Channel curves for the solver, in benchmark order.
pub fn benchmarks_to_curves(benchmarks: &[ChannelBenchmark]) -> Vec<ChannelCurve> {
    benchmarks
        .iter()
        .map(|b| {
            ChannelCurve::new(
                b.channel.clone(),
                b.curve_a,
                b.curve_b,
                b.min_spend,
                b.max_spend,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendopt_core::model::AllocationProblem;
    use spendopt_core::solver;
    use tempfile::tempdir;

    fn sample_benchmarks() -> Vec<ChannelBenchmark> {
        vec![
            ChannelBenchmark {
                channel: "google".to_string(),
                cpc: 1.2,
                ctr: 0.04,
                cvr: 0.06,
                min_spend: 5_000.0,
                max_spend: 30_000.0,
                curve_a: 0.002,
                curve_b: 2e-8,
            },
            ChannelBenchmark {
                channel: "meta".to_string(),
                cpc: 0.9,
                ctr: 0.03,
                cvr: 0.05,
                min_spend: 3_000.0,
                max_spend: 25_000.0,
                curve_a: 0.0016,
                curve_b: 9.6e-9,
            },
        ]
    }

    #[test]
    fn test_benchmarks_csv_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("benchmarks.csv");

        let benchmarks = sample_benchmarks();
        write_benchmarks_csv(&benchmarks, &path).unwrap();
        let loaded = read_benchmarks_csv(&path).unwrap();

        assert_eq!(loaded, benchmarks);
    }

    #[test]
    fn test_write_rejects_delimiter_in_channel_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("benchmarks.csv");

        let mut benchmarks = sample_benchmarks();
        benchmarks[0].channel = "google,ads".to_string();

        assert!(write_benchmarks_csv(&benchmarks, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_read_rejects_foreign_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        assert!(read_benchmarks_csv(&path).is_err());
    }

    #[test]
    fn test_read_rejects_malformed_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("benchmarks.csv");
        fs::write(
            &path,
            format!("{BENCHMARKS_HEADER}\ngoogle,1.2,0.04,not_a_number,5000,30000,0.002,2e-8\n"),
        )
        .unwrap();

        assert!(read_benchmarks_csv(&path).is_err());
    }

    #[test]
    fn test_allocation_csv_has_row_per_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("allocation.csv");

        let channels = benchmarks_to_curves(&sample_benchmarks());
        let problem = AllocationProblem::new(channels.clone(), 40_000.0).unwrap();
        let allocation = solver::solve(&problem).unwrap();

        write_allocation_csv(&channels, &allocation, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("channel,optimal_spend"));
        assert!(lines[1].starts_with("google,"));
        assert!(lines[2].starts_with("meta,"));
    }

    #[test]
    fn test_history_json_series_aligned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let channels = benchmarks_to_curves(&sample_benchmarks());
        let problem = AllocationProblem::new(channels, 40_000.0).unwrap();
        let (_, history) = solver::solve_with_history(&problem).unwrap();

        write_history_json(&history, &path).unwrap();

        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let n = parsed["iteration"].as_array().unwrap().len();
        assert!(n >= 2);
        assert_eq!(parsed["objective"].as_array().unwrap().len(), n);
        assert_eq!(parsed["budget_error"].as_array().unwrap().len(), n);
        assert_eq!(parsed["spend_google"].as_array().unwrap().len(), n);
        assert_eq!(parsed["spend_meta"].as_array().unwrap().len(), n);
        assert!(parsed["generated_at"].is_string());
    }

    #[test]
    fn test_sweep_csv_row_per_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sweep.csv");

        let channels = benchmarks_to_curves(&sample_benchmarks());
        let budgets = [20_000.0, 30_000.0, 40_000.0];
        let points = spendopt_core::sweep::solve_sweep(&channels, &budgets).unwrap();

        write_sweep_csv(&points, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
