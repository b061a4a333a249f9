//! YAML configuration loading and validation
//!
//! The config file drives every subcommand: the budget, the channel roster
//! with spend bounds, synthetic data generation ranges, solver settings and
//! output locations. Validation happens eagerly at load time so later
//! stages can assume a well-formed config.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, bail};
use serde::{Deserialize, Serialize};

/// Top-level application configuration in human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub budget: BudgetConfig,
    pub channels: Vec<ChannelConfig>,
    pub synth_data: SynthDataConfig,
    #[serde(default)]
    pub optimization: OptimizationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Total budget to allocate, spent exactly
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub min_spend: f64,
    pub max_spend: f64,
}

/// Ranges for synthetic funnel metric sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthDataConfig {
    pub random_seed: u64,
    /// Cost per click range, dollars
    pub cpc_range: [f64; 2],
    /// Click-through rate range
    pub ctr_range: [f64; 2],
    /// Conversion rate range
    pub cvr_range: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub track_history: bool,
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_max_iterations() -> usize {
    100
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            track_history: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

impl AppConfig {
    /// Load from a YAML file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Check cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.budget.total <= 0.0 || !self.budget.total.is_finite() {
            bail!("budget must be > 0");
        }

        if self.channels.is_empty() {
            bail!("need at least one channel");
        }

        for ch in &self.channels {
            if ch.name.trim().is_empty() || ch.name.contains([',', '\n']) {
                bail!("invalid channel name {:?}", ch.name);
            }
            if ch.min_spend < 0.0 || ch.max_spend <= ch.min_spend {
                bail!(
                    "invalid spend constraints for '{}': [{}, {}]",
                    ch.name,
                    ch.min_spend,
                    ch.max_spend
                );
            }
        }

        let total_min: f64 = self.channels.iter().map(|ch| ch.min_spend).sum();
        if total_min > self.budget.total {
            bail!(
                "channel minimums ({total_min}) exceed budget ({})",
                self.budget.total
            );
        }

        let [cpc_lo, cpc_hi] = self.synth_data.cpc_range;
        let [ctr_lo, ctr_hi] = self.synth_data.ctr_range;
        let [cvr_lo, cvr_hi] = self.synth_data.cvr_range;
        for (name, lo, hi) in [
            ("cpc_range", cpc_lo, cpc_hi),
            ("ctr_range", ctr_lo, ctr_hi),
            ("cvr_range", cvr_lo, cvr_hi),
        ] {
            if lo <= 0.0 || hi < lo {
                bail!("invalid {name}: [{lo}, {hi}]");
            }
        }

        Ok(())
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|ch| ch.name.as_str()).collect()
    }
}
