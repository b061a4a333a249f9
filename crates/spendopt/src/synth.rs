//! Synthetic channel benchmark generation
//!
//! Models each channel's conversions as a concave quadratic of spend.
//! Funnel metrics (CPC, CTR, CVR) are sampled from config ranges, skewed
//! by a per-channel personality profile, then folded into the quadratic
//! coefficients. Seasonality and audience effects are deliberately ignored.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Per-channel personality: multipliers applied to the sampled base
/// metrics, plus how quickly the channel saturates.
#[derive(Debug, Clone, Copy)]
struct ChannelProfile {
    cpc_multiplier: f64,
    ctr_multiplier: f64,
    cvr_multiplier: f64,
    /// Fractional efficiency loss at `max_spend`
    saturation_rate: f64,
}

const DEFAULT_PROFILE: ChannelProfile = ChannelProfile {
    cpc_multiplier: 1.0,
    ctr_multiplier: 1.0,
    cvr_multiplier: 1.0,
    saturation_rate: 0.3,
};

/// Personality profile for a known channel name (case-insensitive), or
/// neutral multipliers for anything unrecognized.
fn profile_for(channel: &str) -> ChannelProfile {
    match channel.to_ascii_lowercase().as_str() {
        // baseline cost, high engagement, strong conversion
        "google" => ChannelProfile {
            cpc_multiplier: 1.0,
            ctr_multiplier: 1.2,
            cvr_multiplier: 1.5,
            saturation_rate: 0.3,
        },
        "meta" => ChannelProfile {
            cpc_multiplier: 1.0,
            ctr_multiplier: 0.9,
            cvr_multiplier: 1.1,
            saturation_rate: 0.15,
        },
        // cheap clicks, high engagement, moderate conversion
        "tiktok" => ChannelProfile {
            cpc_multiplier: 0.6,
            ctr_multiplier: 1.3,
            cvr_multiplier: 0.7,
            saturation_rate: 0.2,
        },
        "reddit" => ChannelProfile {
            cpc_multiplier: 0.8,
            ctr_multiplier: 1.1,
            cvr_multiplier: 1.0,
            saturation_rate: 0.4,
        },
        // cheap clicks, low conversion, fast saturation
        "x" => ChannelProfile {
            cpc_multiplier: 0.6,
            ctr_multiplier: 1.0,
            cvr_multiplier: 0.5,
            saturation_rate: 0.6,
        },
        _ => DEFAULT_PROFILE,
    }
}

/// One channel's generated benchmark: sampled funnel metrics, the spend
/// bounds carried over from config, and the derived curve coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBenchmark {
    pub channel: String,
    pub cpc: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub min_spend: f64,
    pub max_spend: f64,
    pub curve_a: f64,
    pub curve_b: f64,
}

/// Turn funnel metrics into `(a, b)` curve coefficients.
///
/// The initial efficiency is conversions per dollar at negligible spend:
/// `a = ctr * cvr / cpc`. The curvature is chosen so marginal efficiency
/// drops by `saturation_rate` at `max_spend`.
fn derive_quad_params(cpc: f64, ctr: f64, cvr: f64, max_spend: f64, saturation_rate: f64) -> (f64, f64) {
    let a = (ctr * cvr) / cpc;
    let b = (a * saturation_rate) / max_spend;
    (a, b)
}

/// Generate benchmarks for every configured channel.
///
/// Deterministic for a fixed `random_seed` and channel order: metrics are
/// drawn channel by channel from a single seeded stream.
pub fn generate_channel_benchmarks(config: &AppConfig) -> Vec<ChannelBenchmark> {
    let mut rng = StdRng::seed_from_u64(config.synth_data.random_seed);
    let synth = &config.synth_data;

    config
        .channels
        .iter()
        .map(|ch| {
            let cpc = rng.random_range(synth.cpc_range[0]..=synth.cpc_range[1]);
            let ctr = rng.random_range(synth.ctr_range[0]..=synth.ctr_range[1]);
            let cvr = rng.random_range(synth.cvr_range[0]..=synth.cvr_range[1]);

            let profile = profile_for(&ch.name);
            let cpc = cpc * profile.cpc_multiplier;
            let ctr = ctr * profile.ctr_multiplier;
            let cvr = cvr * profile.cvr_multiplier;

            let (curve_a, curve_b) =
                derive_quad_params(cpc, ctr, cvr, ch.max_spend, profile.saturation_rate);

            ChannelBenchmark {
                channel: ch.name.clone(),
                cpc,
                ctr,
                cvr,
                min_spend: ch.min_spend,
                max_spend: ch.max_spend,
                curve_a,
                curve_b,
            }
        })
        .collect()
}
