//! Tuning configuration, loaded from `config.toml`.
//!
//! Only parameters an operator plausibly retunes live here; everything tied
//! to the boat's geometry or the control design stays a named constant next
//! to the code that owns it. No environment variable shapes behaviour.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct HelmsmanConfig {
    pub rudder: RudderConfig,
    pub sail: SailConfig,
    pub filter: FilterConfig,
    pub supervisor: SupervisorConfig,
}

/// State-feedback gains over [ωz, ϕz, ∫ϕz]; defaults give the 5 s
/// closed-loop response.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RudderConfig {
    pub k_omega: f64,
    pub k_phi: f64,
    pub k_integral: f64,
}

impl Default for RudderConfig {
    fn default() -> Self {
        Self {
            k_omega: crate::rudder_controller::STATE_FEEDBACK_1,
            k_phi: crate::rudder_controller::STATE_FEEDBACK_2,
            k_integral: crate::rudder_controller::STATE_FEEDBACK_3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SailConfig {
    /// Optimal angle of attack of the trimmed sail at the boom, degrees.
    /// The sail twists toward the mast top, so this is the lower bound of
    /// what the cloth actually sees.
    pub optimal_aoa_deg: f64,
}

impl Default for SailConfig {
    fn default() -> Self {
        Self { optimal_aoa_deg: 20.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Uninterrupted feeding time before the true-wind estimate counts as
    /// reliable. Must not go below 30 s; the slow filter needs that long.
    pub true_wind_warmup_s: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            true_wind_warmup_s: 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupervisorConfig {
    /// How long the normal controller tolerates no speed and no wind
    /// before handing back to Initial.
    pub give_up_s: f64,
    /// Start with the drive-checkout sweep instead of Initial (dockside).
    pub start_in_test: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            give_up_s: 60.0,
            start_in_test: false,
        }
    }
}

impl HelmsmanConfig {
    /// Load from the given path, or fall back to the built-in defaults
    /// shipped next to the binary.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let raw = match path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?,
            None => include_str!("../config.toml").to_string(),
        };
        let config: Self = toml::from_str(&raw).context("parsing config")?;
        anyhow::ensure!(
            config.filter.true_wind_warmup_s >= 30.0,
            "true_wind_warmup_s must be at least 30 s"
        );
        anyhow::ensure!(config.supervisor.give_up_s > 0.0, "give_up_s must be positive");
        Ok(config)
    }
}
