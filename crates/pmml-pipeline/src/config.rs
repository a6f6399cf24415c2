//! Verification tolerances.

use serde::{Deserialize, Serialize};

use crate::error::{PmmlError, Result};
use crate::verification::{check_tolerances, DEFAULT_PRECISION, DEFAULT_ZERO_THRESHOLD};

/// Overrides [`VerificationConfig::precision`].
pub const PRECISION_ENV: &str = "PMML_VERIFY_PRECISION";

/// Overrides [`VerificationConfig::zero_threshold`].
pub const ZERO_THRESHOLD_ENV: &str = "PMML_VERIFY_ZERO_THRESHOLD";

/// Tolerances recorded in every verification snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Relative tolerance.
    pub precision: f64,

    /// Absolute tolerance applied to values close to zero.
    #[serde(rename = "zeroThreshold", alias = "zero_threshold")]
    pub zero_threshold: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            zero_threshold: DEFAULT_ZERO_THRESHOLD,
        }
    }
}

impl VerificationConfig {
    pub fn new(precision: f64, zero_threshold: f64) -> Result<Self> {
        let config = Self {
            precision,
            zero_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_tolerances(self.precision, self.zero_threshold)
    }

    /// Defaults overridden by `PMML_VERIFY_PRECISION` and
    /// `PMML_VERIFY_ZERO_THRESHOLD` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(PRECISION_ENV) {
            config.precision = parse_tolerance(PRECISION_ENV, &raw)?;
        }
        if let Some(raw) = lookup(ZERO_THRESHOLD_ENV) {
            config.zero_threshold = parse_tolerance(ZERO_THRESHOLD_ENV, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_tolerance(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| PmmlError::Config(format!("{key}={raw:?}: {e}")))
}
