//! Optimizer tuning knobs. Every field has a default so a YAML file only
//! needs to name what it changes:
//!
//! ```
//! use anchorleg::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::from_yaml_str("max_iterations: 250\nseed: 9\n").unwrap();
//! assert_eq!(config.max_iterations, 250);
//! assert_eq!(config.seed, Some(9));
//! assert_eq!(config.baseline_samples, 100);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::optimizer::baseline::BaselineSettings;

pub const DEFAULT_CONFIG_PATH: &str = "anchorleg.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Recorded samples wanted per (slot, band).
    pub baseline_samples: usize,
    /// Random quartets tried per sample before giving up on it.
    pub baseline_retry_cap: usize,
    /// Bands with fewer samples get no baseline.
    pub baseline_min_samples: usize,
    pub parallel_baseline: bool,
    /// Rayon worker threads for baseline generation; 0 uses every core.
    pub worker_threads: usize,
    /// Candidate pool size for single-gender slots in the initial fill.
    pub top_k_single: usize,
    /// Candidate pool size per gender for mixed slots in the initial fill.
    pub top_k_mixed: usize,
    /// Quartets examined per slot by gap filling and swap planning.
    pub gap_fill_attempt_cap: usize,
    pub max_iterations: usize,
    /// Consecutive non-improving iterations that end local search.
    pub stall_limit: usize,
    pub improvement_threshold: f64,
    /// Local-search iterations between progress notices.
    pub progress_block: usize,
    pub progress_interval_ms: u64,
    pub seed: Option<u64>,
    /// Ages are taken on December 31 of this year.
    pub reference_year: Option<i32>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            baseline_samples: 100,
            baseline_retry_cap: 50,
            baseline_min_samples: 10,
            parallel_baseline: true,
            worker_threads: 0,
            top_k_single: 30,
            top_k_mixed: 20,
            gap_fill_attempt_cap: 200_000,
            max_iterations: 1000,
            stall_limit: 100,
            improvement_threshold: 0.01,
            progress_block: 100,
            progress_interval_ms: 100,
            seed: None,
            reference_year: None,
        }
    }
}

impl OptimizerConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Loads `path` when it exists, otherwise returns defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_yaml_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline_min_samples == 0 {
            return Err(ConfigError::Invalid(
                "baseline_min_samples must be at least 1".to_string(),
            ));
        }
        if self.baseline_retry_cap == 0 {
            return Err(ConfigError::Invalid(
                "baseline_retry_cap must be at least 1".to_string(),
            ));
        }
        if self.top_k_single < 4 {
            return Err(ConfigError::Invalid("top_k_single must be at least 4".to_string()));
        }
        if self.top_k_mixed < 2 {
            return Err(ConfigError::Invalid("top_k_mixed must be at least 2".to_string()));
        }
        if !self.improvement_threshold.is_finite() || self.improvement_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "improvement_threshold must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn baseline_settings(&self, seed: u64) -> BaselineSettings {
        BaselineSettings {
            samples: self.baseline_samples,
            retry_cap: self.baseline_retry_cap,
            min_samples: self.baseline_min_samples,
            parallel: self.parallel_baseline,
            seed,
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Date ages are measured on.
    pub fn reference_date(&self) -> NaiveDate {
        let year = self.reference_year.unwrap_or_else(|| Utc::now().year());
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
    }

    /// Configured seed, or fresh entropy when none is set.
    pub fn resolve_seed(&self) -> u64 {
        if let Some(seed) = self.seed {
            return seed;
        }
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => u64::from_le_bytes(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "entropy unavailable, falling back to clock seed");
                Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
            }
        }
    }
}
