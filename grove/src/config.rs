//! Growth tunables and their environment mapping.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `GROVE_ALPHA` | `alpha` | 0.7 |
//! | `GROVE_EXPLORATION` | `exploration` | 0.1 |
//! | `GROVE_PARENTS` | `num_parents` | 2 |
//! | `GROVE_BRANCHING_THRESHOLD` | `branching_threshold` | 3 |
//! | `GROVE_STRATEGY` | `strategy` | `uct` |
//! | `GROVE_INTERVAL_MS` | `auto_interval` | 3000 |
//! | `GROVE_TIMEOUT_SECS` | `generation_timeout` | none |
//! | `GROVE_SEED` | `rng_seed` | none |
//! | `GROVE_MODEL` | `model` | none |
//!
//! The `config` crate loads `.env` and `config.toml` into the process environment first;
//! [`GrowthConfig::from_env`] then reads the variables above.

use std::time::Duration;

use crate::aggregate::DEFAULT_ALPHA;
use crate::select::{
    SelectionStrategy, SelectorParams, DEFAULT_BRANCHING_THRESHOLD, DEFAULT_EXPLORATION,
    DEFAULT_NUM_PARENTS,
};

/// Default auto-growth interval.
pub const DEFAULT_AUTO_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("alpha must be in (0, 1), got {0}")]
    Alpha(f64),
    #[error("exploration constant must be finite and >= 0, got {0}")]
    Exploration(f64),
    #[error("number of parents must be at least 1")]
    NumParents,
    #[error("auto-growth interval must be non-zero")]
    Interval,
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Every tunable of a growth run.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthConfig {
    /// Depth decay for descendant aggregation, in (0, 1).
    pub alpha: f64,
    /// UCT exploration constant `C`.
    pub exploration: f64,
    /// Parents per cycle `K`.
    pub num_parents: usize,
    /// A parent needs this many children before its children are eligible.
    pub branching_threshold: usize,
    pub strategy: SelectionStrategy,
    pub auto_interval: Duration,
    /// Per-call limit on the generator; `None` leaves it to the generator.
    pub generation_timeout: Option<Duration>,
    /// Free-text instruction forwarded to the generator.
    pub instruction: Option<String>,
    /// Review criteria forwarded to the generator.
    pub criteria: Option<String>,
    /// Seed for the random strategy; entropy when `None`.
    pub rng_seed: Option<u64>,
    /// Chat model name for LLM-backed generators.
    pub model: Option<String>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            exploration: DEFAULT_EXPLORATION,
            num_parents: DEFAULT_NUM_PARENTS,
            branching_threshold: DEFAULT_BRANCHING_THRESHOLD,
            strategy: SelectionStrategy::Uct,
            auto_interval: DEFAULT_AUTO_INTERVAL,
            generation_timeout: None,
            instruction: None,
            criteria: None,
            rng_seed: None,
            model: None,
        }
    }
}

impl GrowthConfig {
    /// Reads overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup` (key → value) on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "GROVE_ALPHA")? {
            cfg.alpha = v;
        }
        if let Some(v) = parse_var(&lookup, "GROVE_EXPLORATION")? {
            cfg.exploration = v;
        }
        if let Some(v) = parse_var(&lookup, "GROVE_PARENTS")? {
            cfg.num_parents = v;
        }
        if let Some(v) = parse_var(&lookup, "GROVE_BRANCHING_THRESHOLD")? {
            cfg.branching_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "GROVE_STRATEGY")? {
            cfg.strategy = v;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "GROVE_INTERVAL_MS")? {
            cfg.auto_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "GROVE_TIMEOUT_SECS")? {
            cfg.generation_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(v) = parse_var(&lookup, "GROVE_SEED")? {
            cfg.rng_seed = Some(v);
        }
        if let Some(v) = parse_var::<String, _>(&lookup, "GROVE_MODEL")? {
            cfg.model = Some(v);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration(self.exploration));
        }
        if self.num_parents == 0 {
            return Err(ConfigError::NumParents);
        }
        if self.auto_interval.is_zero() {
            return Err(ConfigError::Interval);
        }
        Ok(())
    }

    pub fn selector_params(&self) -> SelectorParams {
        SelectorParams {
            exploration: self.exploration,
            num_parents: self.num_parents,
            branching_threshold: self.branching_threshold,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
