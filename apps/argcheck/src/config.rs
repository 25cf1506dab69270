//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config` or `ARGCHECK_CONFIG`)
//! 3. environment overrides
//! 4. command-line flags
//!
//! ```toml
//! [validator]
//! require_observation_sources = true
//! cycle_scope = "all_relations"
//!
//! [validator.consistency]
//! contradiction_tolerance = 0.05
//!
//! [probe]
//! timeout_secs = 5
//! max_concurrent = 8
//! ```

use argcheck_core::{ArgcheckError, ValidatorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Path of the configuration file when `--config` is not given.
pub const CONFIG_ENV: &str = "ARGCHECK_CONFIG";

/// Overrides `validator.consistency.contradiction_tolerance`.
pub const TOLERANCE_ENV: &str = "ARGCHECK_CONTRADICTION_TOLERANCE";

/// Overrides `probe.timeout_secs`.
pub const PROBE_TIMEOUT_ENV: &str = "ARGCHECK_PROBE_TIMEOUT_SECS";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Upper bound for a single probe timeout.
const MAX_PROBE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// PROBE SETTINGS
// =============================================================================

/// Source liveness probe settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Requests in flight at once.
    pub max_concurrent: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_concurrent: 8,
        }
    }
}

impl ProbeConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ArgcheckError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_PROBE_TIMEOUT_SECS {
            return Err(ArgcheckError::ConfigError(format!(
                "probe.timeout_secs must be between 1 and {}, got {}",
                MAX_PROBE_TIMEOUT_SECS, self.timeout_secs
            )));
        }
        if self.max_concurrent == 0 {
            return Err(ArgcheckError::ConfigError(
                "probe.max_concurrent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Engine settings.
    pub validator: ValidatorConfig,
    /// Source probe settings.
    pub probe: ProbeConfig,
}

impl AppConfig {
    /// Parse a TOML document. Missing sections keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ArgcheckError> {
        toml::from_str(text).map_err(|e| ArgcheckError::ConfigError(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ArgcheckError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ArgcheckError::ConfigError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ArgcheckError::ConfigError(format!(
                "Config '{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArgcheckError::ConfigError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the file layer and the environment layer from the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ArgcheckError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::load`], reading variables through `lookup`.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgcheckError> {
        let env_path = lookup(CONFIG_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply `ARGCHECK_*` overrides.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ArgcheckError> {
        if let Some(raw) = lookup(TOLERANCE_ENV) {
            let tolerance = raw.trim().parse::<f64>().map_err(|_| {
                ArgcheckError::ConfigError(format!("{TOLERANCE_ENV}: '{raw}' is not a number"))
            })?;
            self.validator.consistency.contradiction_tolerance = tolerance;
        }
        if let Some(raw) = lookup(PROBE_TIMEOUT_ENV) {
            self.probe.timeout_secs = raw.trim().parse::<u64>().map_err(|_| {
                ArgcheckError::ConfigError(format!(
                    "{PROBE_TIMEOUT_ENV}: '{raw}' is not a whole number of seconds"
                ))
            })?;
        }
        Ok(())
    }

    /// Apply the `--tolerance` flag.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        if let Some(tolerance) = tolerance {
            self.validator.consistency.contradiction_tolerance = tolerance;
        }
        self
    }

    /// Check every layer's values together.
    pub fn validate(&self) -> Result<(), ArgcheckError> {
        self.validator.validate()?;
        self.probe.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================
