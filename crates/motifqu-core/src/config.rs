//! Run configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `MOTIFQU_` prefix)
//! 3. .env files
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;
use std::str::FromStr;

use motifqu_hal::BackendConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decoder::TopKPolicy;
use crate::error::{MotifError, MotifResult};

/// Highest qubit ceiling accepted from configuration.
pub const MAX_QUBIT_CEILING: u32 = 30;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotifConfig {
    /// Amplification settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Hit reporting settings
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Execution backend settings
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Amplification engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest register the search space may need
    #[serde(default = "default_qubit_ceiling")]
    pub qubit_ceiling: u32,

    /// Fixed Grover round count instead of the optimal one
    #[serde(default)]
    pub force_iterations: Option<u32>,

    /// Log progress every N rounds, 0 to disable
    #[serde(default = "default_progress_every")]
    pub progress_every: u32,
}

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Report exactly this many hits; unset reports everything above the floor
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Multiple of 1/N used as the probability floor
    #[serde(default = "default_floor_factor")]
    pub floor_factor: f64,
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Registered backend name
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// Shots for sampling backends
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Sampling seed
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default value functions
fn default_qubit_ceiling() -> u32 {
    20
}

fn default_progress_every() -> u32 {
    5
}

fn default_floor_factor() -> f64 {
    1.0
}

fn default_backend_name() -> String {
    "statevector".to_string()
}

fn default_shots() -> u32 {
    4096
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qubit_ceiling: default_qubit_ceiling(),
            force_iterations: None,
            progress_every: default_progress_every(),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            top_k: None,
            floor_factor: default_floor_factor(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            shots: default_shots(),
            seed: None,
        }
    }
}

impl MotifConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MotifResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MotifError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> MotifResult<Self> {
        serde_yaml_ng::from_str(contents).map_err(|e| MotifError::Config(e.to_string()))
    }

    /// Load configuration with the following precedence:
    /// 1. Load .env file if it exists
    /// 2. Load from file if provided
    /// 3. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> MotifResult<Self> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge process environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Merge overrides from `lookup`.
    ///
    /// Only keys that `lookup` returns override the current values. Values
    /// that fail to parse are logged and ignored.
    pub fn merge_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Engine
        if let Some(v) = parse_var(&lookup, "MOTIFQU_QUBIT_CEILING") {
            self.engine.qubit_ceiling = v;
        }
        if let Some(v) = parse_var(&lookup, "MOTIFQU_FORCE_ITERATIONS") {
            self.engine.force_iterations = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "MOTIFQU_PROGRESS_EVERY") {
            self.engine.progress_every = v;
        }

        // Decoder
        if let Some(v) = parse_var(&lookup, "MOTIFQU_TOP_K") {
            self.decoder.top_k = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "MOTIFQU_FLOOR_FACTOR") {
            self.decoder.floor_factor = v;
        }

        // Backend
        if let Some(v) = lookup("MOTIFQU_BACKEND") {
            self.backend.name = v;
        }
        if let Some(v) = parse_var(&lookup, "MOTIFQU_SHOTS") {
            self.backend.shots = v;
        }
        if let Some(v) = parse_var(&lookup, "MOTIFQU_SEED") {
            self.backend.seed = Some(v);
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> MotifResult<()> {
        if self.engine.qubit_ceiling == 0 || self.engine.qubit_ceiling > MAX_QUBIT_CEILING {
            return Err(MotifError::Config(format!(
                "qubit_ceiling must be in 1..={MAX_QUBIT_CEILING}, got {}",
                self.engine.qubit_ceiling
            )));
        }

        if !(self.decoder.floor_factor.is_finite() && self.decoder.floor_factor > 0.0) {
            return Err(MotifError::Config(format!(
                "floor_factor must be positive, got {}",
                self.decoder.floor_factor
            )));
        }

        if self.backend.shots == 0 {
            return Err(MotifError::Config(
                "shots must be greater than 0".to_string(),
            ));
        }

        if self.backend.name.trim().is_empty() {
            return Err(MotifError::Config(
                "backend name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Decoder policy described by this configuration.
    pub fn top_k_policy(&self) -> TopKPolicy {
        TopKPolicy::from_options(self.decoder.top_k, self.decoder.floor_factor)
    }

    /// Backend configuration to hand to a registry.
    ///
    /// Carries `max_qubits`, `shots` and `seed` in the extra map; backends
    /// read the keys they understand.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new(self.backend.name.clone())
            .with_extra("max_qubits", serde_json::json!(self.engine.qubit_ceiling))
            .with_extra("shots", serde_json::json!(self.backend.shots));
        if let Some(seed) = self.backend.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
