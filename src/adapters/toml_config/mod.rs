// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MarkCutError, MarkCutResult};
use crate::utils::logging::LoggingConfig;

/// Where marker state is kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON state file
    pub path: PathBuf,
    /// Prefix applied to every persisted key
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".markcut").join("state.json"),
            namespace: "videoCutter_".to_string(),
        }
    }
}

/// Video engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ffmpeg_path: PathBuf,
    /// Upper bound on the wait for engine readiness
    pub ready_timeout_secs: f64,
    /// Readiness poll interval
    pub poll_interval_ms: u64,
    /// Parent of the scratch directory, system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ready_timeout_secs: 20.0,
            poll_interval_ms: 500,
            scratch_dir: None,
        }
    }
}

/// Cutting run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuttingConfig {
    /// Inputs above this size need confirmation before cutting
    pub large_input_threshold_mb: u64,
    /// Directory receiving cut segments and exports
    pub output_dir: PathBuf,
}

impl Default for CuttingConfig {
    fn default() -> Self {
        Self {
            large_input_threshold_mb: 500,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Longest accepted wait for engine readiness
pub const MAX_READY_TIMEOUT_SECS: f64 = 3600.0;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub cutting: CuttingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Readiness timeout, clamped to the accepted range
    pub fn ready_timeout(&self) -> Duration {
        let secs = self.engine.ready_timeout_secs;
        if secs.is_finite() {
            Duration::from_secs_f64(secs.clamp(0.0, MAX_READY_TIMEOUT_SECS))
        } else {
            Duration::ZERO
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.engine.poll_interval_ms)
    }

    pub fn large_input_threshold_bytes(&self) -> u64 {
        self.cutting.large_input_threshold_mb.saturating_mul(1024 * 1024)
    }

    /// Validate configuration
    pub fn validate(&self) -> MarkCutResult<()> {
        let timeout = self.engine.ready_timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 || timeout > MAX_READY_TIMEOUT_SECS {
            return Err(MarkCutError::Config {
                message: format!(
                    "engine.ready_timeout_secs must be in (0, {}], got {}",
                    MAX_READY_TIMEOUT_SECS, timeout
                ),
            });
        }
        if self.engine.poll_interval_ms == 0 {
            return Err(MarkCutError::Config {
                message: "engine.poll_interval_ms must be positive".to_string(),
            });
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(MarkCutError::Config {
                message: "storage.namespace cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Default config file looked up in the working directory
    pub const DEFAULT_FILE: &'static str = "markcut.toml";

    /// Load configuration from file
    pub fn load(path: &Path) -> MarkCutResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| MarkCutError::Config {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Deserialize config from TOML string; absent keys keep their defaults
    pub fn parse(content: &str) -> MarkCutResult<AppConfig> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
