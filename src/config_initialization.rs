//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::error::{MarkCutError, MarkCutResult};
use crate::utils::logging::LogLevel;

/// Values taken from the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(overrides: &ConfigOverrides) -> MarkCutResult<AppConfig> {
    let config = load_config_file(overrides.config_file.as_deref())?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    let config = apply_cli_overrides(config, overrides)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit file or from `markcut.toml` when present
fn load_config_file(explicit: Option<&Path>) -> MarkCutResult<AppConfig> {
    if let Some(path) = explicit {
        info!("Loading configuration from: {}", path.display());
        return TomlConfigAdapter::load(path);
    }

    let default_path = Path::new(TomlConfigAdapter::DEFAULT_FILE);
    if default_path.exists() {
        info!("Loading configuration from: {}", default_path.display());
        return TomlConfigAdapter::load(default_path);
    }

    debug!("No configuration file found, using defaults");
    Ok(AppConfig::default())
}

/// Apply `MARKCUT_*` environment variables through `lookup`
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> MarkCutResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_overrides = 0;

    if let Some(value) = lookup("MARKCUT_STORE") {
        config.storage.path = PathBuf::from(value);
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_NAMESPACE") {
        config.storage.namespace = value;
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_FFMPEG") {
        config.engine.ffmpeg_path = PathBuf::from(value);
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_READY_TIMEOUT_SECS") {
        config.engine.ready_timeout_secs = parse_env("MARKCUT_READY_TIMEOUT_SECS", &value)?;
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_SCRATCH_DIR") {
        config.engine.scratch_dir = Some(PathBuf::from(value));
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_OUTPUT_DIR") {
        config.cutting.output_dir = PathBuf::from(value);
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_LARGE_INPUT_MB") {
        config.cutting.large_input_threshold_mb = parse_env("MARKCUT_LARGE_INPUT_MB", &value)?;
        env_overrides += 1;
    }
    if let Some(value) = lookup("MARKCUT_LOG_LEVEL") {
        config.logging.level = parse_level(&value)?;
        env_overrides += 1;
    }

    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(config)
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(mut config: AppConfig, overrides: &ConfigOverrides) -> MarkCutResult<AppConfig> {
    if let Some(store) = &overrides.store {
        config.storage.path = store.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = parse_level(level)?;
    }
    if overrides.json_logs {
        config.logging.json = true;
    }
    Ok(config)
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> MarkCutResult<T> {
    value.trim().parse().map_err(|_| MarkCutError::Config {
        message: format!("invalid value for {}: '{}'", key, value),
    })
}

fn parse_level(value: &str) -> MarkCutResult<LogLevel> {
    LogLevel::parse(value).ok_or_else(|| MarkCutError::Config {
        message: format!(
            "invalid log level '{}', expected one of: trace, debug, info, warn, error",
            value
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MARKCUT_STORE", "/tmp/state.json"),
            ("MARKCUT_READY_TIMEOUT_SECS", "2.5"),
            ("MARKCUT_LARGE_INPUT_MB", "100"),
            ("MARKCUT_LOG_LEVEL", "trace"),
        ]
        .into_iter()
        .collect();

        let config = apply_env_overrides(AppConfig::default(), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.engine.ready_timeout_secs, 2.5);
        assert_eq!(config.cutting.large_input_threshold_mb, 100);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let result = apply_env_overrides(AppConfig::default(), |key| {
            (key == "MARKCUT_LARGE_INPUT_MB").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(MarkCutError::Config { .. })));
    }

    #[test]
    fn test_oversized_ready_timeout_fails_validation() {
        let config = apply_env_overrides(AppConfig::default(), |key| {
            (key == "MARKCUT_READY_TIMEOUT_SECS").then(|| "1e30".to_string())
        })
        .unwrap();
        assert!(matches!(config.validate(), Err(MarkCutError::Config { .. })));
    }

    #[test]
    fn test_cli_beats_env() {
        let config = apply_env_overrides(AppConfig::default(), |key| {
            (key == "MARKCUT_STORE").then(|| "env.json".to_string())
        })
        .unwrap();
        let overrides = ConfigOverrides {
            store: Some(PathBuf::from("cli.json")),
            log_level: Some("error".to_string()),
            json_logs: true,
            ..Default::default()
        };

        let config = apply_cli_overrides(config, &overrides).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("cli.json"));
        assert_eq!(config.logging.level, LogLevel::Error);
        assert!(config.logging.json);
    }
}
