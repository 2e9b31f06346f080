use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data directories.
const APP_DIR: &str = "macromate";

pub const ENV_DATA_DIR: &str = "MACROMATE_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "MACROMATE_LOG_LEVEL";

/// Where a configuration value came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding macromate.json
    pub data_dir: ConfigValue<PathBuf>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: ConfigValue<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
}

impl Config {
    /// Loads settings, environment first, then the config file, then defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        Self::load_with(config_path, lookup)
    }

    fn load_with<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut log_level = ConfigValue::new("warn".to_string(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            if let Some(dir) = file.data_dir {
                data_dir.set(resolve_against(&path, dir), ConfigSource::File);
            }
            if let Some(level) = file.log_level {
                log_level.set(level, ConfigSource::File);
            }
            config_file = Some(path);
        }

        if let Some(dir) = env(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            data_dir.set(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(level) = env(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            log_level.set(level, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            log_level,
            config_file,
        })
    }

    /// Platform config directory plus `macromate/`, e.g. `~/.config/macromate/`
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Platform data directory plus `macromate/`, e.g. `~/.local/share/macromate/`
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Relative paths in the file are relative to the file's own directory.
fn resolve_against(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert!(config.data_dir.value.ends_with("macromate"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.log_level.value, "warn");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/macromate").unwrap();
        writeln!(file, "log_level: debug").unwrap();

        let config = Config::load_with(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/macromate"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.log_level.value, "debug");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: store\n").unwrap();

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("store"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: /from/file\nlog_level: info\n").unwrap();

        let env: HashMap<&str, &str> = [(ENV_DATA_DIR, "/from/env"), (ENV_LOG_LEVEL, "")]
            .into_iter()
            .collect();
        let config = Config::load_with(Some(config_path), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);
        // blank env values are ignored
        assert_eq!(config.log_level.value, "info");
        assert_eq!(config.log_level.source, ConfigSource::File);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "invalid: yaml: content: [\n").unwrap();

        let err = Config::load_with(Some(config_path), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
