//! Configuration loading utilities

use crate::Config;
use epitrend_common::{EpiError, Result as EpiResult};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "EPITREND_CONFIG_PATH";

/// Files probed, in order, when no explicit path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["epitrend.yaml", "epitrend.yml", "epitrend.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// Parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for EpiError {
    fn from(err: ConfigError) -> Self {
        EpiError::config_with_source("failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::parse_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Load configuration from the environment, the default files, or defaults, then validate it.
    pub fn load() -> EpiResult<Config> {
        let config = match Self::locate(|var| std::env::var(var).ok(), |path| path.exists()) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_config(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EpiResult<Config> {
        let config = Self::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file; the format follows the extension (`.toml`, otherwise YAML).
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Resolve which configuration file to read, if any.
    pub fn locate(
        lookup: impl Fn(&str) -> Option<String>,
        exists: impl Fn(&Path) -> bool,
    ) -> Option<PathBuf> {
        if let Some(explicit) = lookup(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(explicit));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| exists(candidate))
    }

    /// Apply process environment overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| std::env::var(var).ok())
    }

    /// Apply overrides read through `lookup` to configuration
    pub fn apply_overrides(
        config: &mut Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Data source overrides
        if let Some(path) = lookup("EPITREND_DATA_PATH") {
            config.data.source_path = PathBuf::from(path);
        }

        if let Some(url) = lookup("EPITREND_DATA_URL") {
            config.data.source_url = url;
        }

        if let Some(fetch) = lookup("EPITREND_FETCH_REMOTE") {
            config.data.fetch_remote = parse_var("EPITREND_FETCH_REMOTE", &fetch)?;
        }

        if let Some(entities) = lookup("EPITREND_ENTITIES") {
            config.data.entities = entities
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Analysis overrides
        if let Some(window) = lookup("EPITREND_ROLLING_WINDOW") {
            config.analysis.rolling_window = parse_var("EPITREND_ROLLING_WINDOW", &window)?;
        }

        // Graph overrides
        if let Some(top_n) = lookup("EPITREND_TOP_N") {
            config.graphs.top_n = parse_var("EPITREND_TOP_N", &top_n)?;
        }

        // Output overrides
        if let Some(dir) = lookup("EPITREND_OUTPUT_DIR") {
            let root = PathBuf::from(dir);
            config.output.figures_dir = root.join("figures");
            config.output.html_dir = root.join("html");
        }

        // Logging overrides
        if let Some(level) = lookup("EPITREND_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = lookup("EPITREND_LOG_FILE") {
            config.logging.file_path = Some(file);
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_overrides_are_applied() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("EPITREND_DATA_PATH", "input/owid.json"),
            ("EPITREND_FETCH_REMOTE", "true"),
            ("EPITREND_ENTITIES", "France, Italy,,Spain"),
            ("EPITREND_ROLLING_WINDOW", "14"),
            ("EPITREND_OUTPUT_DIR", "build/report"),
        ]);

        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.data.source_path, PathBuf::from("input/owid.json"));
        assert!(config.data.fetch_remote);
        assert_eq!(config.data.entities, vec!["France", "Italy", "Spain"]);
        assert_eq!(config.analysis.rolling_window, 14);
        assert_eq!(config.output.figures_dir, PathBuf::from("build/report/figures"));
        assert_eq!(config.output.html_dir, PathBuf::from("build/report/html"));
    }

    #[test]
    fn test_invalid_override_is_reported() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(
            &mut config,
            lookup_from(&[("EPITREND_ROLLING_WINDOW", "seven")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("EPITREND_ROLLING_WINDOW"));
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let explicit = ConfigLoader::locate(
            lookup_from(&[(CONFIG_PATH_ENV, "custom.toml")]),
            |_| true,
        );
        assert_eq!(explicit, Some(PathBuf::from("custom.toml")));

        let probed = ConfigLoader::locate(lookup_from(&[]), |path| path == Path::new("epitrend.yml"));
        assert_eq!(probed, Some(PathBuf::from("epitrend.yml")));

        assert!(ConfigLoader::locate(lookup_from(&[]), |_| false).is_none());
    }
}
