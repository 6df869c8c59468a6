//! Configuration Management
//!
//! Handles persistent configuration storage for mediaback.

use crate::deploy::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the manifest directory
pub const CONF_DIR_ENV: &str = "MEDIABACK_CONF_DIR";
/// Environment variable overriding the output directory
pub const OUT_DIR_ENV: &str = "MEDIABACK_OUT_DIR";
/// Output directory when nothing else is configured
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Manifest directory (built-in manifests when unset)
    #[serde(default)]
    pub conf_dir: Option<PathBuf>,
    /// Where declarations are written
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    /// Declaration encoding
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        app_dir().map(|p| p.join("config.json"))
    }

    /// Get the log file path: beside the config file, else under
    /// `~/.mediaback`, else the working directory
    pub fn log_path() -> PathBuf {
        app_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".mediaback")))
            .unwrap_or_default()
            .join("mediaback.log")
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, defaulting on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective manifest directory (CLI > config > env)
    pub fn effective_conf_dir(&self, cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.conf_dir.clone())
            .or_else(|| env_path(CONF_DIR_ENV))
    }

    /// Get effective output directory (CLI > config > env > cdk.out)
    pub fn effective_out_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.out_dir.clone())
            .or_else(|| env_path(OUT_DIR_ENV))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }

    /// Get effective output format (CLI > config > json)
    pub fn effective_format(&self, cli: Option<OutputFormat>) -> OutputFormat {
        cli.or(self.format).unwrap_or_default()
    }

    /// Record the effective settings and save
    pub fn remember(
        &mut self,
        conf_dir: Option<PathBuf>,
        out_dir: PathBuf,
        format: OutputFormat,
    ) -> Result<()> {
        self.conf_dir = conf_dir;
        self.out_dir = Some(out_dir);
        self.format = Some(format);
        self.save()
    }
}

fn app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mediaback"))
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            conf_dir: Some(PathBuf::from("from-config")),
            out_dir: Some(PathBuf::from("out-config")),
            format: Some(OutputFormat::Yaml),
        };
        assert_eq!(
            config.effective_conf_dir(Some(Path::new("from-cli"))),
            Some(PathBuf::from("from-cli"))
        );
        assert_eq!(config.effective_out_dir(None), PathBuf::from("out-config"));
        assert_eq!(config.effective_format(Some(OutputFormat::Json)), OutputFormat::Json);
        assert_eq!(config.effective_format(None), OutputFormat::Yaml);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            conf_dir: Some(PathBuf::from("conf")),
            out_dir: None,
            format: Some(OutputFormat::Yaml),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_log_file_lives_beside_config() {
        let log = Config::log_path();
        assert!(log.ends_with("mediaback.log"));
        if let Some(config) = Config::config_path() {
            assert_eq!(log.parent(), config.parent());
        }
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
