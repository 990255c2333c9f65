//! User configuration: an optional YAML file plus environment overrides.
//!
//! Lookup order for the file is `$DEVKIT_CONFIG`, then
//! `$HOME/.config/devkit/config.yaml`. A missing default file is not an
//! error; a missing `$DEVKIT_CONFIG` file is.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::adapters::live::shell::DEFAULT_SHELL;
use crate::runner::DEFAULT_PREVIEW_BYTES;

/// Names the config file explicitly.
pub const CONFIG_ENV_VAR: &str = "DEVKIT_CONFIG";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but cannot be read.
    #[error("cannot read config file '{}': {source}", .path.display())]
    Read {
        /// The config file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        /// The config file.
        path: PathBuf,
        /// The YAML error.
        source: serde_yaml::Error,
    },

    /// `log_level` is not a recognised level.
    #[error("invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    InvalidLevel(String),

    /// A required value was not supplied.
    #[error("{0}")]
    Missing(String),

    /// A supplied value is unusable.
    #[error("{0}")]
    Invalid(String),

    /// `HOME` is needed to derive a default path but is not set.
    #[error("HOME environment variable is not set")]
    HomeNotSet,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Parent of the per-invocation output directories.
    pub output_root: PathBuf,
    /// Minimum level written to the log file.
    pub log_level: String,
    /// Shell that interprets command strings.
    pub shell: String,
    /// Bytes of each capture file copied into the log.
    pub log_preview_bytes: usize,
    /// Where `ssh-key` writes keys. Defaults to `$HOME/.ssh`.
    pub ssh_dir: Option<PathBuf>,
    /// Shell commands run in order by `start-of-day`.
    pub start_of_day: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("/tmp/devkit"),
            log_level: "info".to_string(),
            shell: DEFAULT_SHELL.to_string(),
            log_preview_bytes: DEFAULT_PREVIEW_BYTES,
            ssh_dir: None,
            start_of_day: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting log level is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match config_path(&env) {
            Some((path, required)) if required || path.is_file() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(&env);
        config.level_filter()?;
        Ok(config)
    }

    /// Parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Parses config YAML. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document does not match the schema.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Applies `DEVKIT_OUTPUT_ROOT`, `DEVKIT_LOG_LEVEL` and `DEVKIT_SHELL`.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(root) = env("DEVKIT_OUTPUT_ROOT").filter(|v| !v.is_empty()) {
            self.output_root = PathBuf::from(root);
        }
        if let Some(level) = env("DEVKIT_LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        if let Some(shell) = env("DEVKIT_SHELL").filter(|v| !v.is_empty()) {
            self.shell = shell;
        }
    }

    /// The configured log level.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLevel` for anything but the standard
    /// level names.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLevel(self.log_level.clone()))
    }

    /// The directory that receives SSH keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HomeNotSet` if no `ssh_dir` is configured and
    /// `HOME` is unset.
    pub fn ssh_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.ssh_dir {
            return Ok(dir.clone());
        }
        home_dir().map(|home| home.join(".ssh"))
    }
}

fn config_path(env: &impl Fn(&str) -> Option<String>) -> Option<(PathBuf, bool)> {
    if let Some(path) = env(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some((PathBuf::from(path), true));
    }
    env("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| (Path::new(&home).join(".config").join("devkit").join("config.yaml"), false))
}

fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeNotSet)
}
