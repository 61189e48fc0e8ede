//! Project configuration.
//!
//! The config file (`.gtasks.yml`) lives at the repository root and tunes
//! branch names, the notes directory and the defaults of the container,
//! docs and checks tasks. Every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = ".gtasks.yml";

/// Defaults for the container tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainersConfig {
    pub image_tag: String,
    pub mlflow_version: String,
    pub mlflow_port: u16,
}

impl Default for ContainersConfig {
    fn default() -> Self {
        Self {
            image_tag: "latest".to_string(),
            mlflow_version: "v2.19.0".to_string(),
            mlflow_port: 5000,
        }
    }
}

/// Defaults for the pdoc tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub format: String,
    pub output_dir: String,
    pub port: u16,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            format: "google".to_string(),
            output_dir: "docs/".to_string(),
            port: 8088,
        }
    }
}

/// Defaults for the code check tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Folders handed to ruff and mypy, skipped when absent.
    pub folders: Vec<String>,
    pub coverage_threshold: u8,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            folders: vec!["src".to_string(), "tasks".to_string(), "tests".to_string()],
            coverage_threshold: 80,
        }
    }
}

/// Configuration loaded from `.gtasks.yml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Branch pull requests target and new branches start from.
    pub base_branch: String,
    /// Remote used for pushes.
    pub remote: String,
    /// Directory that receives experiment notes. `~` is expanded.
    pub notes_dir: String,
    /// Command used to open URLs. Platform opener when unset.
    pub browser: Option<String>,
    pub containers: ContainersConfig,
    pub docs: DocsConfig,
    pub checks: ChecksConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_branch: "main".to_string(),
            remote: "origin".to_string(),
            notes_dir: "notes".to_string(),
            browser: None,
            containers: ContainersConfig::default(),
            docs: DocsConfig::default(),
            checks: ChecksConfig::default(),
        }
    }
}

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("'{field}' must not be empty")]
    Empty { field: &'static str },
}

impl Config {
    /// Load settings from a file path.
    ///
    /// Returns the default config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let config = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Self::default(),
            Ok(content) => serde_yaml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(SettingsError::Io(e)),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.base_branch.trim().is_empty() {
            return Err(SettingsError::Empty { field: "base_branch" });
        }
        if self.remote.trim().is_empty() {
            return Err(SettingsError::Empty { field: "remote" });
        }
        if self.notes_dir.trim().is_empty() {
            return Err(SettingsError::Empty { field: "notes_dir" });
        }
        Ok(())
    }

    /// The notes directory with `~` expanded.
    pub fn notes_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.notes_dir).as_ref())
    }

    /// The command that opens a URL in the browser.
    pub fn browser_command(&self) -> &str {
        match &self.browser {
            Some(cmd) => cmd,
            None if cfg!(target_os = "macos") => "open",
            None if cfg!(windows) => "explorer",
            None => "xdg-open",
        }
    }
}
