//! Contest configuration: one TOML file, one section per component.
//!
//! ```toml
//! [registry]
//! path = "main.csv"
//! delimiter = "|"
//!
//! [snapshots]
//! dir = "locals"
//! file_name = "local.csv"
//!
//! [reports]
//! dir = "reports"
//! file_name = "report.md"
//!
//! [scoring]
//! start_at = "2022-11-09T10:00:00Z"
//!
//! [output]
//! leaderboard = "result/leaderboard.md"
//! ```
//!
//! Every key is optional except `scoring.start_at`, which `calculate` needs.

use chrono::{DateTime, Utc};
use crossfire_registry::{RegistryFormat, SnapshotSource};
use crossfire_score::{ReportFormat, ScoringConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "crossfire.toml";

/// Written by `crossfire init`; parses to the defaults.
pub const CONFIG_TEMPLATE: &str = r######"# crossfire contest configuration
# Relative paths resolve against this file's directory.

[registry]
path = "main.csv"
delimiter = "|"

[snapshots]
dir = "locals"
file_name = "local.csv"

[reports]
dir = "reports"
file_name = "report.md"
base_pass_sentinel = "##### All basic tests were passed"
table_start_prefix = "|-----"

[scoring]
# Round start, required by `crossfire calculate`.
# start_at = "2022-11-09T10:00:00Z"

[output]
leaderboard = "result/leaderboard.md"
# notices = "notices.jsonl"
"######;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("scoring.start_at is not set; add it to the [scoring] section")]
    MissingStartAt,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub path: PathBuf,
    #[serde(flatten)]
    pub format: RegistryFormat,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("main.csv"),
            format: RegistryFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub leaderboard: PathBuf,
    pub notices: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            leaderboard: PathBuf::from("result/leaderboard.md"),
            notices: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrossfireConfig {
    pub registry: RegistrySection,
    pub snapshots: SnapshotSource,
    pub reports: ReportFormat,
    pub scoring: ScoringConfig,
    pub output: OutputSection,
}

impl CrossfireConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `path` and resolve its relative paths against the
    /// file's directory. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "config not found; using defaults");
                Self::default()
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    message: err.to_string(),
                });
            }
        };

        let base = path.parent().unwrap_or(Path::new(""));
        Ok(config.resolved_against(base))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = &self.registry.format.delimiter;
        if delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "registry.delimiter must not be empty".to_string(),
            ));
        }
        if delimiter.contains(['\n', '\r']) || delimiter.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "registry.delimiter {delimiter:?} must not be whitespace"
            )));
        }
        if self.snapshots.file_name.is_empty() || self.reports.file_name.is_empty() {
            return Err(ConfigError::Invalid(
                "snapshots.file_name and reports.file_name must not be empty".to_string(),
            ));
        }
        if self.reports.table_start_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "reports.table_start_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.registry.path);
        resolve(&mut self.snapshots.dir);
        resolve(&mut self.reports.dir);
        resolve(&mut self.output.leaderboard);
        if let Some(notices) = self.output.notices.as_mut() {
            resolve(notices);
        }
        self
    }

    pub fn start_at(&self) -> Result<DateTime<Utc>, ConfigError> {
        self.scoring.start_at.ok_or(ConfigError::MissingStartAt)
    }
}
