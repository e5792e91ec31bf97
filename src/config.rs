// Configuration file handling and report directory resolution

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory; takes precedence over FLOWBDD_BASE_DIR
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Data directory name under the base directory
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Human-readable report directory name under the base directory
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            data_dir: default_data_dir(),
            report_dir: default_report_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Extra renderings written next to the JSON data (markdown, junit)
    #[serde(default)]
    pub formats: Vec<String>,

    /// Print a summary to stdout when a run finishes
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            console: default_console(),
        }
    }
}

// Default values
pub const ENV_FLOWBDD_BASE_DIR: &str = "FLOWBDD_BASE_DIR";
pub const DEFAULT_BASE_NAME: &str = "flowbdd";
pub const INDEX_FILE: &str = "index.json";

pub fn default_data_dir() -> String {
    String::from("data")
}

pub fn default_report_dir() -> String {
    String::from("report")
}

fn default_console() -> bool {
    true
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .flowbddrc.toml (current directory)
        // 2. ~/.flowbddrc.toml (home directory)
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(".flowbddrc.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".flowbddrc.toml"));
        }

        paths
            .iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let config = Self::parse(&content);
        if config.is_none() {
            warn!("Ignoring malformed configuration file {}", path.display());
        }
        config
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}

/// Where the base directory came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDirSource {
    Override,
    ConfigFile,
    Environment,
    TempDir,
}

impl fmt::Display for BaseDirSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseDirSource::Override => "command line override",
            BaseDirSource::ConfigFile => "configuration file",
            BaseDirSource::Environment => ENV_FLOWBDD_BASE_DIR,
            BaseDirSource::TempDir => "temporary directory",
        };
        f.write_str(name)
    }
}

/// Resolved report locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub base: PathBuf,
    pub data: PathBuf,
    pub report: PathBuf,
    pub source: BaseDirSource,
}

impl ReportPaths {
    /// Resolve against the real process environment.
    ///
    /// Precedence: explicit override, configuration file, `FLOWBDD_BASE_DIR`,
    /// then `<temp>/flowbdd`.
    pub fn resolve(override_dir: Option<&Path>, paths: &PathsConfig) -> Self {
        Self::resolve_with(override_dir, paths, |key| std::env::var_os(key))
    }

    pub fn resolve_with<F>(override_dir: Option<&Path>, paths: &PathsConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let (base, source) = if let Some(dir) = override_dir {
            (dir.to_path_buf(), BaseDirSource::Override)
        } else if let Some(dir) = &paths.base_dir {
            (dir.clone(), BaseDirSource::ConfigFile)
        } else if let Some(dir) = env(ENV_FLOWBDD_BASE_DIR).filter(|v| !v.is_empty()) {
            (PathBuf::from(dir), BaseDirSource::Environment)
        } else {
            (
                std::env::temp_dir().join(DEFAULT_BASE_NAME),
                BaseDirSource::TempDir,
            )
        };

        Self {
            data: base.join(&paths.data_dir),
            report: base.join(&paths.report_dir),
            base,
            source,
        }
    }

    /// Paths rooted at `base` with the default sub-directories
    pub fn at(base: impl Into<PathBuf>) -> Self {
        let base: PathBuf = base.into();
        Self::resolve_with(Some(base.as_path()), &PathsConfig::default(), |_| None)
    }

    pub fn index_file(&self) -> PathBuf {
        self.data.join(INDEX_FILE)
    }
}
