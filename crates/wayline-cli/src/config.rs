//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use wayline_cdx::DEFAULT_EXCLUDE;

/// File-level configuration, merged under CLI flags (flags always win).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub http: HttpConfig,
    pub workers: WorkersConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout: 15 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Concurrent page fetches
    pub fetchers: usize,
    /// Concurrent record-processing workers
    pub processors: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            fetchers: 4,
            processors: cpus.min(8),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Default exclude extension list, comma-separated
    pub exclude_ext: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_ext: DEFAULT_EXCLUDE.to_string(),
        }
    }
}

impl FileConfig {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./wayline.toml (current directory)
    /// 2. ~/.config/wayline/config.toml
    ///
    /// If no config file is found, returns the defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("wayline.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "wayline") {
            let user = dirs.config_dir().join("config.toml");
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
