use crate::error::{Result, VoicelibError};
use crate::models::classify::SizeHeuristic;
use crate::models::paths::{ModelsRoot, RESERVED_FILES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ModelsConfig {
    pub root: Option<PathBuf>,
    #[serde(default = "default_reserved_files")]
    pub reserved_files: Vec<String>,
    #[serde(default = "default_payload_extension")]
    pub payload_extension: String,
    #[serde(default = "default_payload_min_bytes")]
    pub payload_min_bytes: u64,
    #[serde(default = "default_index_extension")]
    pub index_extension: String,
    #[serde(default = "default_index_min_bytes")]
    pub index_min_bytes: u64,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct DownloadConfig {
    pub dir: Option<PathBuf>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_reserved_files() -> Vec<String> {
    RESERVED_FILES.iter().map(|s| (*s).to_string()).collect()
}
fn default_payload_extension() -> String {
    "pth".to_string()
}
const fn default_payload_min_bytes() -> u64 {
    40 * 1024 * 1024
}
fn default_index_extension() -> String {
    "index".to_string()
}
const fn default_index_min_bytes() -> u64 {
    100 * 1024
}
const fn default_connect_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    format!("voicelib/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            root: None,
            reserved_files: default_reserved_files(),
            payload_extension: default_payload_extension(),
            payload_min_bytes: default_payload_min_bytes(),
            index_extension: default_index_extension(),
            index_min_bytes: default_index_min_bytes(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            VoicelibError::Config(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Catalog file location (defaults to `public_models.json` in the models root)
    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.catalog.path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.models.root_dir()?.join("public_models.json")),
        }
    }
}

impl ModelsConfig {
    /// Resolve the models root directory
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => models_data_dir(),
        }
    }

    /// Models root with the configured reserved filenames
    pub fn models_root(&self) -> Result<ModelsRoot> {
        Ok(ModelsRoot::new(self.root_dir()?).with_reserved(self.reserved_files.clone()))
    }

    /// File-role heuristic built from the configured extensions and thresholds
    #[must_use]
    pub fn heuristic(&self) -> SizeHeuristic {
        SizeHeuristic::new(
            &self.payload_extension,
            self.payload_min_bytes,
            &self.index_extension,
            self.index_min_bytes,
        )
    }
}

impl DownloadConfig {
    /// Directory where fetched archives are staged before extraction
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(dirs::config_dir)
        .ok_or_else(|| VoicelibError::Config("Could not determine config directory".to_string()))?;

    Ok(config_dir.join("voicelib").join("config.toml"))
}

/// Get default models data directory
pub fn models_data_dir() -> Result<PathBuf> {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(dirs::data_dir)
        .ok_or_else(|| VoicelibError::Config("Could not determine data directory".to_string()))?;

    Ok(data_dir.join("voicelib/models"))
}
