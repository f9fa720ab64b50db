//! Configuration handling for rabbitry
//!
//! Configuration is stored in `.rabbitry/config.toml` (farm) and
//! `~/.config/rabbitry/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::todo::TodoParams;
use crate::domain::AnimalStatus;

/// Name of the per-farm directory
pub const FARM_DIR: &str = ".rabbitry";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Defaults for the dashboard to-do queues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Days ahead to look for expected kindlings
    pub kindling_window_days: u32,

    /// Litter age in days at which weaning is due
    pub wean_age_days: u32,

    /// Growout age in days at which harvest is due
    pub harvest_age_days: u32,

    /// Maximum entries per queue
    pub limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let params = TodoParams::default();
        Self {
            kindling_window_days: params.kindling_window_days,
            wean_age_days: params.wean_age_days,
            harvest_age_days: params.harvest_age_days,
            limit: params.limit,
        }
    }
}

impl DashboardConfig {
    pub fn params(&self) -> TodoParams {
        TodoParams {
            kindling_window_days: self.kindling_window_days,
            wean_age_days: self.wean_age_days,
            harvest_age_days: self.harvest_age_days,
            limit: self.limit,
        }
    }
}

/// Defaults for kit generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KitsConfig {
    /// Status given to generated kits when none is requested
    pub default_status: AnimalStatus,
}

impl Default for KitsConfig {
    fn default() -> Self {
        Self {
            default_status: AnimalStatus::Growout,
        }
    }
}

/// Farm-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FarmConfig {
    /// Dashboard to-do settings
    pub dashboard: DashboardConfig,

    /// Kit generation settings
    pub kits: KitsConfig,
}

impl FarmConfig {
    /// Rejects values the dashboard would refuse
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dashboard
            .params()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[dashboard] {}", e)))?;

        if self.kits.default_status.is_terminal() {
            return Err(ConfigError::Invalid(format!(
                "[kits] default_status cannot be '{}'",
                self.kits.default_status
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + farm)
#[derive(Debug, Clone)]
pub struct Config {
    pub farm: FarmConfig,
    pub global: GlobalConfig,
    pub farm_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let farm_root = Self::find_farm_root();
        let farm = match &farm_root {
            Some(root) => Self::load_farm_config(root)?,
            None => FarmConfig::default(),
        };

        Ok(Self {
            farm,
            global,
            farm_root,
        })
    }

    /// Loads configuration for a specific farm
    pub fn for_farm(farm_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let farm = Self::load_farm_config(farm_root)?;

        Ok(Self {
            farm,
            global,
            farm_root: Some(farm_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rabbitry", "rabbitry").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads farm configuration from a specific root
    fn load_farm_config(farm_root: &Path) -> Result<FarmConfig> {
        let config_path = farm_root.join(FARM_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(FarmConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read farm config: {}", config_path.display()))?;

        let config: FarmConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse farm config")?;
        config.validate()?;

        Ok(config)
    }

    /// Finds the farm root by looking for `.rabbitry/` from the current directory up
    pub fn find_farm_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_farm_root_from(&current)
    }

    /// Finds the farm root by looking for `.rabbitry/` from `start` up
    pub fn find_farm_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(FARM_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're inside a farm directory
    pub fn is_in_farm(&self) -> bool {
        self.farm_root.is_some()
    }

    /// Returns the farm root, or an error if not in a farm
    pub fn require_farm_root(&self) -> Result<&Path> {
        self.farm_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a rabbitry farm. Run 'rabbitry init' first."))
    }
}
