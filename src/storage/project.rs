//! Farm management
//!
//! Handles farm initialization and opens the ledger.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::FARM_DIR;
use super::{Config, Ledger};

/// File name of the ledger database inside `.rabbitry/`
pub const LEDGER_FILE: &str = "rabbitry.db";

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("Not in a rabbitry farm. Run 'rabbitry init' first.")]
    NotInFarm,
}

const DEFAULT_CONFIG: &str = r#"# rabbitry farm configuration

[dashboard]
# Days ahead to list expected kindlings
kindling_window_days = 7
# Litter age (days) at which weaning is due
wean_age_days = 42
# Growout age (days) at which harvest is due
harvest_age_days = 84
# Maximum entries per to-do list
limit = 25

[kits]
# Status for kits registered at weaning
default_status = "growout"
"#;

/// A farm directory holding the ledger and its configuration
pub struct Farm {
    root: PathBuf,
    config: Config,
}

impl Farm {
    /// Opens an existing farm at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(FARM_DIR).is_dir() {
            return Err(FarmError::NotInFarm.into());
        }

        let config = Config::for_farm(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the farm at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_farm_root().ok_or(FarmError::NotInFarm)?;

        Self::open(root)
    }

    /// Initializes a farm at the given path. Existing files are kept.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let farm_dir = root.join(FARM_DIR);

        fs::create_dir_all(&farm_dir).with_context(|| {
            format!("Failed to create {} directory: {}", FARM_DIR, farm_dir.display())
        })?;

        let config_path = farm_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = farm_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "# SQLite write-ahead files\n*.db-wal\n*.db-shm\n")
                .with_context(|| {
                    format!("Failed to write .gitignore: {}", gitignore_path.display())
                })?;
        }

        let farm = Self::open(root)?;
        farm.ledger()?;

        Ok(farm)
    }

    /// Returns the farm root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .rabbitry directory path
    pub fn farm_dir(&self) -> PathBuf {
        self.root.join(FARM_DIR)
    }

    /// Returns the ledger database path
    pub fn ledger_path(&self) -> PathBuf {
        self.farm_dir().join(LEDGER_FILE)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the farm's ledger
    pub fn ledger(&self) -> Result<Ledger> {
        let path = self.ledger_path();
        Ledger::open(&path).with_context(|| format!("Failed to open ledger: {}", path.display()))
    }
}
