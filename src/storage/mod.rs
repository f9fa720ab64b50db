//! # Storage Layer
//!
//! Persistence for rabbitry: one SQLite ledger per farm.
//!
//! ## Farm Structure
//!
//! ```text
//! .rabbitry/
//! ├── rabbitry.db           # SQLite ledger (source of truth)
//! ├── config.toml           # Farm configuration
//! └── .gitignore            # Ignores SQLite WAL files
//! ```
//!
//! ## Atomicity
//!
//! Every lifecycle operation runs in one SQLite transaction. A failure at
//! any step drops the transaction and leaves the ledger unchanged.
//!
//! ## Key Types
//!
//! - [`Farm`] - Entry point for a farm directory
//! - [`Ledger`] - Record reads and lifecycle writes
//! - [`Config`] - Farm and global configuration

mod config;
mod ledger;
mod lifecycle;
mod project;

pub use config::{Config, ConfigError, DashboardConfig, FarmConfig, GlobalConfig, KitsConfig, OutputFormat, FARM_DIR};
pub use ledger::{AnimalQuery, Ledger, StoreError, StoreResult};
pub use lifecycle::SaleReversal;
pub use project::{Farm, FarmError, LEDGER_FILE};
