//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Farm setup | `init` |
//! | Herd | Animal records | `animal add`, `animal list`, `animal status` |
//! | Production | Pairings to carcass | `breeding add`, `litter add`, `litter wean`, `harvest add` |
//! | Money | Costs and sales | `feed add`, `sale add`, `sale delete` |
//! | Reports | KPIs and exports | `report summary`, `report export`, `metrics`, `todo` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Ledger Selection
//!
//! Commands use the ledger of the enclosing farm (`.rabbitry/rabbitry.db`).
//! `--db <path>` or `RABBITRY_DB` points at another database file.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! rabbitry --verbose todo
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod animal;
mod breeding;
mod harvest;
mod litter;
mod report;
mod sale;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
