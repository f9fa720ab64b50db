//! rabbitry - a local-first production tracker for meat rabbit herds
//!
//! Records animals, breedings, litters, harvests, feed purchases and sales
//! in a per-farm SQLite ledger. Weaning registers kits as animals, sales
//! move animals to `sold` and back, and the reporting engine turns the
//! ledger into KPIs, monthly series and CSV exports.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Animal, AnimalId, AnimalStatus, Breeding, Harvest, Litter, Sale};
pub use storage::{Farm, Ledger};
