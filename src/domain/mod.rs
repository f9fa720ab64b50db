//! Domain models for rabbitry
//!
//! Contains the lifecycle rules, kit generation and reporting without any
//! I/O concerns. The storage layer loads records, asks these types what to
//! write, and applies the answer in one transaction.

mod animal;
mod breeding;
mod error;
mod harvest;
mod id;
mod kits;
mod litter;
mod sale;

pub mod export;
pub mod report;
pub mod todo;

pub use animal::{Animal, AnimalReferences, AnimalStatus, NewAnimal, Sex, StatusChange, Trigger};
pub use breeding::{expected_kindling, Breeding, BreedingPatch, BreedingResult, NewBreeding, PlannedBreeding, GESTATION_DAYS};
pub use error::{non_negative, LifecycleError, ValidationError};
pub use harvest::{check_harvest, FeedCost, Harvest, HarvestPatch, NewFeedCost, NewHarvest};
pub use id::{AnimalId, BreedingId, FeedCostId, HarvestId, IdError, LitterId, SaleId};
pub use kits::{kit_tattoo, GeneratedKits, KitRequest, GENERATED_SOURCE, MAX_WEANED, MIN_WEANED};
pub use litter::{Litter, LitterPatch, NewLitter};
pub use sale::{check_animal_sale, plan_litter_sale, plan_sale_reversal, NewSale, Sale, SaleRequest, SaleTarget};
