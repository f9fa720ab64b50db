//! Kit generation
//!
//! At weaning the surviving kits of a litter are registered as individual
//! animals. The sex sequence is deterministic: all males first, then all
//! females, then unknowns. Numbering continues after the kits the litter
//! already owns so repeated runs append instead of colliding.

use serde::{Deserialize, Serialize};

use super::animal::{AnimalStatus, NewAnimal, Sex, Trigger};
use super::error::{LifecycleError, ValidationError};
use super::id::{AnimalId, LitterId};
use super::litter::Litter;

/// Bounds on how many kits one weaning may register
pub const MIN_WEANED: u32 = 1;
pub const MAX_WEANED: u32 = 50;

/// Source tag stamped on generated kits
pub const GENERATED_SOURCE: &str = "generated";

/// Request to register the weaned kits of a litter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitRequest {
    pub weaned_count: u32,
    #[serde(default)]
    pub male_count: Option<u32>,
    #[serde(default)]
    pub female_count: Option<u32>,
    #[serde(default = "default_kit_status")]
    pub status: AnimalStatus,
    #[serde(default)]
    pub tattoo_prefix: Option<String>,
}

fn default_kit_status() -> AnimalStatus {
    AnimalStatus::Growout
}

impl KitRequest {
    pub fn new(weaned_count: u32) -> Self {
        Self {
            weaned_count,
            male_count: None,
            female_count: None,
            status: default_kit_status(),
            tattoo_prefix: None,
        }
    }

    pub fn males(&self) -> u32 {
        self.male_count.unwrap_or(0)
    }

    pub fn females(&self) -> u32 {
        self.female_count.unwrap_or(0)
    }

    /// Checks request shape: weaned count range and sex counts
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_WEANED..=MAX_WEANED).contains(&self.weaned_count) {
            return Err(ValidationError::OutOfRange {
                field: "weaned_count",
                min: MIN_WEANED as i64,
                max: MAX_WEANED as i64,
                value: self.weaned_count as i64,
            });
        }
        if self.males() as u64 + self.females() as u64 > self.weaned_count as u64 {
            return Err(ValidationError::SexCountsExceedWeaned);
        }
        if self.tattoo_prefix.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ValidationError::Empty {
                field: "tattoo_prefix",
            });
        }
        Ok(())
    }

    /// Sex of every kit in registration order
    pub fn sex_sequence(&self) -> Vec<Sex> {
        let males = self.males() as usize;
        let females = self.females() as usize;
        let unknown = (self.weaned_count as usize).saturating_sub(males + females);

        std::iter::repeat(Sex::Male)
            .take(males)
            .chain(std::iter::repeat(Sex::Female).take(females))
            .chain(std::iter::repeat(Sex::Unknown).take(unknown))
            .collect()
    }

    /// Builds the kit registrations for `litter`, which already owns
    /// `existing_kits` animals.
    ///
    /// The request must already have passed [`KitRequest::validate`].
    pub fn plan(&self, litter: &Litter, existing_kits: usize) -> Result<Vec<NewAnimal>, LifecycleError> {
        if !Trigger::Register.admits(None, self.status) {
            return Err(LifecycleError::invalid(format!(
                "Kits cannot be registered with status '{}'",
                self.status
            )));
        }

        let prefix = self
            .tattoo_prefix
            .clone()
            .unwrap_or_else(|| litter.default_tattoo_prefix());

        let kits = self
            .sex_sequence()
            .into_iter()
            .enumerate()
            .map(|(i, sex)| {
                let number = existing_kits + i + 1;
                NewAnimal {
                    tattoo: kit_tattoo(&prefix, number),
                    sex,
                    status: self.status,
                    breed: None,
                    color: None,
                    birth_date: Some(litter.kindling_date),
                    source: Some(GENERATED_SOURCE.to_string()),
                    litter_id: Some(litter.litter_id),
                    notes: Some(format!(
                        "Generated from litter {} at weaning",
                        litter.litter_id
                    )),
                }
            })
            .collect();

        Ok(kits)
    }
}

/// Tattoo for the `number`-th kit: `{prefix}K{NN}`
pub fn kit_tattoo(prefix: &str, number: usize) -> String {
    format!("{}K{:02}", prefix, number)
}

/// Outcome of a kit generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedKits {
    pub litter_id: LitterId,
    pub created: usize,
    pub animal_ids: Vec<AnimalId>,
    pub tattoos: Vec<String>,
}
