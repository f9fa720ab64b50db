//! Animal domain model
//!
//! Animals are the individual rabbits in the herd: breeders bought in or
//! kept back, and kits registered from a litter at weaning. An animal's
//! `status` moves through a small state machine whose edges are owned by
//! specific operations (harvest, sale, death recording).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LifecycleError;
use super::id::{AnimalId, BreedingId, HarvestId, LitterId};

/// Sex of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "U",
        }
    }

    /// Returns true if the sex has been determined
    pub fn is_known(&self) -> bool {
        !matches!(self, Sex::Unknown)
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Sex::Male),
            "F" | "f" => Ok(Sex::Female),
            "U" | "u" => Ok(Sex::Unknown),
            other => Err(LifecycleError::invalid(format!(
                "sex must be one of: F, M, U (got '{}')",
                other
            ))),
        }
    }
}

/// Lifecycle status of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    Breeder,
    Growout,
    Sold,
    Harvested,
    Deceased,
}

impl AnimalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Breeder => "breeder",
            AnimalStatus::Growout => "growout",
            AnimalStatus::Sold => "sold",
            AnimalStatus::Harvested => "harvested",
            AnimalStatus::Deceased => "deceased",
        }
    }

    /// Returns true for the end-of-life statuses no sale can follow
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnimalStatus::Harvested | AnimalStatus::Deceased)
    }

    /// Returns all valid status values
    pub fn all() -> &'static [AnimalStatus] {
        &[
            AnimalStatus::Breeder,
            AnimalStatus::Growout,
            AnimalStatus::Sold,
            AnimalStatus::Harvested,
            AnimalStatus::Deceased,
        ]
    }
}

impl std::fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnimalStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimalStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                LifecycleError::invalid(format!(
                    "status must be one of: breeder, deceased, growout, harvested, sold (got '{}')",
                    s.trim()
                ))
            })
    }
}

/// The operation asking for a status change
///
/// Each status edge belongs to exactly one trigger; [`Trigger::admits`] is
/// the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Creating an animal record by hand or via kit generation
    Register,
    /// The generic status update
    StatusUpdate,
    /// Recording a harvest
    Harvest,
    /// Recording a sale (animal or whole litter)
    Sale,
    /// Deleting a sale
    SaleReversal,
}

impl Trigger {
    /// Returns true if `trigger` may move an animal from `from` to `to`.
    /// `from` is `None` when the animal is being created.
    pub fn admits(self, from: Option<AnimalStatus>, to: AnimalStatus) -> bool {
        use AnimalStatus::*;

        match self {
            Trigger::Register => from.is_none() && matches!(to, Breeder | Growout | Sold),
            Trigger::StatusUpdate => from.is_some() && !matches!(to, Harvested),
            Trigger::Harvest => from.is_some() && matches!(to, Harvested),
            Trigger::Sale => matches!(from, Some(Breeder | Growout | Sold)) && to == Sold,
            Trigger::SaleReversal => from == Some(Sold) && matches!(to, Breeder | Growout),
        }
    }
}

/// An animal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub animal_id: AnimalId,

    /// Unique tattoo stamped on the animal
    pub tattoo: String,

    pub sex: Sex,
    pub status: AnimalStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    /// Where the animal came from ("generated" for kits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Owning litter for kits
    #[serde(default)]
    pub litter_id: Option<LitterId>,

    #[serde(default)]
    pub death_date: Option<NaiveDate>,

    #[serde(default)]
    pub death_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Animal {
    /// Returns true if this animal was registered from a litter
    pub fn is_kit(&self) -> bool {
        self.litter_id.is_some()
    }

    /// Age in whole days on the given date, if the birth date is known
    pub fn age_on(&self, date: NaiveDate) -> Option<i64> {
        self.birth_date.map(|born| (date - born).num_days())
    }

    /// Applies a generic status update.
    ///
    /// Harvesting is refused here; it has its own operation. Moving to
    /// `deceased` stamps the death date (defaulting to `today`) and reason,
    /// any other status clears both.
    pub fn apply_status_change(
        &self,
        change: &StatusChange,
        today: NaiveDate,
    ) -> Result<Animal, LifecycleError> {
        if !Trigger::StatusUpdate.admits(Some(self.status), change.status) {
            return Err(LifecycleError::invalid(
                "Use the harvest operation to mark an animal harvested",
            ));
        }

        let mut next = self.clone();
        next.status = change.status;

        if change.status == AnimalStatus::Deceased {
            next.death_date = Some(change.death_date.unwrap_or(today));
            next.death_reason = change.death_reason.clone();
        } else {
            next.death_date = None;
            next.death_reason = None;
        }

        Ok(next)
    }

    /// Status to restore when the sale of this animal is deleted.
    ///
    /// The store does not keep pre-sale status, so this guesses: a sexed
    /// animal with no owning litter was a breeder, anything else was growout.
    pub fn status_after_sale_reversal(&self) -> AnimalStatus {
        if self.sex.is_known() && self.litter_id.is_none() {
            AnimalStatus::Breeder
        } else {
            AnimalStatus::Growout
        }
    }
}

/// Records that still point at an animal and block its deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimalReferences {
    pub breeding: Option<BreedingId>,
    pub harvest: Option<HarvestId>,
}

impl AnimalReferences {
    /// Fails with a conflict naming the first blocking record
    pub fn check_deletable(&self, animal_id: AnimalId) -> Result<(), LifecycleError> {
        if let Some(breeding) = self.breeding {
            return Err(LifecycleError::conflict(format!(
                "Animal {} is referenced by breeding {}. Remove or reassign the breeding first.",
                animal_id, breeding
            )));
        }
        if let Some(harvest) = self.harvest {
            return Err(LifecycleError::conflict(format!(
                "Animal {} has a harvest record ({}). Delete the harvest first.",
                animal_id, harvest
            )));
        }
        Ok(())
    }
}

/// Fields for a new animal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnimal {
    pub tattoo: String,
    pub sex: Sex,
    pub status: AnimalStatus,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub litter_id: Option<LitterId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAnimal {
    /// Creates a minimal registration with only the required fields
    pub fn new(tattoo: impl Into<String>, sex: Sex, status: AnimalStatus) -> Self {
        Self {
            tattoo: tattoo.into(),
            sex,
            status,
            breed: None,
            color: None,
            birth_date: None,
            source: None,
            litter_id: None,
            notes: None,
        }
    }

    /// Checks the registration against the lifecycle rules.
    ///
    /// `harvested` and `deceased` are only reachable through their own
    /// operations, never as an initial status.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.tattoo.trim().is_empty() {
            return Err(LifecycleError::invalid("tattoo cannot be empty"));
        }
        if !Trigger::Register.admits(None, self.status) {
            return Err(LifecycleError::invalid(format!(
                "Cannot create an animal with status '{}'; record a harvest or death instead",
                self.status
            )));
        }
        Ok(())
    }

    /// Materializes the record once the store has assigned an id
    pub fn into_animal(self, animal_id: AnimalId) -> Animal {
        Animal {
            animal_id,
            tattoo: self.tattoo,
            sex: self.sex,
            status: self.status,
            breed: self.breed,
            color: self.color,
            birth_date: self.birth_date,
            source: self.source,
            litter_id: self.litter_id,
            death_date: None,
            death_reason: None,
            notes: self.notes,
        }
    }
}

/// A generic status update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: AnimalStatus,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_reason: Option<String>,
}

impl StatusChange {
    pub fn to(status: AnimalStatus) -> Self {
        Self {
            status,
            death_date: None,
            death_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_animal(sex: Sex, status: AnimalStatus) -> Animal {
        NewAnimal::new("D1", sex, status).into_animal(AnimalId(1))
    }

    #[test]
    fn status_parsing_is_closed() {
        assert_eq!("growout".parse::<AnimalStatus>(), Ok(AnimalStatus::Growout));
        assert_eq!("Sold".parse::<AnimalStatus>(), Ok(AnimalStatus::Sold));
        assert!(matches!(
            "retired".parse::<AnimalStatus>(),
            Err(LifecycleError::InvalidState(_))
        ));
        assert!("X".parse::<Sex>().is_err());
    }

    #[test]
    fn registration_rejects_terminal_statuses() {
        for status in [AnimalStatus::Harvested, AnimalStatus::Deceased] {
            let err = NewAnimal::new("BAD", Sex::Unknown, status)
                .validate()
                .unwrap_err();
            assert!(matches!(err, LifecycleError::InvalidState(_)));
        }

        for status in [AnimalStatus::Breeder, AnimalStatus::Growout, AnimalStatus::Sold] {
            assert!(NewAnimal::new("OK", Sex::Female, status).validate().is_ok());
        }
    }

    #[test]
    fn registration_rejects_blank_tattoo() {
        let err = NewAnimal::new("  ", Sex::Male, AnimalStatus::Breeder)
            .validate()
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidState(_)));
    }

    #[test]
    fn status_update_cannot_harvest() {
        let animal = make_animal(Sex::Unknown, AnimalStatus::Growout);
        let result =
            animal.apply_status_change(&StatusChange::to(AnimalStatus::Harvested), date(2026, 1, 1));
        assert!(matches!(result, Err(LifecycleError::InvalidState(_))));
    }

    #[test]
    fn deceased_stamps_death_fields() {
        let animal = make_animal(Sex::Unknown, AnimalStatus::Growout);
        let change = StatusChange {
            status: AnimalStatus::Deceased,
            death_date: Some(date(2026, 2, 1)),
            death_reason: Some("illness".to_string()),
        };

        let next = animal.apply_status_change(&change, date(2026, 3, 1)).unwrap();
        assert_eq!(next.status, AnimalStatus::Deceased);
        assert_eq!(next.death_date, Some(date(2026, 2, 1)));
        assert_eq!(next.death_reason.as_deref(), Some("illness"));
    }

    #[test]
    fn deceased_defaults_death_date_to_today() {
        let animal = make_animal(Sex::Female, AnimalStatus::Breeder);
        let next = animal
            .apply_status_change(&StatusChange::to(AnimalStatus::Deceased), date(2026, 3, 1))
            .unwrap();
        assert_eq!(next.death_date, Some(date(2026, 3, 1)));
        assert!(next.death_reason.is_none());
    }

    #[test]
    fn leaving_deceased_clears_death_fields() {
        let mut animal = make_animal(Sex::Female, AnimalStatus::Deceased);
        animal.death_date = Some(date(2026, 1, 5));
        animal.death_reason = Some("heat".to_string());

        let next = animal
            .apply_status_change(&StatusChange::to(AnimalStatus::Breeder), date(2026, 3, 1))
            .unwrap();
        assert_eq!(next.status, AnimalStatus::Breeder);
        assert!(next.death_date.is_none());
        assert!(next.death_reason.is_none());
    }

    #[test]
    fn transition_table_edges() {
        use AnimalStatus::*;

        assert!(Trigger::Harvest.admits(Some(Growout), Harvested));
        assert!(!Trigger::Harvest.admits(None, Harvested));
        assert!(Trigger::Sale.admits(Some(Breeder), Sold));
        assert!(!Trigger::Sale.admits(Some(Harvested), Sold));
        assert!(!Trigger::Sale.admits(Some(Deceased), Sold));
        assert!(Trigger::StatusUpdate.admits(Some(Harvested), Deceased));
        assert!(Trigger::SaleReversal.admits(Some(Sold), Growout));
        assert!(!Trigger::SaleReversal.admits(Some(Deceased), Growout));
    }

    #[test]
    fn sale_reversal_guess() {
        let breeder = make_animal(Sex::Female, AnimalStatus::Sold);
        assert_eq!(breeder.status_after_sale_reversal(), AnimalStatus::Breeder);

        let unsexed = make_animal(Sex::Unknown, AnimalStatus::Sold);
        assert_eq!(unsexed.status_after_sale_reversal(), AnimalStatus::Growout);

        let mut kit = make_animal(Sex::Male, AnimalStatus::Sold);
        kit.litter_id = Some(LitterId(3));
        assert_eq!(kit.status_after_sale_reversal(), AnimalStatus::Growout);
    }

    #[test]
    fn references_block_deletion() {
        assert!(AnimalReferences::default().check_deletable(AnimalId(1)).is_ok());

        let refs = AnimalReferences {
            breeding: Some(BreedingId(4)),
            harvest: Some(HarvestId(2)),
        };
        let err = refs.check_deletable(AnimalId(1)).unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict(_)));
        assert!(err.to_string().contains("breeding 4"));

        let refs = AnimalReferences {
            harvest: Some(HarvestId(2)),
            ..Default::default()
        };
        assert!(refs.check_deletable(AnimalId(1)).unwrap_err().to_string().contains("harvest record (2)"));
    }

    #[test]
    fn age_on_date() {
        let mut animal = make_animal(Sex::Male, AnimalStatus::Growout);
        assert_eq!(animal.age_on(date(2026, 4, 10)), None);

        animal.birth_date = Some(date(2026, 2, 1));
        assert_eq!(animal.age_on(date(2026, 4, 10)), Some(68));
    }
}
