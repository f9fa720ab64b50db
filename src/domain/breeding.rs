//! Breeding domain model
//!
//! A breeding pairs a doe with a buck on a given date. Its `result` starts
//! out pending and is flipped to successful when a litter is recorded
//! against it.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::animal::{Animal, Sex};
use super::error::LifecycleError;
use super::id::{AnimalId, BreedingId};

/// Days from breeding to expected kindling
pub const GESTATION_DAYS: u64 = 31;

/// Outcome of a breeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BreedingResult {
    #[default]
    Pending,
    Successful,
    Missed,
}

impl BreedingResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreedingResult::Pending => "pending",
            BreedingResult::Successful => "successful",
            BreedingResult::Missed => "missed",
        }
    }
}

impl std::fmt::Display for BreedingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BreedingResult {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BreedingResult::Pending),
            "successful" => Ok(BreedingResult::Successful),
            "missed" => Ok(BreedingResult::Missed),
            _ => Err(LifecycleError::invalid(
                "result must be one of: missed, pending, successful",
            )),
        }
    }
}

/// A breeding record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breeding {
    pub breeding_id: BreedingId,
    pub doe_id: AnimalId,
    pub buck_id: AnimalId,
    pub bred_date: NaiveDate,
    pub expected_kindling: NaiveDate,
    pub result: BreedingResult,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Breeding {
    /// Returns true if the breeding references the given animal in either role
    pub fn involves(&self, animal_id: AnimalId) -> bool {
        self.doe_id == animal_id || self.buck_id == animal_id
    }
}

/// Request to record a breeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBreeding {
    pub doe_id: AnimalId,
    pub buck_id: AnimalId,
    pub bred_date: NaiveDate,
}

/// The row a validated breeding request produces
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBreeding {
    pub doe_id: AnimalId,
    pub buck_id: AnimalId,
    pub bred_date: NaiveDate,
    pub expected_kindling: NaiveDate,
    pub result: BreedingResult,
}

impl NewBreeding {
    /// Validates the pairing against the looked-up doe and buck.
    ///
    /// A missing animal and an animal of the wrong sex are both reported as
    /// an invalid pairing rather than a missing record.
    pub fn plan(
        &self,
        doe: Option<&Animal>,
        buck: Option<&Animal>,
    ) -> Result<PlannedBreeding, LifecycleError> {
        if !doe.is_some_and(|a| a.sex == Sex::Female) {
            return Err(LifecycleError::invalid(format!(
                "Invalid doe: animal {} is missing or not female",
                self.doe_id
            )));
        }
        if !buck.is_some_and(|a| a.sex == Sex::Male) {
            return Err(LifecycleError::invalid(format!(
                "Invalid buck: animal {} is missing or not male",
                self.buck_id
            )));
        }

        let kindling = expected_kindling(self.bred_date).ok_or_else(|| {
            LifecycleError::invalid(format!(
                "Bred date {} is too late to compute an expected kindling",
                self.bred_date
            ))
        })?;

        Ok(PlannedBreeding {
            doe_id: self.doe_id,
            buck_id: self.buck_id,
            bred_date: self.bred_date,
            expected_kindling: kindling,
            result: BreedingResult::Pending,
        })
    }
}

/// Expected kindling date for a breeding on `bred_date`, `None` past the calendar's end
pub fn expected_kindling(bred_date: NaiveDate) -> Option<NaiveDate> {
    bred_date.checked_add_days(Days::new(GESTATION_DAYS))
}

/// Partial update for a breeding; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreedingPatch {
    #[serde(default)]
    pub result: Option<BreedingResult>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BreedingPatch {
    pub fn apply(&self, breeding: &Breeding) -> Breeding {
        let mut next = breeding.clone();
        if let Some(result) = self.result {
            next.result = result;
        }
        if let Some(notes) = &self.notes {
            next.notes = Some(notes.clone());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal::{AnimalStatus, NewAnimal};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_animal(id: i64, sex: Sex) -> Animal {
        NewAnimal::new(format!("A{}", id), sex, AnimalStatus::Breeder).into_animal(AnimalId(id))
    }

    fn request() -> NewBreeding {
        NewBreeding {
            doe_id: AnimalId(1),
            buck_id: AnimalId(2),
            bred_date: date(2026, 1, 1),
        }
    }

    #[test]
    fn plan_sets_expected_kindling_and_pending() {
        let doe = make_animal(1, Sex::Female);
        let buck = make_animal(2, Sex::Male);

        let planned = request().plan(Some(&doe), Some(&buck)).unwrap();
        assert_eq!(planned.expected_kindling, date(2026, 2, 1));
        assert_eq!(planned.result, BreedingResult::Pending);
    }

    #[test]
    fn expected_kindling_crosses_year_end() {
        assert_eq!(expected_kindling(date(2025, 12, 15)), Some(date(2026, 1, 15)));
    }

    #[test]
    fn plan_rejects_bred_date_at_calendar_end() {
        let doe = make_animal(1, Sex::Female);
        let buck = make_animal(2, Sex::Male);
        let late = NewBreeding {
            bred_date: NaiveDate::MAX,
            ..request()
        };

        assert_eq!(expected_kindling(NaiveDate::MAX), None);
        let result = late.plan(Some(&doe), Some(&buck));
        assert!(matches!(result, Err(LifecycleError::InvalidState(_))));
    }

    #[test]
    fn plan_rejects_wrong_sexes() {
        let doe = make_animal(1, Sex::Female);
        let buck = make_animal(2, Sex::Male);
        let unknown = make_animal(3, Sex::Unknown);

        let swapped = request().plan(Some(&buck), Some(&doe));
        assert!(matches!(swapped, Err(LifecycleError::InvalidState(_))));

        let unsexed_buck = request().plan(Some(&doe), Some(&unknown));
        assert!(matches!(unsexed_buck, Err(LifecycleError::InvalidState(_))));
    }

    #[test]
    fn plan_rejects_missing_animals() {
        let buck = make_animal(2, Sex::Male);
        let result = request().plan(None, Some(&buck));
        assert!(matches!(result, Err(LifecycleError::InvalidState(_))));
    }

    #[test]
    fn result_parsing() {
        assert_eq!("missed".parse::<BreedingResult>(), Ok(BreedingResult::Missed));
        assert!(matches!(
            "aborted".parse::<BreedingResult>(),
            Err(LifecycleError::InvalidState(_))
        ));
    }

    #[test]
    fn patch_changes_only_provided_fields() {
        let breeding = Breeding {
            breeding_id: BreedingId(1),
            doe_id: AnimalId(1),
            buck_id: AnimalId(2),
            bred_date: date(2026, 1, 1),
            expected_kindling: date(2026, 2, 1),
            result: BreedingResult::Pending,
            notes: Some("first pairing".to_string()),
        };

        let missed = BreedingPatch {
            result: Some(BreedingResult::Missed),
            notes: None,
        }
        .apply(&breeding);
        assert_eq!(missed.result, BreedingResult::Missed);
        assert_eq!(missed.notes.as_deref(), Some("first pairing"));

        let noted = BreedingPatch {
            result: None,
            notes: Some("palpated negative".to_string()),
        }
        .apply(&breeding);
        assert_eq!(noted.result, BreedingResult::Pending);
        assert_eq!(noted.notes.as_deref(), Some("palpated negative"));
    }
}
