//! Dashboard to-do list
//!
//! Three work queues derived from the herd as of a given day: litters about
//! to kindle, litters old enough to wean that have no kits registered, and
//! growouts old enough to harvest.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::animal::AnimalStatus;
use super::breeding::BreedingResult;
use super::error::ValidationError;
use super::id::{AnimalId, BreedingId, LitterId};
use super::report::Snapshot;

/// Tunables for the to-do queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoParams {
    pub kindling_window_days: u32,
    pub wean_age_days: u32,
    pub harvest_age_days: u32,
    pub limit: u32,
}

impl Default for TodoParams {
    fn default() -> Self {
        Self {
            kindling_window_days: 7,
            wean_age_days: 42,
            harvest_age_days: 84,
            limit: 25,
        }
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), ValidationError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: 1,
            max: max as i64,
            value: value as i64,
        })
    }
}

impl TodoParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("kindling_window_days", self.kindling_window_days, 60)?;
        check_range("wean_age_days", self.wean_age_days, 120)?;
        check_range("harvest_age_days", self.harvest_age_days, 200)?;
        check_range("limit", self.limit, 200)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindlingDue {
    pub breeding_id: BreedingId,
    pub doe_tattoo: String,
    pub buck_tattoo: String,
    pub bred_date: NaiveDate,
    pub expected_kindling: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaningDue {
    pub litter_id: LitterId,
    pub breeding_id: BreedingId,
    pub kindling_date: NaiveDate,
    pub age_days: i64,
    pub born_alive: u32,
    pub weaned_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestReady {
    pub animal_id: AnimalId,
    pub tattoo: String,
    pub birth_date: NaiveDate,
    pub age_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub as_of: NaiveDate,
    pub params: TodoParams,
    pub kindlings_due: Vec<KindlingDue>,
    pub weanings_due: Vec<WeaningDue>,
    pub harvest_ready: Vec<HarvestReady>,
}

impl Todo {
    pub fn is_empty(&self) -> bool {
        self.kindlings_due.is_empty() && self.weanings_due.is_empty() && self.harvest_ready.is_empty()
    }
}

/// Builds the to-do queues as of `today`. Each queue is sorted oldest
/// first and capped at `params.limit`.
pub fn build(snapshot: &Snapshot, params: TodoParams, today: NaiveDate) -> Todo {
    let limit = params.limit as usize;
    let tattoo = |id: AnimalId| {
        snapshot
            .animals
            .iter()
            .find(|a| a.animal_id == id)
            .map(|a| a.tattoo.clone())
            .unwrap_or_else(|| format!("ID {}", id))
    };

    let kindling_end = today + Duration::days(params.kindling_window_days as i64);
    let mut due: Vec<_> = snapshot
        .breedings
        .iter()
        .filter(|b| b.result == BreedingResult::Pending)
        .filter(|b| b.expected_kindling >= today && b.expected_kindling <= kindling_end)
        .collect();
    due.sort_by_key(|b| (b.expected_kindling, b.breeding_id));
    let kindlings_due = due
        .into_iter()
        .take(limit)
        .map(|b| KindlingDue {
            breeding_id: b.breeding_id,
            doe_tattoo: tattoo(b.doe_id),
            buck_tattoo: tattoo(b.buck_id),
            bred_date: b.bred_date,
            expected_kindling: b.expected_kindling,
        })
        .collect();

    let mut kits_by_litter: HashMap<LitterId, usize> = HashMap::new();
    for litter_id in snapshot.animals.iter().filter_map(|a| a.litter_id) {
        *kits_by_litter.entry(litter_id).or_default() += 1;
    }
    let wean_cutoff = today - Duration::days(params.wean_age_days as i64);
    let mut weanable: Vec<_> = snapshot
        .litters
        .iter()
        .filter(|l| l.kindling_date <= wean_cutoff)
        .filter(|l| !kits_by_litter.contains_key(&l.litter_id))
        .collect();
    weanable.sort_by_key(|l| (l.kindling_date, l.litter_id));
    let weanings_due = weanable
        .into_iter()
        .take(limit)
        .map(|l| WeaningDue {
            litter_id: l.litter_id,
            breeding_id: l.breeding_id,
            kindling_date: l.kindling_date,
            age_days: (today - l.kindling_date).num_days(),
            born_alive: l.born_alive,
            weaned_count: l.weaned_count,
        })
        .collect();

    let harvest_cutoff = today - Duration::days(params.harvest_age_days as i64);
    let mut ready: Vec<_> = snapshot
        .animals
        .iter()
        .filter(|a| a.status == AnimalStatus::Growout)
        .filter_map(|a| a.birth_date.map(|born| (a, born)))
        .filter(|(_, born)| *born <= harvest_cutoff)
        .collect();
    ready.sort_by_key(|(a, born)| (*born, a.animal_id));
    let harvest_ready = ready
        .into_iter()
        .take(limit)
        .map(|(a, born)| HarvestReady {
            animal_id: a.animal_id,
            tattoo: a.tattoo.clone(),
            birth_date: born,
            age_days: (today - born).num_days(),
        })
        .collect();

    Todo {
        as_of: today,
        params,
        kindlings_due,
        weanings_due,
        harvest_ready,
    }
}
