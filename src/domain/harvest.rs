//! Harvest and feed cost records
//!
//! A harvest is the only way an animal becomes `harvested`. Feed costs are
//! free-standing expense rows used by the reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::animal::{Animal, AnimalStatus, Trigger};
use super::error::{non_negative, LifecycleError, ValidationError};
use super::id::{AnimalId, FeedCostId, HarvestId};

/// A harvest record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    pub harvest_id: HarvestId,
    pub animal_id: AnimalId,
    pub harvest_date: NaiveDate,
    #[serde(default)]
    pub live_weight_grams: Option<u32>,
    #[serde(default)]
    pub carcass_weight_grams: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Harvest {
    /// Carcass weight over live weight.
    ///
    /// Only defined when both weights were recorded and neither is zero.
    pub fn yield_ratio(&self) -> Option<f64> {
        match (self.live_weight_grams, self.carcass_weight_grams) {
            (Some(live), Some(carcass)) if live > 0 && carcass > 0 => {
                Some(carcass as f64 / live as f64)
            }
            _ => None,
        }
    }
}

/// Checks that an animal can be harvested and returns its next status
pub fn check_harvest(animal: &Animal) -> Result<AnimalStatus, LifecycleError> {
    if Trigger::Harvest.admits(Some(animal.status), AnimalStatus::Harvested) {
        Ok(AnimalStatus::Harvested)
    } else {
        Err(LifecycleError::invalid(format!(
            "Cannot harvest an animal with status '{}'",
            animal.status
        )))
    }
}

/// Request to record a harvest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHarvest {
    pub animal_id: AnimalId,
    pub harvest_date: NaiveDate,
    #[serde(default)]
    pub live_weight_grams: Option<u32>,
    #[serde(default)]
    pub carcass_weight_grams: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewHarvest {
    pub fn into_harvest(self, harvest_id: HarvestId) -> Harvest {
        Harvest {
            harvest_id,
            animal_id: self.animal_id,
            harvest_date: self.harvest_date,
            live_weight_grams: self.live_weight_grams,
            carcass_weight_grams: self.carcass_weight_grams,
            notes: self.notes,
        }
    }
}

/// Partial update for a harvest; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestPatch {
    #[serde(default)]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default)]
    pub live_weight_grams: Option<u32>,
    #[serde(default)]
    pub carcass_weight_grams: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl HarvestPatch {
    pub fn apply(&self, harvest: &Harvest) -> Harvest {
        let mut next = harvest.clone();
        if let Some(date) = self.harvest_date {
            next.harvest_date = date;
        }
        if let Some(live) = self.live_weight_grams {
            next.live_weight_grams = Some(live);
        }
        if let Some(carcass) = self.carcass_weight_grams {
            next.carcass_weight_grams = Some(carcass);
        }
        if let Some(notes) = &self.notes {
            next.notes = Some(notes.clone());
        }
        next
    }
}

/// A feed purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCost {
    pub feed_cost_id: FeedCostId,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_per_unit: Option<f64>,
    pub total_cost: f64,
}

/// Request to record a feed purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedCost {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_per_unit: Option<f64>,
    pub total_cost: f64,
}

impl NewFeedCost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("total_cost", self.total_cost)?;
        if let Some(unit) = self.cost_per_unit {
            non_negative("cost_per_unit", unit)?;
        }
        Ok(())
    }

    pub fn into_feed_cost(self, feed_cost_id: FeedCostId) -> FeedCost {
        FeedCost {
            feed_cost_id,
            date: self.date,
            description: self.description,
            cost_per_unit: self.cost_per_unit,
            total_cost: self.total_cost,
        }
    }
}
