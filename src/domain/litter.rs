//! Litter domain model
//!
//! A litter is the kindling that follows a successful breeding. Kits are
//! not tracked individually until weaning, when they are registered as
//! animals owned by the litter (see [`super::kits`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{BreedingId, LitterId};

/// A litter record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Litter {
    pub litter_id: LitterId,
    pub breeding_id: BreedingId,
    pub kindling_date: NaiveDate,
    pub born_alive: u32,
    pub born_dead: u32,
    #[serde(default)]
    pub weaned_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Litter {
    /// Weaned over born alive, as a fraction, when both are known
    pub fn survival_rate(&self) -> Option<f64> {
        match self.weaned_count {
            Some(weaned) if self.born_alive > 0 => Some(weaned as f64 / self.born_alive as f64),
            _ => None,
        }
    }

    /// Default tattoo prefix for kits registered from this litter
    pub fn default_tattoo_prefix(&self) -> String {
        format!("L{}-", self.litter_id)
    }
}

/// Request to record a litter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLitter {
    pub breeding_id: BreedingId,
    pub kindling_date: NaiveDate,
    pub born_alive: u32,
    #[serde(default)]
    pub born_dead: u32,
    #[serde(default)]
    pub weaned_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewLitter {
    pub fn into_litter(self, litter_id: LitterId) -> Litter {
        Litter {
            litter_id,
            breeding_id: self.breeding_id,
            kindling_date: self.kindling_date,
            born_alive: self.born_alive,
            born_dead: self.born_dead,
            weaned_count: self.weaned_count,
            notes: self.notes,
        }
    }
}

/// Partial update for a litter; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LitterPatch {
    #[serde(default)]
    pub kindling_date: Option<NaiveDate>,
    #[serde(default)]
    pub born_alive: Option<u32>,
    #[serde(default)]
    pub born_dead: Option<u32>,
    #[serde(default)]
    pub weaned_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LitterPatch {
    pub fn apply(&self, litter: &Litter) -> Litter {
        let mut next = litter.clone();
        if let Some(date) = self.kindling_date {
            next.kindling_date = date;
        }
        if let Some(alive) = self.born_alive {
            next.born_alive = alive;
        }
        if let Some(dead) = self.born_dead {
            next.born_dead = dead;
        }
        if let Some(weaned) = self.weaned_count {
            next.weaned_count = Some(weaned);
        }
        if let Some(notes) = &self.notes {
            next.notes = Some(notes.clone());
        }
        next
    }
}
