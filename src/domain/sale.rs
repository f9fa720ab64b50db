//! Sale domain model
//!
//! A sale disposes of either one animal or every kit a litter owns. The
//! target is a closed enum so a sale can never reference both or neither.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::animal::{Animal, AnimalStatus, Trigger};
use super::error::{non_negative, LifecycleError, ValidationError};
use super::id::{AnimalId, LitterId, SaleId};

/// What a sale disposes of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleTarget {
    Animal(AnimalId),
    Litter(LitterId),
}

impl SaleTarget {
    /// Builds the target from the two optional request fields
    pub fn from_parts(
        animal_id: Option<AnimalId>,
        litter_id: Option<LitterId>,
    ) -> Result<Self, ValidationError> {
        match (animal_id, litter_id) {
            (Some(animal), None) => Ok(SaleTarget::Animal(animal)),
            (None, Some(litter)) => Ok(SaleTarget::Litter(litter)),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousSaleTarget),
            (None, None) => Err(ValidationError::MissingSaleTarget),
        }
    }

    pub fn animal_id(&self) -> Option<AnimalId> {
        match self {
            SaleTarget::Animal(id) => Some(*id),
            SaleTarget::Litter(_) => None,
        }
    }

    pub fn litter_id(&self) -> Option<LitterId> {
        match self {
            SaleTarget::Animal(_) => None,
            SaleTarget::Litter(id) => Some(*id),
        }
    }
}

/// A sale record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: SaleId,
    pub target: SaleTarget,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to record a sale, as received from the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub animal_id: Option<AnimalId>,
    #[serde(default)]
    pub litter_id: Option<LitterId>,
}

/// A sale request that passed shape validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub target: SaleTarget,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    pub buyer_name: Option<String>,
    pub buyer_contact: Option<String>,
    pub notes: Option<String>,
}

impl SaleRequest {
    pub fn validate(self) -> Result<NewSale, ValidationError> {
        let target = SaleTarget::from_parts(self.animal_id, self.litter_id)?;
        let sale_price = non_negative("sale_price", self.sale_price)?;

        Ok(NewSale {
            target,
            sale_date: self.sale_date,
            sale_price,
            buyer_name: self.buyer_name,
            buyer_contact: self.buyer_contact,
            notes: self.notes,
        })
    }
}

impl NewSale {
    pub fn into_sale(self, sale_id: SaleId) -> Sale {
        Sale {
            sale_id,
            target: self.target,
            sale_date: self.sale_date,
            sale_price: self.sale_price,
            buyer_name: self.buyer_name,
            buyer_contact: self.buyer_contact,
            notes: self.notes,
        }
    }
}

/// Checks that a single animal can be sold
pub fn check_animal_sale(animal: &Animal) -> Result<(), LifecycleError> {
    if Trigger::Sale.admits(Some(animal.status), AnimalStatus::Sold) {
        Ok(())
    } else {
        Err(LifecycleError::invalid(format!(
            "Cannot sell an animal with status '{}'",
            animal.status
        )))
    }
}

/// Checks that every kit of a litter can be sold.
///
/// Returns the ids to mark sold. Fails if no kits were generated yet or if
/// any kit is already harvested or deceased, naming the offenders.
pub fn plan_litter_sale(kits: &[Animal]) -> Result<Vec<AnimalId>, LifecycleError> {
    if kits.is_empty() {
        return Err(LifecycleError::invalid(
            "No animals found for this litter. Generate kits first.",
        ));
    }

    let ineligible: Vec<&str> = kits
        .iter()
        .filter(|kit| !Trigger::Sale.admits(Some(kit.status), AnimalStatus::Sold))
        .map(|kit| kit.tattoo.as_str())
        .collect();

    if !ineligible.is_empty() {
        return Err(LifecycleError::invalid(format!(
            "Cannot sell litter: some animals are already harvested or deceased: {}",
            ineligible.join(", ")
        )));
    }

    Ok(kits.iter().map(|kit| kit.animal_id).collect())
}

/// Status writes that undo a sale.
///
/// Only animals still `sold` are touched. An individual sale uses the
/// breeder/growout guess from [`Animal::status_after_sale_reversal`]; a
/// litter sale sends every kit back to growout.
pub fn plan_sale_reversal(target: SaleTarget, animals: &[Animal]) -> Vec<(AnimalId, AnimalStatus)> {
    animals
        .iter()
        .filter(|animal| animal.status == AnimalStatus::Sold)
        .filter_map(|animal| {
            let restored = match target {
                SaleTarget::Animal(id) if id == animal.animal_id => {
                    animal.status_after_sale_reversal()
                }
                SaleTarget::Animal(_) => return None,
                SaleTarget::Litter(litter) if animal.litter_id == Some(litter) => {
                    AnimalStatus::Growout
                }
                SaleTarget::Litter(_) => return None,
            };
            debug_assert!(Trigger::SaleReversal.admits(Some(animal.status), restored));
            Some((animal.animal_id, restored))
        })
        .collect()
}
