//! Lifecycle writes
//!
//! Each operation opens a transaction, loads the rows it needs, asks the
//! domain layer what to write, applies the writes and commits. Returning
//! early with `?` drops the transaction, which rolls everything back.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{debug, info};

use super::ledger::{
    find_animal, find_sale, kits_of, references_to, require_animal, require_breeding, require_harvest,
    require_litter, tattoo_taken, Ledger, StoreResult,
};
use crate::domain::{
    check_animal_sale, check_harvest, plan_litter_sale, plan_sale_reversal, Animal, AnimalId, AnimalStatus,
    Breeding, BreedingId, BreedingPatch, BreedingResult, FeedCost, FeedCostId, GeneratedKits, Harvest, HarvestId,
    HarvestPatch, KitRequest, LifecycleError, Litter, LitterId, LitterPatch, NewAnimal,
    NewBreeding, NewFeedCost, NewHarvest, NewLitter, Sale, SaleId, SaleRequest, SaleTarget,
    StatusChange,
};

/// A deleted sale and the status each animal was restored to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReversal {
    pub sale: Sale,
    pub restored: Vec<(AnimalId, AnimalStatus)>,
}

fn insert_animal(conn: &Connection, animal: &NewAnimal) -> StoreResult<AnimalId> {
    if tattoo_taken(conn, &animal.tattoo)? {
        return Err(LifecycleError::conflict(format!(
            "Tattoo '{}' is already in use",
            animal.tattoo
        ))
        .into());
    }

    conn.execute(
        "INSERT INTO animals (tattoo, sex, status, breed, color, birth_date, source, litter_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            animal.tattoo,
            animal.sex.as_str(),
            animal.status.as_str(),
            animal.breed,
            animal.color,
            animal.birth_date,
            animal.source,
            animal.litter_id.map(LitterId::get),
            animal.notes,
        ],
    )?;

    Ok(AnimalId(conn.last_insert_rowid()))
}

fn set_status(conn: &Connection, id: AnimalId, status: AnimalStatus) -> StoreResult<()> {
    conn.execute(
        "UPDATE animals SET status = ?1 WHERE animal_id = ?2",
        params![status.as_str(), id.get()],
    )?;
    Ok(())
}

impl Ledger {
    // ---- animals ----

    /// Registers a new animal
    pub fn create_animal(&mut self, new: NewAnimal) -> StoreResult<Animal> {
        new.validate()?;

        let tx = self.conn.transaction()?;
        let id = insert_animal(&tx, &new)?;
        tx.commit()?;

        info!(animal_id = %id, tattoo = %new.tattoo, status = %new.status, "created animal");
        Ok(new.into_animal(id))
    }

    /// Generic status update. Harvesting has its own operation.
    pub fn update_animal_status(
        &mut self,
        id: AnimalId,
        change: &StatusChange,
        today: NaiveDate,
    ) -> StoreResult<Animal> {
        let tx = self.conn.transaction()?;

        let current = require_animal(&tx, id)?;
        let next = current.apply_status_change(change, today)?;
        tx.execute(
            "UPDATE animals SET status = ?1, death_date = ?2, death_reason = ?3
             WHERE animal_id = ?4",
            params![
                next.status.as_str(),
                next.death_date,
                next.death_reason,
                id.get()
            ],
        )?;
        tx.commit()?;

        info!(animal_id = %id, from = %current.status, to = %next.status, "updated animal status");
        Ok(next)
    }

    /// Deletes an animal no breeding or harvest refers to
    pub fn delete_animal(&mut self, id: AnimalId) -> StoreResult<Animal> {
        let tx = self.conn.transaction()?;

        let animal = require_animal(&tx, id)?;
        references_to(&tx, id)?.check_deletable(id)?;
        tx.execute("DELETE FROM animals WHERE animal_id = ?1", params![id.get()])?;
        tx.commit()?;

        info!(animal_id = %id, tattoo = %animal.tattoo, "deleted animal");
        Ok(animal)
    }

    // ---- breedings ----

    pub fn create_breeding(&mut self, new: &NewBreeding) -> StoreResult<Breeding> {
        let tx = self.conn.transaction()?;

        let doe = find_animal(&tx, new.doe_id)?;
        let buck = find_animal(&tx, new.buck_id)?;
        let planned = new.plan(doe.as_ref(), buck.as_ref())?;

        tx.execute(
            "INSERT INTO breedings (doe_id, buck_id, bred_date, expected_kindling, result)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                planned.doe_id.get(),
                planned.buck_id.get(),
                planned.bred_date,
                planned.expected_kindling,
                planned.result.as_str(),
            ],
        )?;
        let breeding = Breeding {
            breeding_id: BreedingId(tx.last_insert_rowid()),
            doe_id: planned.doe_id,
            buck_id: planned.buck_id,
            bred_date: planned.bred_date,
            expected_kindling: planned.expected_kindling,
            result: planned.result,
            notes: None,
        };
        tx.commit()?;

        info!(
            breeding_id = %breeding.breeding_id,
            doe_id = %breeding.doe_id,
            buck_id = %breeding.buck_id,
            expected_kindling = %breeding.expected_kindling,
            "created breeding"
        );
        Ok(breeding)
    }

    pub fn update_breeding(&mut self, id: BreedingId, patch: &BreedingPatch) -> StoreResult<Breeding> {
        let tx = self.conn.transaction()?;

        let next = patch.apply(&require_breeding(&tx, id)?);
        tx.execute(
            "UPDATE breedings SET result = ?1, notes = ?2 WHERE breeding_id = ?3",
            params![next.result.as_str(), next.notes, id.get()],
        )?;
        tx.commit()?;

        info!(breeding_id = %id, result = %next.result, "updated breeding");
        Ok(next)
    }

    // ---- litters ----

    /// Records a litter and marks its breeding successful
    pub fn create_litter(&mut self, new: NewLitter) -> StoreResult<Litter> {
        let tx = self.conn.transaction()?;

        let breeding = require_breeding(&tx, new.breeding_id)?;
        tx.execute(
            "INSERT INTO litters (breeding_id, kindling_date, born_alive, born_dead, weaned_count, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.breeding_id.get(),
                new.kindling_date,
                new.born_alive,
                new.born_dead,
                new.weaned_count,
                new.notes,
            ],
        )?;
        let litter = new.into_litter(LitterId(tx.last_insert_rowid()));
        tx.execute(
            "UPDATE breedings SET result = ?1 WHERE breeding_id = ?2",
            params![BreedingResult::Successful.as_str(), breeding.breeding_id.get()],
        )?;
        tx.commit()?;

        info!(
            litter_id = %litter.litter_id,
            breeding_id = %litter.breeding_id,
            previous_result = %breeding.result,
            "created litter"
        );
        Ok(litter)
    }

    pub fn update_litter(&mut self, id: LitterId, patch: &LitterPatch) -> StoreResult<Litter> {
        let tx = self.conn.transaction()?;

        let next = patch.apply(&require_litter(&tx, id)?);
        tx.execute(
            "UPDATE litters SET kindling_date = ?1, born_alive = ?2, born_dead = ?3,
                 weaned_count = ?4, notes = ?5
             WHERE litter_id = ?6",
            params![
                next.kindling_date,
                next.born_alive,
                next.born_dead,
                next.weaned_count,
                next.notes,
                id.get(),
            ],
        )?;
        tx.commit()?;

        info!(litter_id = %id, "updated litter");
        Ok(next)
    }

    /// Registers the weaned kits of a litter and stamps its weaned count
    pub fn generate_kits(&mut self, id: LitterId, request: &KitRequest) -> StoreResult<GeneratedKits> {
        request.validate()?;

        let tx = self.conn.transaction()?;

        let litter = require_litter(&tx, id)?;
        let existing = kits_of(&tx, id)?.len();
        let kits = request.plan(&litter, existing)?;

        tx.execute(
            "UPDATE litters SET weaned_count = ?1 WHERE litter_id = ?2",
            params![request.weaned_count, id.get()],
        )?;

        let mut generated = GeneratedKits {
            litter_id: id,
            created: 0,
            animal_ids: Vec::with_capacity(kits.len()),
            tattoos: Vec::with_capacity(kits.len()),
        };
        for kit in &kits {
            let animal_id = insert_animal(&tx, kit)?;
            debug!(litter_id = %id, animal_id = %animal_id, tattoo = %kit.tattoo, "registered kit");
            generated.animal_ids.push(animal_id);
            generated.tattoos.push(kit.tattoo.clone());
        }
        generated.created = generated.animal_ids.len();
        tx.commit()?;

        info!(litter_id = %id, created = generated.created, existing, "generated kits");
        Ok(generated)
    }

    // ---- harvests ----

    /// Records a harvest and marks the animal harvested
    pub fn record_harvest(&mut self, new: NewHarvest) -> StoreResult<Harvest> {
        let tx = self.conn.transaction()?;

        let animal = require_animal(&tx, new.animal_id)?;
        let next = check_harvest(&animal)?;
        tx.execute(
            "INSERT INTO harvests (animal_id, harvest_date, live_weight_grams, carcass_weight_grams, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.animal_id.get(),
                new.harvest_date,
                new.live_weight_grams,
                new.carcass_weight_grams,
                new.notes,
            ],
        )?;
        let harvest = new.into_harvest(HarvestId(tx.last_insert_rowid()));
        set_status(&tx, animal.animal_id, next)?;
        tx.commit()?;

        info!(
            harvest_id = %harvest.harvest_id,
            animal_id = %animal.animal_id,
            from = %animal.status,
            "recorded harvest"
        );
        Ok(harvest)
    }

    pub fn update_harvest(&mut self, id: HarvestId, patch: &HarvestPatch) -> StoreResult<Harvest> {
        let tx = self.conn.transaction()?;

        let next = patch.apply(&require_harvest(&tx, id)?);
        tx.execute(
            "UPDATE harvests SET harvest_date = ?1, live_weight_grams = ?2,
                 carcass_weight_grams = ?3, notes = ?4
             WHERE harvest_id = ?5",
            params![
                next.harvest_date,
                next.live_weight_grams,
                next.carcass_weight_grams,
                next.notes,
                id.get(),
            ],
        )?;
        tx.commit()?;

        info!(harvest_id = %id, "updated harvest");
        Ok(next)
    }

    // ---- feed costs ----

    pub fn create_feed_cost(&mut self, new: NewFeedCost) -> StoreResult<FeedCost> {
        new.validate()?;

        self.conn.execute(
            "INSERT INTO feed_costs (date, description, cost_per_unit, total_cost)
             VALUES (?1, ?2, ?3, ?4)",
            params![new.date, new.description, new.cost_per_unit, new.total_cost],
        )?;
        let entry = new.into_feed_cost(FeedCostId(self.conn.last_insert_rowid()));

        info!(feed_cost_id = %entry.feed_cost_id, total_cost = entry.total_cost, "recorded feed cost");
        Ok(entry)
    }

    pub fn delete_feed_cost(&mut self, id: FeedCostId) -> StoreResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM feed_costs WHERE feed_cost_id = ?1", params![id.get()])?;
        if deleted == 0 {
            return Err(LifecycleError::not_found("Feed cost", id).into());
        }

        info!(feed_cost_id = %id, "deleted feed cost");
        Ok(())
    }

    // ---- sales ----

    /// Records a sale of one animal or of every kit in a litter
    pub fn create_sale(&mut self, request: SaleRequest) -> StoreResult<Sale> {
        let new = request.validate()?;

        let tx = self.conn.transaction()?;

        let sold = match new.target {
            SaleTarget::Animal(animal_id) => {
                check_animal_sale(&require_animal(&tx, animal_id)?)?;
                vec![animal_id]
            }
            SaleTarget::Litter(litter_id) => {
                require_litter(&tx, litter_id)?;
                plan_litter_sale(&kits_of(&tx, litter_id)?)?
            }
        };

        tx.execute(
            "INSERT INTO sales (animal_id, litter_id, sale_date, sale_price, buyer_name, buyer_contact, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.target.animal_id().map(AnimalId::get),
                new.target.litter_id().map(LitterId::get),
                new.sale_date,
                new.sale_price,
                new.buyer_name,
                new.buyer_contact,
                new.notes,
            ],
        )?;
        let sale = new.into_sale(SaleId(tx.last_insert_rowid()));
        for animal_id in &sold {
            set_status(&tx, *animal_id, AnimalStatus::Sold)?;
        }
        tx.commit()?;

        info!(sale_id = %sale.sale_id, animals = sold.len(), price = sale.sale_price, "recorded sale");
        Ok(sale)
    }

    /// Deletes a sale and puts the animals it sold back in the herd
    pub fn delete_sale(&mut self, id: SaleId) -> StoreResult<SaleReversal> {
        let tx = self.conn.transaction()?;

        let sale = find_sale(&tx, id)?.ok_or_else(|| LifecycleError::not_found("Sale", id))?;
        let affected: Vec<Animal> = match sale.target {
            SaleTarget::Animal(animal_id) => find_animal(&tx, animal_id)?
                .into_iter()
                .collect(),
            SaleTarget::Litter(litter_id) => kits_of(&tx, litter_id)?,
        };

        let restored = plan_sale_reversal(sale.target, &affected);
        for (animal_id, status) in &restored {
            set_status(&tx, *animal_id, *status)?;
        }
        tx.execute("DELETE FROM sales WHERE sale_id = ?1", params![id.get()])?;
        tx.commit()?;

        info!(sale_id = %id, restored = restored.len(), "deleted sale");
        Ok(SaleReversal { sale, restored })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{self, DateWindow};
    use crate::domain::{BreedingResult, Sex};
    use crate::storage::{AnimalQuery, StoreError};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_ledger() -> Ledger {
        Ledger::open_in_memory().unwrap()
    }

    fn add_animal(ledger: &mut Ledger, tattoo: &str, sex: Sex, status: AnimalStatus) -> Animal {
        ledger.create_animal(NewAnimal::new(tattoo, sex, status)).unwrap()
    }

    fn add_pair(ledger: &mut Ledger) -> (Animal, Animal) {
        let doe = add_animal(ledger, "DOE1", Sex::Female, AnimalStatus::Breeder);
        let buck = add_animal(ledger, "BUCK1", Sex::Male, AnimalStatus::Breeder);
        (doe, buck)
    }

    fn add_breeding(ledger: &mut Ledger, doe: &Animal, buck: &Animal, bred: NaiveDate) -> Breeding {
        ledger
            .create_breeding(&NewBreeding {
                doe_id: doe.animal_id,
                buck_id: buck.animal_id,
                bred_date: bred,
            })
            .unwrap()
    }

    fn add_litter(ledger: &mut Ledger, breeding: &Breeding) -> Litter {
        ledger
            .create_litter(NewLitter {
                breeding_id: breeding.breeding_id,
                kindling_date: date(2026, 2, 1),
                born_alive: 8,
                born_dead: 1,
                weaned_count: None,
                notes: None,
            })
            .unwrap()
    }

    fn sale_of(animal: Option<AnimalId>, litter: Option<LitterId>) -> SaleRequest {
        SaleRequest {
            sale_date: date(2026, 5, 1),
            sale_price: 90.0,
            buyer_name: None,
            buyer_contact: None,
            notes: None,
            animal_id: animal,
            litter_id: litter,
        }
    }

    fn status_of(ledger: &Ledger, id: AnimalId) -> AnimalStatus {
        ledger.get_animal(id).unwrap().status
    }

    fn invalid_state(err: StoreError) -> bool {
        matches!(err, StoreError::Lifecycle(LifecycleError::InvalidState(_)))
    }

    #[test]
    fn test_create_animal_rejects_terminal_status() {
        let mut ledger = make_ledger();
        let err = ledger
            .create_animal(NewAnimal::new("X1", Sex::Male, AnimalStatus::Harvested))
            .unwrap_err();
        assert!(invalid_state(err));
        assert!(ledger.list_animals(&AnimalQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_tattoo_conflicts() {
        let mut ledger = make_ledger();
        add_animal(&mut ledger, "DOE1", Sex::Female, AnimalStatus::Breeder);
        let err = ledger
            .create_animal(NewAnimal::new("DOE1", Sex::Female, AnimalStatus::Breeder))
            .unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::Conflict(_))));
    }

    #[test]
    fn test_list_animals_filters_and_pages() {
        let mut ledger = make_ledger();
        for i in 0..5 {
            add_animal(&mut ledger, &format!("G{}", i), Sex::Unknown, AnimalStatus::Growout);
        }
        add_animal(&mut ledger, "B1", Sex::Female, AnimalStatus::Breeder);

        let growouts = ledger
            .list_animals(&AnimalQuery {
                status: Some(AnimalStatus::Growout),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(growouts.len(), 5);

        let page = ledger
            .list_animals(&AnimalQuery {
                status: None,
                offset: 4,
                limit: 10,
            })
            .unwrap();
        let tattoos: Vec<_> = page.iter().map(|a| a.tattoo.as_str()).collect();
        assert_eq!(tattoos, ["G4", "B1"]);
    }

    #[test]
    fn test_status_update_and_death_fields() {
        let mut ledger = make_ledger();
        let kit = add_animal(&mut ledger, "K1", Sex::Unknown, AnimalStatus::Growout);

        let err = ledger
            .update_animal_status(kit.animal_id, &StatusChange::to(AnimalStatus::Harvested), date(2026, 3, 1))
            .unwrap_err();
        assert!(invalid_state(err));

        let dead = ledger
            .update_animal_status(kit.animal_id, &StatusChange::to(AnimalStatus::Deceased), date(2026, 3, 1))
            .unwrap();
        assert_eq!(dead.death_date, Some(date(2026, 3, 1)));
        assert_eq!(ledger.get_animal(kit.animal_id).unwrap(), dead);

        let err = ledger
            .update_animal_status(AnimalId(99), &StatusChange::to(AnimalStatus::Growout), date(2026, 3, 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::NotFound { .. })));
    }

    #[test]
    fn test_breeding_requires_doe_and_buck() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);

        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        assert_eq!(breeding.expected_kindling, date(2026, 2, 1));
        assert_eq!(breeding.result, BreedingResult::Pending);

        let swapped = NewBreeding {
            doe_id: buck.animal_id,
            buck_id: doe.animal_id,
            bred_date: date(2026, 1, 1),
        };
        assert!(invalid_state(ledger.create_breeding(&swapped).unwrap_err()));

        let missing = NewBreeding {
            doe_id: doe.animal_id,
            buck_id: AnimalId(404),
            bred_date: date(2026, 1, 1),
        };
        assert!(invalid_state(ledger.create_breeding(&missing).unwrap_err()));
        assert_eq!(ledger.list_breedings().unwrap().len(), 1);
    }

    #[test]
    fn test_update_breeding_is_partial() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));

        let patch = BreedingPatch {
            notes: Some("palpated day 14".to_string()),
            ..Default::default()
        };
        let next = ledger.update_breeding(breeding.breeding_id, &patch).unwrap();
        assert_eq!(next.result, BreedingResult::Pending);
        assert_eq!(next.notes.as_deref(), Some("palpated day 14"));

        let patch = BreedingPatch {
            result: Some(BreedingResult::Missed),
            ..Default::default()
        };
        let next = ledger.update_breeding(breeding.breeding_id, &patch).unwrap();
        assert_eq!(next.result, BreedingResult::Missed);
        assert_eq!(ledger.get_breeding(breeding.breeding_id).unwrap(), next);
    }

    #[test]
    fn test_litter_marks_breeding_successful() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        ledger
            .update_breeding(
                breeding.breeding_id,
                &BreedingPatch {
                    result: Some(BreedingResult::Missed),
                    ..Default::default()
                },
            )
            .unwrap();

        add_litter(&mut ledger, &breeding);
        assert_eq!(
            ledger.get_breeding(breeding.breeding_id).unwrap().result,
            BreedingResult::Successful
        );
    }

    #[test]
    fn test_litter_needs_breeding() {
        let mut ledger = make_ledger();
        let err = ledger
            .create_litter(NewLitter {
                breeding_id: BreedingId(3),
                kindling_date: date(2026, 2, 1),
                born_alive: 5,
                born_dead: 0,
                weaned_count: None,
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::NotFound { .. })));
        assert!(ledger.list_litters().unwrap().is_empty());
    }

    #[test]
    fn test_generate_kits_appends() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        let litter = add_litter(&mut ledger, &breeding);

        let first = ledger
            .generate_kits(
                litter.litter_id,
                &KitRequest {
                    male_count: Some(3),
                    female_count: Some(4),
                    ..KitRequest::new(7)
                },
            )
            .unwrap();
        assert_eq!(first.created, 7);
        assert_eq!(first.tattoos.first().map(String::as_str), Some("L1-K01"));
        assert_eq!(first.tattoos.last().map(String::as_str), Some("L1-K07"));

        let second = ledger.generate_kits(litter.litter_id, &KitRequest::new(2)).unwrap();
        assert_eq!(second.tattoos, ["L1-K08", "L1-K09"]);

        let kits = ledger.litter_kits(litter.litter_id).unwrap();
        assert_eq!(kits.len(), 9);
        assert!(kits.iter().all(|k| k.birth_date == Some(litter.kindling_date)));
        assert_eq!(ledger.get_litter(litter.litter_id).unwrap().weaned_count, Some(2));
    }

    #[test]
    fn test_generate_kits_rolls_back_on_tattoo_collision() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        let litter = add_litter(&mut ledger, &breeding);
        add_animal(&mut ledger, "L1-K03", Sex::Unknown, AnimalStatus::Growout);

        let err = ledger.generate_kits(litter.litter_id, &KitRequest::new(5)).unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::Conflict(_))));
        assert!(ledger.litter_kits(litter.litter_id).unwrap().is_empty());
        assert_eq!(ledger.get_litter(litter.litter_id).unwrap().weaned_count, None);
    }

    #[test]
    fn test_generate_kits_validates_request() {
        let mut ledger = make_ledger();
        let request = KitRequest {
            male_count: Some(4),
            female_count: Some(4),
            ..KitRequest::new(6)
        };
        let err = ledger.generate_kits(LitterId(1), &request).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_harvest_flips_status_and_blocks_delete() {
        let mut ledger = make_ledger();
        let kit = add_animal(&mut ledger, "K1", Sex::Male, AnimalStatus::Growout);

        let harvest = ledger
            .record_harvest(NewHarvest {
                animal_id: kit.animal_id,
                harvest_date: date(2026, 4, 26),
                live_weight_grams: Some(2400),
                carcass_weight_grams: None,
                notes: None,
            })
            .unwrap();
        assert_eq!(status_of(&ledger, kit.animal_id), AnimalStatus::Harvested);

        let err = ledger.delete_animal(kit.animal_id).unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::Conflict(_))));
        assert!(ledger.get_animal(kit.animal_id).is_ok());

        let next = ledger
            .update_harvest(
                harvest.harvest_id,
                &HarvestPatch {
                    carcass_weight_grams: Some(1300),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(next.live_weight_grams, Some(2400));
        assert_eq!(ledger.list_harvests().unwrap(), vec![next]);
    }

    #[test]
    fn test_delete_animal_guards_breedings() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));

        let err = ledger.delete_animal(buck.animal_id).unwrap_err();
        assert!(err.to_string().contains("breeding 1"));

        let loner = add_animal(&mut ledger, "X", Sex::Unknown, AnimalStatus::Growout);
        ledger.delete_animal(loner.animal_id).unwrap();
        assert!(ledger.get_animal(loner.animal_id).is_err());
    }

    #[test]
    fn test_feed_costs() {
        let mut ledger = make_ledger();
        let entry = ledger
            .create_feed_cost(NewFeedCost {
                date: date(2026, 1, 10),
                description: Some("pellets".to_string()),
                cost_per_unit: None,
                total_cost: 24.0,
            })
            .unwrap();
        assert_eq!(ledger.list_feed_costs().unwrap(), vec![entry.clone()]);

        ledger.delete_feed_cost(entry.feed_cost_id).unwrap();
        assert!(ledger.delete_feed_cost(entry.feed_cost_id).is_err());

        let err = ledger
            .create_feed_cost(NewFeedCost {
                date: date(2026, 1, 10),
                description: None,
                cost_per_unit: None,
                total_cost: -1.0,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_animal_sale_and_reversal() {
        let mut ledger = make_ledger();
        let (doe, _) = add_pair(&mut ledger);

        let sale = ledger.create_sale(sale_of(Some(doe.animal_id), None)).unwrap();
        assert_eq!(status_of(&ledger, doe.animal_id), AnimalStatus::Sold);

        let reversal = ledger.delete_sale(sale.sale_id).unwrap();
        assert_eq!(reversal.restored, vec![(doe.animal_id, AnimalStatus::Breeder)]);
        assert_eq!(status_of(&ledger, doe.animal_id), AnimalStatus::Breeder);
        assert!(ledger.list_sales().unwrap().is_empty());

        let err = ledger.delete_sale(sale.sale_id).unwrap_err();
        assert!(matches!(err, StoreError::Lifecycle(LifecycleError::NotFound { .. })));
    }

    #[test]
    fn test_sale_rejects_dead_animal() {
        let mut ledger = make_ledger();
        let kit = add_animal(&mut ledger, "K1", Sex::Unknown, AnimalStatus::Growout);
        ledger
            .update_animal_status(kit.animal_id, &StatusChange::to(AnimalStatus::Deceased), date(2026, 3, 1))
            .unwrap();

        assert!(invalid_state(ledger.create_sale(sale_of(Some(kit.animal_id), None)).unwrap_err()));
        assert!(matches!(
            ledger.create_sale(sale_of(Some(kit.animal_id), Some(LitterId(1)))),
            Err(StoreError::Validation(_))
        ));
        assert!(ledger.list_sales().unwrap().is_empty());
    }

    #[test]
    fn test_litter_sale_is_atomic() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        let litter = add_litter(&mut ledger, &breeding);

        let err = ledger.create_sale(sale_of(None, Some(litter.litter_id))).unwrap_err();
        assert!(err.to_string().contains("Generate kits first"));

        let kits = ledger.generate_kits(litter.litter_id, &KitRequest::new(3)).unwrap();
        ledger
            .update_animal_status(kits.animal_ids[1], &StatusChange::to(AnimalStatus::Deceased), date(2026, 3, 1))
            .unwrap();

        let err = ledger.create_sale(sale_of(None, Some(litter.litter_id))).unwrap_err();
        assert!(err.to_string().contains("L1-K02"));
        assert_eq!(status_of(&ledger, kits.animal_ids[0]), AnimalStatus::Growout);
        assert_eq!(status_of(&ledger, kits.animal_ids[2]), AnimalStatus::Growout);
        assert!(ledger.list_sales().unwrap().is_empty());
    }

    #[test]
    fn test_litter_sale_and_reversal() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);
        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        let litter = add_litter(&mut ledger, &breeding);
        let kits = ledger.generate_kits(litter.litter_id, &KitRequest::new(3)).unwrap();

        let sale = ledger.create_sale(sale_of(None, Some(litter.litter_id))).unwrap();
        for id in &kits.animal_ids {
            assert_eq!(status_of(&ledger, *id), AnimalStatus::Sold);
        }

        // One kit died after the sale; reversal leaves it alone
        ledger
            .update_animal_status(kits.animal_ids[0], &StatusChange::to(AnimalStatus::Deceased), date(2026, 5, 2))
            .unwrap();
        let reversal = ledger.delete_sale(sale.sale_id).unwrap();
        assert_eq!(reversal.restored.len(), 2);
        assert_eq!(status_of(&ledger, kits.animal_ids[0]), AnimalStatus::Deceased);
        assert_eq!(status_of(&ledger, kits.animal_ids[1]), AnimalStatus::Growout);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut ledger = make_ledger();
        let (doe, buck) = add_pair(&mut ledger);

        let breeding = add_breeding(&mut ledger, &doe, &buck, date(2026, 1, 1));
        assert_eq!(breeding.result, BreedingResult::Pending);
        assert_eq!(breeding.expected_kindling, date(2026, 2, 1));

        let litter = ledger
            .create_litter(NewLitter {
                breeding_id: breeding.breeding_id,
                kindling_date: date(2026, 2, 1),
                born_alive: 8,
                born_dead: 1,
                weaned_count: Some(7),
                notes: None,
            })
            .unwrap();
        assert_eq!(
            ledger.get_breeding(breeding.breeding_id).unwrap().result,
            BreedingResult::Successful
        );

        let kits = ledger
            .generate_kits(
                litter.litter_id,
                &KitRequest {
                    male_count: Some(3),
                    female_count: Some(4),
                    ..KitRequest::new(7)
                },
            )
            .unwrap();
        let expected: Vec<String> = (1..=7)
            .map(|n| format!("L{}-K{:02}", litter.litter_id, n))
            .collect();
        assert_eq!(kits.tattoos, expected);

        ledger
            .record_harvest(NewHarvest {
                animal_id: kits.animal_ids[0],
                harvest_date: date(2026, 4, 26),
                live_weight_grams: Some(2400),
                carcass_weight_grams: Some(1300),
                notes: None,
            })
            .unwrap();
        assert_eq!(status_of(&ledger, kits.animal_ids[0]), AnimalStatus::Harvested);

        let snapshot = ledger.snapshot().unwrap();
        assert!(report::metrics(&snapshot).harvested_rabbits >= 1);

        let summary = report::summarize(&snapshot, DateWindow::all());
        assert_eq!(summary.kpis.total_litters, 1);
        assert_eq!(summary.kpis.avg_days_to_harvest, Some(84.0));
    }
}
