//! SQLite herd ledger
//!
//! The ledger lives in `.rabbitry/rabbitry.db` and is the source of truth
//! for every record. Reads go straight to the connection; lifecycle writes
//! live in [`super::lifecycle`] and run inside one transaction each.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::debug;

use crate::domain::report::Snapshot;
use crate::domain::{
    Animal, AnimalId, AnimalReferences, AnimalStatus, Breeding, BreedingId, FeedCost, FeedCostId,
    Harvest, HarvestId, LifecycleError, Litter, LitterId, Sale, SaleId, SaleTarget,
    ValidationError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Ledger schema version {found} is newer than this build supports ({supported})")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The domain rule that was broken, if that is what failed
    pub fn lifecycle(&self) -> Option<&LifecycleError> {
        match self {
            StoreError::Lifecycle(err) => Some(err),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Paging and filter for the animal list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimalQuery {
    pub status: Option<AnimalStatus>,
    pub offset: u32,
    pub limit: u32,
}

impl AnimalQuery {
    pub const DEFAULT_LIMIT: u32 = 200;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=Self::MAX_LIMIT).contains(&self.limit) {
            return Err(ValidationError::OutOfRange {
                field: "limit",
                min: 1,
                max: Self::MAX_LIMIT as i64,
                value: self.limit as i64,
            });
        }
        Ok(())
    }
}

impl Default for AnimalQuery {
    fn default() -> Self {
        Self {
            status: None,
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS animals (
        animal_id INTEGER PRIMARY KEY AUTOINCREMENT,
        tattoo TEXT NOT NULL UNIQUE,
        sex TEXT NOT NULL,
        status TEXT NOT NULL,
        breed TEXT,
        color TEXT,
        birth_date TEXT,
        source TEXT,
        litter_id INTEGER REFERENCES litters(litter_id),
        death_date TEXT,
        death_reason TEXT,
        notes TEXT
    );

    CREATE TABLE IF NOT EXISTS breedings (
        breeding_id INTEGER PRIMARY KEY AUTOINCREMENT,
        doe_id INTEGER NOT NULL REFERENCES animals(animal_id),
        buck_id INTEGER NOT NULL REFERENCES animals(animal_id),
        bred_date TEXT NOT NULL,
        expected_kindling TEXT NOT NULL,
        result TEXT NOT NULL DEFAULT 'pending',
        notes TEXT
    );

    CREATE TABLE IF NOT EXISTS litters (
        litter_id INTEGER PRIMARY KEY AUTOINCREMENT,
        breeding_id INTEGER NOT NULL REFERENCES breedings(breeding_id),
        kindling_date TEXT NOT NULL,
        born_alive INTEGER NOT NULL,
        born_dead INTEGER NOT NULL DEFAULT 0,
        weaned_count INTEGER,
        notes TEXT
    );

    CREATE TABLE IF NOT EXISTS harvests (
        harvest_id INTEGER PRIMARY KEY AUTOINCREMENT,
        animal_id INTEGER NOT NULL REFERENCES animals(animal_id),
        harvest_date TEXT NOT NULL,
        live_weight_grams INTEGER,
        carcass_weight_grams INTEGER,
        notes TEXT
    );

    CREATE TABLE IF NOT EXISTS feed_costs (
        feed_cost_id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        description TEXT,
        cost_per_unit REAL,
        total_cost REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sales (
        sale_id INTEGER PRIMARY KEY AUTOINCREMENT,
        animal_id INTEGER REFERENCES animals(animal_id),
        litter_id INTEGER REFERENCES litters(litter_id),
        sale_date TEXT NOT NULL,
        sale_price REAL NOT NULL,
        buyer_name TEXT,
        buyer_contact TEXT,
        notes TEXT,
        CHECK ((animal_id IS NULL) <> (litter_id IS NULL))
    );

    CREATE INDEX IF NOT EXISTS idx_animals_status ON animals(status);
    CREATE INDEX IF NOT EXISTS idx_animals_litter ON animals(litter_id);
    CREATE INDEX IF NOT EXISTS idx_breedings_doe ON breedings(doe_id);
    CREATE INDEX IF NOT EXISTS idx_breedings_buck ON breedings(buck_id);
    CREATE INDEX IF NOT EXISTS idx_harvests_animal ON harvests(animal_id);
";

pub(crate) const ANIMAL_COLUMNS: &str = "animal_id, tattoo, sex, status, breed, color, birth_date, \
     source, litter_id, death_date, death_reason, notes";
pub(crate) const BREEDING_COLUMNS: &str =
    "breeding_id, doe_id, buck_id, bred_date, expected_kindling, result, notes";
pub(crate) const LITTER_COLUMNS: &str =
    "litter_id, breeding_id, kindling_date, born_alive, born_dead, weaned_count, notes";
pub(crate) const HARVEST_COLUMNS: &str =
    "harvest_id, animal_id, harvest_date, live_weight_grams, carcass_weight_grams, notes";
pub(crate) const FEED_COST_COLUMNS: &str =
    "feed_cost_id, date, description, cost_per_unit, total_cost";
pub(crate) const SALE_COLUMNS: &str =
    "sale_id, animal_id, litter_id, sale_date, sale_price, buyer_name, buyer_contact, notes";

/// The herd ledger
pub struct Ledger {
    /// Path to the SQLite database, `None` for in-memory ledgers
    path: Option<PathBuf>,

    /// Database connection
    pub(crate) conn: Connection,
}

impl Ledger {
    /// Schema version - bump when the schema changes
    pub const SCHEMA_VERSION: i32 = 1;

    /// Opens or creates the ledger at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let ledger = Self {
            path: Some(path.to_path_buf()),
            conn,
        };
        ledger.ensure_schema()?;
        debug!(path = %path.display(), "opened ledger");

        Ok(ledger)
    }

    /// Opens a throwaway ledger that lives only as long as the value
    pub fn open_in_memory() -> StoreResult<Self> {
        let ledger = Self {
            path: None,
            conn: Connection::open_in_memory()?,
        };
        ledger.ensure_schema()?;
        Ok(ledger)
    }

    /// Returns the database path, if the ledger is on disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_schema(&self) -> StoreResult<()> {
        let found = self.schema_version()?;

        if found > Self::SCHEMA_VERSION {
            return Err(StoreError::SchemaTooNew {
                found,
                supported: Self::SCHEMA_VERSION,
            });
        }

        if found < Self::SCHEMA_VERSION {
            debug!(from = found, to = Self::SCHEMA_VERSION, "migrating ledger schema");
            self.conn.execute_batch(SCHEMA)?;
            self.conn.execute(
                &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
                [],
            )?;
        }

        Ok(())
    }

    /// Gets the current schema version
    pub fn schema_version(&self) -> StoreResult<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    // ---- animals ----

    pub fn get_animal(&self, id: AnimalId) -> StoreResult<Animal> {
        require_animal(&self.conn, id)
    }

    pub fn list_animals(&self, query: &AnimalQuery) -> StoreResult<Vec<Animal>> {
        query.validate()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY animal_id ASC
             LIMIT ?2 OFFSET ?3",
            ANIMAL_COLUMNS
        ))?;
        let animals = stmt
            .query_map(
                params![query.status.map(|s| s.as_str()), query.limit, query.offset],
                animal_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(animals)
    }

    // ---- breedings ----

    pub fn get_breeding(&self, id: BreedingId) -> StoreResult<Breeding> {
        require_breeding(&self.conn, id)
    }

    /// All breedings, most recent first
    pub fn list_breedings(&self) -> StoreResult<Vec<Breeding>> {
        query_all(
            &self.conn,
            &format!(
                "SELECT {} FROM breedings ORDER BY bred_date DESC, breeding_id DESC",
                BREEDING_COLUMNS
            ),
            breeding_from_row,
        )
    }

    // ---- litters ----

    pub fn get_litter(&self, id: LitterId) -> StoreResult<Litter> {
        require_litter(&self.conn, id)
    }

    /// All litters, most recent kindling first
    pub fn list_litters(&self) -> StoreResult<Vec<Litter>> {
        query_all(
            &self.conn,
            &format!(
                "SELECT {} FROM litters ORDER BY kindling_date DESC, litter_id DESC",
                LITTER_COLUMNS
            ),
            litter_from_row,
        )
    }

    /// Animals registered from a litter, in registration order
    pub fn litter_kits(&self, id: LitterId) -> StoreResult<Vec<Animal>> {
        kits_of(&self.conn, id)
    }

    // ---- harvests ----

    pub fn get_harvest(&self, id: HarvestId) -> StoreResult<Harvest> {
        require_harvest(&self.conn, id)
    }

    pub fn list_harvests(&self) -> StoreResult<Vec<Harvest>> {
        query_all(
            &self.conn,
            &format!(
                "SELECT {} FROM harvests ORDER BY harvest_date DESC, harvest_id DESC",
                HARVEST_COLUMNS
            ),
            harvest_from_row,
        )
    }

    // ---- feed costs ----

    pub fn list_feed_costs(&self) -> StoreResult<Vec<FeedCost>> {
        query_all(
            &self.conn,
            &format!(
                "SELECT {} FROM feed_costs ORDER BY date DESC, feed_cost_id DESC",
                FEED_COST_COLUMNS
            ),
            feed_cost_from_row,
        )
    }

    // ---- sales ----

    pub fn get_sale(&self, id: SaleId) -> StoreResult<Sale> {
        find_sale(&self.conn, id)?.ok_or_else(|| LifecycleError::not_found("Sale", id).into())
    }

    pub fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        query_all(
            &self.conn,
            &format!(
                "SELECT {} FROM sales ORDER BY sale_date DESC, sale_id DESC",
                SALE_COLUMNS
            ),
            sale_from_row,
        )
    }

    // ---- reporting ----

    /// Loads every record the reports read, in one read transaction
    pub fn snapshot(&mut self) -> StoreResult<Snapshot> {
        let tx = self.conn.transaction()?;

        let snapshot = Snapshot {
            animals: query_all(
                &tx,
                &format!("SELECT {} FROM animals ORDER BY animal_id", ANIMAL_COLUMNS),
                animal_from_row,
            )?,
            breedings: query_all(
                &tx,
                &format!("SELECT {} FROM breedings ORDER BY breeding_id", BREEDING_COLUMNS),
                breeding_from_row,
            )?,
            litters: query_all(
                &tx,
                &format!("SELECT {} FROM litters ORDER BY litter_id", LITTER_COLUMNS),
                litter_from_row,
            )?,
            harvests: query_all(
                &tx,
                &format!("SELECT {} FROM harvests ORDER BY harvest_id", HARVEST_COLUMNS),
                harvest_from_row,
            )?,
            feed_costs: query_all(
                &tx,
                &format!("SELECT {} FROM feed_costs ORDER BY feed_cost_id", FEED_COST_COLUMNS),
                feed_cost_from_row,
            )?,
        };

        tx.commit()?;
        debug!(
            animals = snapshot.animals.len(),
            litters = snapshot.litters.len(),
            harvests = snapshot.harvests.len(),
            "loaded snapshot"
        );

        Ok(snapshot)
    }
}

// ---- row mapping ----

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = LifecycleError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn animal_from_row(row: &Row<'_>) -> rusqlite::Result<Animal> {
    Ok(Animal {
        animal_id: AnimalId(row.get(0)?),
        tattoo: row.get(1)?,
        sex: parse_column(row, 2)?,
        status: parse_column(row, 3)?,
        breed: row.get(4)?,
        color: row.get(5)?,
        birth_date: row.get(6)?,
        source: row.get(7)?,
        litter_id: row.get::<_, Option<i64>>(8)?.map(LitterId),
        death_date: row.get(9)?,
        death_reason: row.get(10)?,
        notes: row.get(11)?,
    })
}

pub(crate) fn breeding_from_row(row: &Row<'_>) -> rusqlite::Result<Breeding> {
    Ok(Breeding {
        breeding_id: BreedingId(row.get(0)?),
        doe_id: AnimalId(row.get(1)?),
        buck_id: AnimalId(row.get(2)?),
        bred_date: row.get(3)?,
        expected_kindling: row.get(4)?,
        result: parse_column(row, 5)?,
        notes: row.get(6)?,
    })
}

pub(crate) fn litter_from_row(row: &Row<'_>) -> rusqlite::Result<Litter> {
    Ok(Litter {
        litter_id: LitterId(row.get(0)?),
        breeding_id: BreedingId(row.get(1)?),
        kindling_date: row.get(2)?,
        born_alive: row.get(3)?,
        born_dead: row.get(4)?,
        weaned_count: row.get(5)?,
        notes: row.get(6)?,
    })
}

pub(crate) fn harvest_from_row(row: &Row<'_>) -> rusqlite::Result<Harvest> {
    Ok(Harvest {
        harvest_id: HarvestId(row.get(0)?),
        animal_id: AnimalId(row.get(1)?),
        harvest_date: row.get(2)?,
        live_weight_grams: row.get(3)?,
        carcass_weight_grams: row.get(4)?,
        notes: row.get(5)?,
    })
}

pub(crate) fn feed_cost_from_row(row: &Row<'_>) -> rusqlite::Result<FeedCost> {
    Ok(FeedCost {
        feed_cost_id: FeedCostId(row.get(0)?),
        date: row.get(1)?,
        description: row.get(2)?,
        cost_per_unit: row.get(3)?,
        total_cost: row.get(4)?,
    })
}

pub(crate) fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
    let animal_id: Option<i64> = row.get(1)?;
    let litter_id: Option<i64> = row.get(2)?;
    let target = SaleTarget::from_parts(animal_id.map(AnimalId), litter_id.map(LitterId))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(1, Type::Integer, Box::new(err)))?;

    Ok(Sale {
        sale_id: SaleId(row.get(0)?),
        target,
        sale_date: row.get(3)?,
        sale_price: row.get(4)?,
        buyer_name: row.get(5)?,
        buyer_contact: row.get(6)?,
        notes: row.get(7)?,
    })
}

// ---- shared lookups, usable on a connection or inside a transaction ----

pub(crate) fn query_all<T, F>(conn: &Connection, sql: &str, map: F) -> StoreResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn find_animal(conn: &Connection, id: AnimalId) -> StoreResult<Option<Animal>> {
    let animal = conn
        .query_row(
            &format!("SELECT {} FROM animals WHERE animal_id = ?1", ANIMAL_COLUMNS),
            params![id.get()],
            animal_from_row,
        )
        .optional()?;
    Ok(animal)
}

pub(crate) fn require_animal(conn: &Connection, id: AnimalId) -> StoreResult<Animal> {
    find_animal(conn, id)?.ok_or_else(|| LifecycleError::not_found("Animal", id).into())
}

pub(crate) fn require_breeding(conn: &Connection, id: BreedingId) -> StoreResult<Breeding> {
    conn.query_row(
        &format!("SELECT {} FROM breedings WHERE breeding_id = ?1", BREEDING_COLUMNS),
        params![id.get()],
        breeding_from_row,
    )
    .optional()?
    .ok_or_else(|| LifecycleError::not_found("Breeding", id).into())
}

pub(crate) fn require_litter(conn: &Connection, id: LitterId) -> StoreResult<Litter> {
    conn.query_row(
        &format!("SELECT {} FROM litters WHERE litter_id = ?1", LITTER_COLUMNS),
        params![id.get()],
        litter_from_row,
    )
    .optional()?
    .ok_or_else(|| LifecycleError::not_found("Litter", id).into())
}

pub(crate) fn require_harvest(conn: &Connection, id: HarvestId) -> StoreResult<Harvest> {
    conn.query_row(
        &format!("SELECT {} FROM harvests WHERE harvest_id = ?1", HARVEST_COLUMNS),
        params![id.get()],
        harvest_from_row,
    )
    .optional()?
    .ok_or_else(|| LifecycleError::not_found("Harvest", id).into())
}

pub(crate) fn find_sale(conn: &Connection, id: SaleId) -> StoreResult<Option<Sale>> {
    let sale = conn
        .query_row(
            &format!("SELECT {} FROM sales WHERE sale_id = ?1", SALE_COLUMNS),
            params![id.get()],
            sale_from_row,
        )
        .optional()?;
    Ok(sale)
}

pub(crate) fn kits_of(conn: &Connection, litter: LitterId) -> StoreResult<Vec<Animal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM animals WHERE litter_id = ?1 ORDER BY animal_id ASC",
        ANIMAL_COLUMNS
    ))?;
    let kits = stmt
        .query_map(params![litter.get()], animal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(kits)
}

pub(crate) fn references_to(conn: &Connection, id: AnimalId) -> StoreResult<AnimalReferences> {
    let breeding: Option<i64> = conn
        .query_row(
            "SELECT breeding_id FROM breedings WHERE doe_id = ?1 OR buck_id = ?1
             ORDER BY breeding_id LIMIT 1",
            params![id.get()],
            |row| row.get(0),
        )
        .optional()?;
    let harvest: Option<i64> = conn
        .query_row(
            "SELECT harvest_id FROM harvests WHERE animal_id = ?1 ORDER BY harvest_id LIMIT 1",
            params![id.get()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(AnimalReferences {
        breeding: breeding.map(BreedingId),
        harvest: harvest.map(HarvestId),
    })
}

pub(crate) fn tattoo_taken(conn: &Connection, tattoo: &str) -> StoreResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM animals WHERE tattoo = ?1)",
        params![tattoo],
        |row| row.get(0),
    )?;
    Ok(exists)
}
