//! Tabular exports
//!
//! Each export has a fixed header row and one row per record in the date
//! window, newest first. Cells are rendered as text here so the CSV writer
//! only has to quote them.

use std::collections::HashMap;
use std::io;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::breeding::BreedingResult;
use super::error::LifecycleError;
use super::id::{AnimalId, BreedingId};
use super::report::{round_to, DateWindow, Snapshot};

/// Placeholder for a tattoo whose record is gone
const MISSING: &str = "\u{2014}";

/// The exports the reporting engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Breedings,
    Litters,
    Harvests,
    FeedCosts,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Breedings => "breedings",
            ExportKind::Litters => "litters",
            ExportKind::Harvests => "harvests",
            ExportKind::FeedCosts => "feed-costs",
        }
    }

    pub fn all() -> &'static [ExportKind] {
        &[
            ExportKind::Breedings,
            ExportKind::Litters,
            ExportKind::Harvests,
            ExportKind::FeedCosts,
        ]
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            ExportKind::Breedings => &[
                "breeding_id",
                "doe_tattoo",
                "buck_tattoo",
                "bred_date",
                "expected_kindling",
                "result",
            ],
            ExportKind::Litters => &[
                "litter_id",
                "breeding_id",
                "doe_tattoo",
                "buck_tattoo",
                "kindling_date",
                "born_alive",
                "born_dead",
                "weaned_count",
                "survival_pct",
            ],
            ExportKind::Harvests => &[
                "harvest_id",
                "animal_id",
                "tattoo",
                "litter_id",
                "harvest_date",
                "age_days",
                "live_weight_grams",
                "carcass_weight_grams",
                "yield_pct",
            ],
            ExportKind::FeedCosts => &[
                "feed_cost_id",
                "date",
                "description",
                "cost_per_unit",
                "total_cost",
            ],
        }
    }

    /// Default file name for the export
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str().replace('-', "_"))
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ExportKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                LifecycleError::invalid(format!(
                    "export must be one of: breedings, feed-costs, harvests, litters (got '{}')",
                    s.trim()
                ))
            })
    }
}

/// Filters applied to an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub window: DateWindow,
    /// Only honoured by the breedings export
    pub result: Option<BreedingResult>,
}

/// A rendered export: header plus text rows
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub kind: ExportKind,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn header(&self) -> &'static [&'static str] {
        self.kind.header()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as CSV; the header is always written
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(writer);
        out.write_record(self.header())?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> csv::Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Builds the requested export from a snapshot
pub fn build(kind: ExportKind, snapshot: &Snapshot, filter: ExportFilter) -> ExportTable {
    let rows = match kind {
        ExportKind::Breedings => breeding_rows(snapshot, filter),
        ExportKind::Litters => litter_rows(snapshot, filter.window),
        ExportKind::Harvests => harvest_rows(snapshot, filter.window),
        ExportKind::FeedCosts => feed_cost_rows(snapshot, filter.window),
    };
    ExportTable { kind, rows }
}

fn tattoos(snapshot: &Snapshot) -> HashMap<AnimalId, &str> {
    snapshot
        .animals
        .iter()
        .map(|a| (a.animal_id, a.tattoo.as_str()))
        .collect()
}

fn tattoo_or_id(tattoos: &HashMap<AnimalId, &str>, id: AnimalId) -> String {
    tattoos
        .get(&id)
        .map(|t| t.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn breeding_rows(snapshot: &Snapshot, filter: ExportFilter) -> Vec<Vec<String>> {
    let tattoos = tattoos(snapshot);
    let mut breedings: Vec<_> = snapshot
        .breedings
        .iter()
        .filter(|b| filter.window.contains(b.bred_date))
        .filter(|b| filter.result.map_or(true, |r| b.result == r))
        .collect();
    breedings.sort_by(|a, b| b.bred_date.cmp(&a.bred_date));

    breedings
        .into_iter()
        .map(|b| {
            vec![
                b.breeding_id.to_string(),
                tattoo_or_id(&tattoos, b.doe_id),
                tattoo_or_id(&tattoos, b.buck_id),
                date_cell(b.bred_date),
                date_cell(b.expected_kindling),
                b.result.to_string(),
            ]
        })
        .collect()
}

fn litter_rows(snapshot: &Snapshot, window: DateWindow) -> Vec<Vec<String>> {
    let tattoos = tattoos(snapshot);
    let parents: HashMap<BreedingId, (String, String)> = snapshot
        .breedings
        .iter()
        .map(|b| {
            (
                b.breeding_id,
                (tattoo_or_id(&tattoos, b.doe_id), tattoo_or_id(&tattoos, b.buck_id)),
            )
        })
        .collect();

    let mut litters: Vec<_> = snapshot
        .litters
        .iter()
        .filter(|l| window.contains(l.kindling_date))
        .collect();
    litters.sort_by(|a, b| b.kindling_date.cmp(&a.kindling_date));

    litters
        .into_iter()
        .map(|l| {
            let (doe, buck) = parents
                .get(&l.breeding_id)
                .cloned()
                .unwrap_or_else(|| (MISSING.to_string(), MISSING.to_string()));
            vec![
                l.litter_id.to_string(),
                l.breeding_id.to_string(),
                doe,
                buck,
                date_cell(l.kindling_date),
                l.born_alive.to_string(),
                l.born_dead.to_string(),
                opt_cell(l.weaned_count),
                float_opt_cell(l.survival_rate().map(percent)),
            ]
        })
        .collect()
}

fn harvest_rows(snapshot: &Snapshot, window: DateWindow) -> Vec<Vec<String>> {
    let animals = snapshot.animals_by_id();
    let mut harvests: Vec<_> = snapshot
        .harvests
        .iter()
        .filter(|h| window.contains(h.harvest_date))
        .collect();
    harvests.sort_by(|a, b| b.harvest_date.cmp(&a.harvest_date));

    harvests
        .into_iter()
        .map(|h| {
            let animal = animals.get(&h.animal_id);
            vec![
                h.harvest_id.to_string(),
                h.animal_id.to_string(),
                animal
                    .map(|a| a.tattoo.clone())
                    .unwrap_or_else(|| MISSING.to_string()),
                opt_cell(animal.and_then(|a| a.litter_id)),
                date_cell(h.harvest_date),
                opt_cell(animal.and_then(|a| a.age_on(h.harvest_date))),
                opt_cell(h.live_weight_grams),
                opt_cell(h.carcass_weight_grams),
                float_opt_cell(h.yield_ratio().map(percent)),
            ]
        })
        .collect()
}

fn feed_cost_rows(snapshot: &Snapshot, window: DateWindow) -> Vec<Vec<String>> {
    let mut costs: Vec<_> = snapshot
        .feed_costs
        .iter()
        .filter(|f| window.contains(f.date))
        .collect();
    costs.sort_by(|a, b| b.date.cmp(&a.date));

    costs
        .into_iter()
        .map(|f| {
            vec![
                f.feed_cost_id.to_string(),
                date_cell(f.date),
                f.description.clone().unwrap_or_default(),
                float_opt_cell(f.cost_per_unit),
                float_cell(f.total_cost),
            ]
        })
        .collect()
}

/// A fraction as a percentage rounded to one decimal place
fn percent(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 1)
}

fn date_cell(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders a float so whole numbers keep a trailing `.0`
pub fn float_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn float_opt_cell(value: Option<f64>) -> String {
    value.map(float_cell).unwrap_or_default()
}
