//! Reporting engine
//!
//! Computes production KPIs and month-bucketed time series from a read-only
//! [`Snapshot`] of the herd. Each entity is filtered on its own date column:
//! litters on kindling date, harvests on harvest date, deaths on death date
//! and feed costs on purchase date.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::animal::{Animal, AnimalStatus};
use super::breeding::Breeding;
use super::harvest::{FeedCost, Harvest};
use super::id::AnimalId;
use super::litter::Litter;

/// Inclusive date range; a missing bound is unbounded on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    #[serde(rename = "start_date")]
    pub start: Option<NaiveDate>,
    #[serde(rename = "end_date")]
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A window with neither bound
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// Like [`DateWindow::contains`] for an optional date. A missing date
    /// only passes an unbounded window.
    pub fn contains_opt(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(date) => self.contains(date),
            None => self.is_unbounded(),
        }
    }
}

/// Every record the reports read, loaded in one pass
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub animals: Vec<Animal>,
    pub breedings: Vec<Breeding>,
    pub litters: Vec<Litter>,
    pub harvests: Vec<Harvest>,
    pub feed_costs: Vec<FeedCost>,
}

impl Snapshot {
    pub fn animals_by_id(&self) -> HashMap<AnimalId, &Animal> {
        self.animals.iter().map(|a| (a.animal_id, a)).collect()
    }
}

/// `YYYY-MM` bucket key for a date
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Rounds to `places` decimal places, ties to even
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Point-in-time production KPIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_litters: usize,
    pub avg_litter_size: Option<f64>,
    pub survival_to_wean: Option<f64>,
    pub harvested_count: usize,
    pub avg_days_to_harvest: Option<f64>,
    pub avg_yield: Option<f64>,
    pub mortality_count: usize,
    pub total_feed_cost: f64,
    pub avg_feed_cost_per_month: Option<f64>,
    pub cost_per_harvested_rabbit: Option<f64>,
}

/// One month of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point<T> {
    pub month: String,
    pub value: T,
}

/// A named series aligned to the shared month axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<T> {
    pub name: String,
    pub points: Vec<Point<T>>,
}

impl<T: Copy> Series<T> {
    fn aligned(name: &str, months: &[String], buckets: &BTreeMap<String, T>, missing: T) -> Self {
        Self {
            name: name.to_string(),
            points: months
                .iter()
                .map(|month| Point {
                    month: month.clone(),
                    value: buckets.get(month).copied().unwrap_or(missing),
                })
                .collect(),
        }
    }

    /// Looks up the value for a month
    pub fn value_at(&self, month: &str) -> Option<T> {
        self.points.iter().find(|p| p.month == month).map(|p| p.value)
    }
}

/// Every series the summary produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub litters: Series<u64>,
    pub born_alive: Series<u64>,
    pub weaned: Series<u64>,
    pub harvests: Series<u64>,
    pub mortality: Series<u64>,
    pub avg_yield: Series<f64>,
    pub feed_cost: Series<f64>,
}

/// KPIs plus time series for a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub range: DateWindow,
    pub kpis: Kpis,
    pub series: SeriesSet,
}

/// Builds the summary report for `window`
pub fn summarize(snapshot: &Snapshot, window: DateWindow) -> Summary {
    let animals = snapshot.animals_by_id();

    let litters: Vec<&Litter> = snapshot
        .litters
        .iter()
        .filter(|l| window.contains(l.kindling_date))
        .collect();
    let harvests: Vec<&Harvest> = snapshot
        .harvests
        .iter()
        .filter(|h| window.contains(h.harvest_date))
        .collect();
    let deceased: Vec<&Animal> = snapshot
        .animals
        .iter()
        .filter(|a| a.status == AnimalStatus::Deceased && window.contains_opt(a.death_date))
        .collect();
    let feed_costs: Vec<&FeedCost> = snapshot
        .feed_costs
        .iter()
        .filter(|f| window.contains(f.date))
        .collect();

    // Litters
    let total_litters = litters.len();
    let total_born_alive: u64 = litters.iter().map(|l| l.born_alive as u64).sum();
    let avg_litter_size =
        (total_litters > 0).then(|| total_born_alive as f64 / total_litters as f64);

    let weaned_known: Vec<&&Litter> = litters.iter().filter(|l| l.weaned_count.is_some()).collect();
    let weaned_denominator: u64 = weaned_known.iter().map(|l| l.born_alive as u64).sum();
    let weaned_total: u64 = weaned_known
        .iter()
        .map(|l| l.weaned_count.unwrap_or(0) as u64)
        .sum();
    let survival_to_wean = (!weaned_known.is_empty() && weaned_denominator > 0)
        .then(|| weaned_total as f64 / weaned_denominator as f64);

    // Harvests
    let harvested_count = harvests.len();
    let days_to_harvest: Vec<f64> = harvests
        .iter()
        .filter_map(|h| {
            animals
                .get(&h.animal_id)
                .and_then(|a| a.age_on(h.harvest_date))
                .map(|days| days as f64)
        })
        .collect();
    let yields: Vec<f64> = harvests.iter().filter_map(|h| h.yield_ratio()).collect();

    // Feed
    let total_feed_cost: f64 = feed_costs.iter().map(|f| f.total_cost).sum();
    let mut feed_cost_by_month: BTreeMap<String, f64> = BTreeMap::new();
    for entry in &feed_costs {
        *feed_cost_by_month.entry(month_key(entry.date)).or_default() += entry.total_cost;
    }
    let avg_feed_cost_per_month = (!feed_cost_by_month.is_empty())
        .then(|| total_feed_cost / feed_cost_by_month.len() as f64);
    let cost_per_harvested_rabbit = (harvested_count > 0 && total_feed_cost > 0.0)
        .then(|| total_feed_cost / harvested_count as f64);

    let kpis = Kpis {
        total_litters,
        avg_litter_size,
        survival_to_wean,
        harvested_count,
        avg_days_to_harvest: mean(&days_to_harvest),
        avg_yield: mean(&yields),
        mortality_count: deceased.len(),
        total_feed_cost,
        avg_feed_cost_per_month,
        cost_per_harvested_rabbit,
    };

    // Time series buckets
    let mut litters_by_month: BTreeMap<String, u64> = BTreeMap::new();
    let mut born_alive_by_month: BTreeMap<String, u64> = BTreeMap::new();
    let mut weaned_by_month: BTreeMap<String, u64> = BTreeMap::new();
    for litter in &litters {
        let key = month_key(litter.kindling_date);
        *litters_by_month.entry(key.clone()).or_default() += 1;
        *born_alive_by_month.entry(key.clone()).or_default() += litter.born_alive as u64;
        if let Some(weaned) = litter.weaned_count {
            *weaned_by_month.entry(key).or_default() += weaned as u64;
        }
    }

    let mut harvests_by_month: BTreeMap<String, u64> = BTreeMap::new();
    let mut yields_by_month: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for harvest in &harvests {
        let key = month_key(harvest.harvest_date);
        *harvests_by_month.entry(key.clone()).or_default() += 1;
        if let Some(ratio) = harvest.yield_ratio() {
            yields_by_month.entry(key).or_default().push(ratio);
        }
    }
    let avg_yield_by_month: BTreeMap<String, f64> = yields_by_month
        .into_iter()
        .filter_map(|(key, values)| mean(&values).map(|m| (key, m)))
        .collect();

    let mut mortality_by_month: BTreeMap<String, u64> = BTreeMap::new();
    for animal in &deceased {
        if let Some(died) = animal.death_date {
            *mortality_by_month.entry(month_key(died)).or_default() += 1;
        }
    }

    let months: Vec<String> = litters_by_month
        .keys()
        .chain(harvests_by_month.keys())
        .chain(mortality_by_month.keys())
        .chain(feed_cost_by_month.keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rounded_feed: BTreeMap<String, f64> = feed_cost_by_month
        .iter()
        .map(|(key, total)| (key.clone(), round_to(*total, 2)))
        .collect();

    let series = SeriesSet {
        litters: Series::aligned("Litters", &months, &litters_by_month, 0),
        born_alive: Series::aligned("Born Alive", &months, &born_alive_by_month, 0),
        weaned: Series::aligned("Weaned", &months, &weaned_by_month, 0),
        harvests: Series::aligned("Harvests", &months, &harvests_by_month, 0),
        mortality: Series::aligned("Mortality", &months, &mortality_by_month, 0),
        avg_yield: Series::aligned("Avg Yield", &months, &avg_yield_by_month, 0.0),
        feed_cost: Series::aligned("Feed Cost ($)", &months, &rounded_feed, 0.0),
    };

    Summary {
        range: window,
        kpis,
        series,
    }
}

/// Whole-herd headline numbers with no date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_litters: usize,
    pub average_litter_size: Option<f64>,
    pub kit_survival_rate: Option<f64>,
    pub average_days_to_harvest: Option<f64>,
    pub harvested_rabbits: usize,
}

/// Computes [`Metrics`] over every record.
///
/// Unlike the windowed summary, kit survival is only reported once every
/// litter has a weaned count.
pub fn metrics(snapshot: &Snapshot) -> Metrics {
    let litters = &snapshot.litters;
    let total_litters = litters.len();
    let born_alive: u64 = litters.iter().map(|l| l.born_alive as u64).sum();

    let average_litter_size =
        (total_litters > 0).then(|| born_alive as f64 / total_litters as f64);

    let all_weaned = !litters.is_empty() && litters.iter().all(|l| l.weaned_count.is_some());
    let kit_survival_rate = (all_weaned && born_alive > 0).then(|| {
        let weaned: u64 = litters
            .iter()
            .map(|l| l.weaned_count.unwrap_or(0) as u64)
            .sum();
        weaned as f64 / born_alive as f64
    });

    let animals = snapshot.animals_by_id();
    let days: Vec<f64> = snapshot
        .harvests
        .iter()
        .filter_map(|h| {
            animals
                .get(&h.animal_id)
                .and_then(|a| a.age_on(h.harvest_date))
                .map(|d| d as f64)
        })
        .collect();

    Metrics {
        total_litters,
        average_litter_size,
        kit_survival_rate,
        average_days_to_harvest: mean(&days),
        harvested_rabbits: snapshot.harvests.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal::{NewAnimal, Sex};
    use crate::domain::id::{BreedingId, FeedCostId, HarvestId, LitterId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn litter(id: i64, kindled: NaiveDate, alive: u32, weaned: Option<u32>) -> Litter {
        Litter {
            litter_id: LitterId(id),
            breeding_id: BreedingId(1),
            kindling_date: kindled,
            born_alive: alive,
            born_dead: 0,
            weaned_count: weaned,
            notes: None,
        }
    }

    fn kit(id: i64, born: NaiveDate) -> Animal {
        let mut animal = NewAnimal::new(format!("K{}", id), Sex::Unknown, AnimalStatus::Growout)
            .into_animal(AnimalId(id));
        animal.birth_date = Some(born);
        animal
    }

    fn harvest(id: i64, animal: i64, on: NaiveDate, live: Option<u32>, carcass: Option<u32>) -> Harvest {
        Harvest {
            harvest_id: HarvestId(id),
            animal_id: AnimalId(animal),
            harvest_date: on,
            live_weight_grams: live,
            carcass_weight_grams: carcass,
            notes: None,
        }
    }

    fn feed(id: i64, on: NaiveDate, total: f64) -> FeedCost {
        FeedCost {
            feed_cost_id: FeedCostId(id),
            date: on,
            description: None,
            cost_per_unit: None,
            total_cost: total,
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow::new(Some(date(2026, 1, 1)), Some(date(2026, 1, 31)));
        assert!(window.contains(date(2026, 1, 1)));
        assert!(window.contains(date(2026, 1, 31)));
        assert!(!window.contains(date(2026, 2, 1)));

        let open_end = DateWindow::new(Some(date(2026, 1, 1)), None);
        assert!(open_end.contains(date(2099, 1, 1)));
        assert!(!open_end.contains_opt(None));
        assert!(DateWindow::all().contains_opt(None));
    }

    #[test]
    fn empty_snapshot_has_undefined_ratios() {
        let summary = summarize(&Snapshot::default(), DateWindow::all());
        let kpis = &summary.kpis;

        assert_eq!(kpis.total_litters, 0);
        assert_eq!(kpis.avg_litter_size, None);
        assert_eq!(kpis.survival_to_wean, None);
        assert_eq!(kpis.avg_days_to_harvest, None);
        assert_eq!(kpis.avg_yield, None);
        assert_eq!(kpis.avg_feed_cost_per_month, None);
        assert_eq!(kpis.cost_per_harvested_rabbit, None);
        assert!(summary.series.litters.points.is_empty());
    }

    #[test]
    fn feed_cost_average_per_month() {
        let snapshot = Snapshot {
            feed_costs: vec![
                feed(1, date(2026, 3, 1), 50.0),
                feed(2, date(2026, 4, 1), 40.0),
            ],
            ..Default::default()
        };

        let summary = summarize(&snapshot, DateWindow::all());
        assert_eq!(summary.kpis.total_feed_cost, 90.0);
        assert_eq!(summary.kpis.avg_feed_cost_per_month, Some(45.0));
        assert_eq!(summary.kpis.cost_per_harvested_rabbit, None);

        assert_eq!(summary.series.feed_cost.value_at("2026-03"), Some(50.0));
        assert_eq!(summary.series.feed_cost.value_at("2026-04"), Some(40.0));
    }

    #[test]
    fn feed_cost_series_rounds_monthly_sums() {
        let snapshot = Snapshot {
            feed_costs: vec![
                feed(1, date(2026, 3, 1), 10.111),
                feed(2, date(2026, 3, 9), 10.111),
            ],
            ..Default::default()
        };
        let summary = summarize(&snapshot, DateWindow::all());
        assert_eq!(summary.series.feed_cost.value_at("2026-03"), Some(20.22));
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_to(56.25, 1), 56.2);
        assert_eq!(round_to(56.35, 1), 56.4);
        assert_eq!(round_to(10.125, 2), 10.12);
        assert_eq!(round_to(10.375, 2), 10.38);
        assert_eq!(round_to(54.166, 1), 54.2);

        let snapshot = Snapshot {
            feed_costs: vec![feed(1, date(2026, 3, 1), 10.125)],
            ..Default::default()
        };
        let summary = summarize(&snapshot, DateWindow::all());
        assert_eq!(summary.series.feed_cost.value_at("2026-03"), Some(10.12));
    }

    #[test]
    fn survival_only_counts_weaned_litters() {
        let snapshot = Snapshot {
            litters: vec![
                litter(1, date(2026, 2, 1), 8, Some(6)),
                litter(2, date(2026, 2, 10), 10, None),
            ],
            ..Default::default()
        };

        let summary = summarize(&snapshot, DateWindow::all());
        assert_eq!(summary.kpis.total_litters, 2);
        assert_eq!(summary.kpis.avg_litter_size, Some(9.0));
        assert_eq!(summary.kpis.survival_to_wean, Some(0.75));
        assert_eq!(summary.series.weaned.value_at("2026-02"), Some(6));
        assert_eq!(summary.series.born_alive.value_at("2026-02"), Some(18));
    }

    #[test]
    fn harvest_kpis_use_birth_dates_and_weights() {
        let born = date(2026, 2, 1);
        let snapshot = Snapshot {
            animals: vec![kit(1, born), kit(2, born)],
            harvests: vec![
                harvest(1, 1, date(2026, 4, 12), Some(2800), Some(1400)),
                harvest(2, 2, date(2026, 4, 22), Some(3000), None),
                harvest(3, 99, date(2026, 5, 2), None, None),
            ],
            feed_costs: vec![feed(1, date(2026, 4, 1), 60.0)],
            ..Default::default()
        };

        let summary = summarize(&snapshot, DateWindow::all());
        let kpis = &summary.kpis;
        assert_eq!(kpis.harvested_count, 3);
        assert_eq!(kpis.avg_days_to_harvest, Some(75.0));
        assert_eq!(kpis.avg_yield, Some(0.5));
        assert_eq!(kpis.cost_per_harvested_rabbit, Some(20.0));

        // May has a harvest but no qualifying yield
        assert_eq!(summary.series.avg_yield.value_at("2026-04"), Some(0.5));
        assert_eq!(summary.series.avg_yield.value_at("2026-05"), Some(0.0));
    }

    #[test]
    fn month_axis_is_union_of_sources() {
        let mut dead = kit(5, date(2025, 11, 1));
        dead.status = AnimalStatus::Deceased;
        dead.death_date = Some(date(2026, 1, 20));

        let snapshot = Snapshot {
            animals: vec![dead, kit(1, date(2026, 2, 1))],
            litters: vec![litter(1, date(2026, 3, 5), 6, None)],
            harvests: vec![harvest(1, 1, date(2026, 5, 1), None, None)],
            feed_costs: vec![feed(1, date(2026, 3, 20), 12.5)],
            ..Default::default()
        };

        let summary = summarize(&snapshot, DateWindow::all());
        let months: Vec<_> = summary
            .series
            .litters
            .points
            .iter()
            .map(|p| p.month.as_str())
            .collect();
        assert_eq!(months, ["2026-01", "2026-03", "2026-05"]);

        assert_eq!(summary.series.litters.value_at("2026-01"), Some(0));
        assert_eq!(summary.series.mortality.value_at("2026-01"), Some(1));
        assert_eq!(summary.series.harvests.value_at("2026-03"), Some(0));
        assert_eq!(summary.kpis.mortality_count, 1);
    }

    #[test]
    fn window_filters_each_entity_on_its_own_date() {
        let mut dead = kit(5, date(2025, 11, 1));
        dead.status = AnimalStatus::Deceased;
        dead.death_date = Some(date(2025, 12, 20));

        let snapshot = Snapshot {
            animals: vec![dead, kit(1, date(2025, 10, 1))],
            litters: vec![
                litter(1, date(2025, 12, 5), 6, None),
                litter(2, date(2026, 1, 5), 7, None),
            ],
            harvests: vec![harvest(1, 1, date(2026, 1, 10), None, None)],
            feed_costs: vec![feed(1, date(2025, 12, 1), 99.0)],
            ..Default::default()
        };

        let window = DateWindow::new(Some(date(2026, 1, 1)), None);
        let summary = summarize(&snapshot, window);
        assert_eq!(summary.kpis.total_litters, 1);
        assert_eq!(summary.kpis.harvested_count, 1);
        assert_eq!(summary.kpis.mortality_count, 0);
        assert_eq!(summary.kpis.total_feed_cost, 0.0);
        assert_eq!(summary.kpis.avg_feed_cost_per_month, None);
    }

    #[test]
    fn summary_serializes_range_and_series_names() {
        let window = DateWindow::new(Some(date(2026, 1, 1)), None);
        let json = serde_json::to_value(summarize(&Snapshot::default(), window)).unwrap();

        assert_eq!(json["range"]["start_date"], "2026-01-01");
        assert!(json["range"]["end_date"].is_null());
        assert_eq!(json["series"]["feed_cost"]["name"], "Feed Cost ($)");
        assert!(json["kpis"]["avg_yield"].is_null());
    }

    #[test]
    fn metrics_require_every_litter_weaned() {
        let mut snapshot = Snapshot {
            litters: vec![
                litter(1, date(2026, 2, 1), 8, Some(7)),
                litter(2, date(2026, 3, 1), 8, None),
            ],
            ..Default::default()
        };
        assert_eq!(metrics(&snapshot).kit_survival_rate, None);
        assert_eq!(metrics(&snapshot).average_litter_size, Some(8.0));

        snapshot.litters[1].weaned_count = Some(5);
        assert_eq!(metrics(&snapshot).kit_survival_rate, Some(0.75));
    }
}
