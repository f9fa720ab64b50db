//! Harvest and feed cost commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::app::Session;
use super::output::{num, opt, pct, Output};
use crate::domain::{AnimalId, FeedCostId, HarvestId, HarvestPatch, NewFeedCost, NewHarvest};

#[derive(Subcommand)]
pub enum HarvestCommands {
    /// Record a harvest and mark the animal harvested
    Add {
        /// Animal harvested
        #[arg(long)]
        animal: AnimalId,

        /// Harvest date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Live weight in grams
        #[arg(long)]
        live: Option<u32>,

        /// Carcass weight in grams
        #[arg(long)]
        carcass: Option<u32>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List harvests, most recent first
    List,

    /// Correct a harvest's date or weights
    Update {
        id: HarvestId,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        live: Option<u32>,

        #[arg(long)]
        carcass: Option<u32>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FeedCommands {
    /// Record a feed purchase
    Add {
        /// Purchase date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Total cost
        #[arg(long)]
        total: f64,

        /// Cost per unit (bag, kg)
        #[arg(long)]
        unit_cost: Option<f64>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List feed purchases, most recent first
    List,

    /// Delete a feed purchase
    Delete {
        id: FeedCostId,
    },
}

pub fn run(cmd: HarvestCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        HarvestCommands::Add {
            animal,
            date,
            live,
            carcass,
            notes,
        } => {
            let harvest = ledger.record_harvest(NewHarvest {
                animal_id: animal,
                harvest_date: date,
                live_weight_grams: live,
                carcass_weight_grams: carcass,
                notes,
            })?;

            if output.is_json() {
                output.data(&harvest);
            } else {
                output.success(&format!(
                    "Recorded harvest {} for animal {}",
                    harvest.harvest_id, harvest.animal_id
                ));
            }
        }

        HarvestCommands::List => {
            let harvests = ledger.list_harvests()?;

            if output.is_json() {
                output.data(&harvests);
            } else if harvests.is_empty() {
                println!("No harvests.");
            } else {
                println!(
                    "{:<6} {:<7} {:<12} {:<8} {:<8} YIELD",
                    "ID", "ANIMAL", "DATE", "LIVE_G", "CARC_G"
                );
                println!("{}", "-".repeat(60));
                for h in &harvests {
                    println!(
                        "{:<6} {:<7} {:<12} {:<8} {:<8} {}",
                        h.harvest_id,
                        h.animal_id,
                        h.harvest_date,
                        opt(h.live_weight_grams),
                        opt(h.carcass_weight_grams),
                        pct(h.yield_ratio())
                    );
                }
            }
        }

        HarvestCommands::Update {
            id,
            date,
            live,
            carcass,
            notes,
        } => {
            let patch = HarvestPatch {
                harvest_date: date,
                live_weight_grams: live,
                carcass_weight_grams: carcass,
                notes,
            };
            let harvest = ledger.update_harvest(id, &patch)?;

            if output.is_json() {
                output.data(&harvest);
            } else {
                output.success(&format!("Updated harvest {}", harvest.harvest_id));
            }
        }
    }

    Ok(())
}

pub fn run_feed(cmd: FeedCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        FeedCommands::Add {
            date,
            total,
            unit_cost,
            description,
        } => {
            let cost = ledger.create_feed_cost(NewFeedCost {
                date,
                description,
                cost_per_unit: unit_cost,
                total_cost: total,
            })?;

            if output.is_json() {
                output.data(&cost);
            } else {
                output.success(&format!(
                    "Recorded feed cost {} ({:.2})",
                    cost.feed_cost_id, cost.total_cost
                ));
            }
        }

        FeedCommands::List => {
            let costs = ledger.list_feed_costs()?;

            if output.is_json() {
                output.data(&costs);
            } else if costs.is_empty() {
                println!("No feed costs.");
            } else {
                println!("{:<6} {:<12} {:<10} {:<10} DESCRIPTION", "ID", "DATE", "TOTAL", "PER_UNIT");
                println!("{}", "-".repeat(60));
                for c in &costs {
                    println!(
                        "{:<6} {:<12} {:<10.2} {:<10} {}",
                        c.feed_cost_id,
                        c.date,
                        c.total_cost,
                        num(c.cost_per_unit),
                        opt(c.description.as_deref())
                    );
                }
                let total: f64 = costs.iter().map(|c| c.total_cost).sum();
                println!("{}", "-".repeat(60));
                println!("Total: {:.2}", total);
            }
        }

        FeedCommands::Delete { id } => {
            ledger.delete_feed_cost(id)?;

            if output.is_json() {
                output.data(&serde_json::json!({ "deleted": true, "feed_cost_id": id }));
            } else {
                output.success(&format!("Deleted feed cost {}", id));
            }
        }
    }

    Ok(())
}
