//! Breeding commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::app::Session;
use super::output::{opt, Output};
use crate::domain::{AnimalId, BreedingId, BreedingPatch, BreedingResult, NewBreeding};

#[derive(Subcommand)]
pub enum BreedingCommands {
    /// Record a pairing
    Add {
        /// Doe (female) animal id
        #[arg(long)]
        doe: AnimalId,

        /// Buck (male) animal id
        #[arg(long)]
        buck: AnimalId,

        /// Date bred (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// List breedings, most recent first
    List {
        /// Only show breedings with this result
        #[arg(long)]
        result: Option<BreedingResult>,
    },

    /// Update a breeding's result or notes
    Update {
        id: BreedingId,

        /// pending, successful or failed
        #[arg(long)]
        result: Option<BreedingResult>,

        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(cmd: BreedingCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        BreedingCommands::Add { doe, buck, date } => {
            let breeding = ledger.create_breeding(&NewBreeding {
                doe_id: doe,
                buck_id: buck,
                bred_date: date,
            })?;

            if output.is_json() {
                output.data(&breeding);
            } else {
                output.success(&format!(
                    "Recorded breeding {} (expected kindling {})",
                    breeding.breeding_id, breeding.expected_kindling
                ));
            }
        }

        BreedingCommands::List { result } => {
            let breedings: Vec<_> = ledger
                .list_breedings()?
                .into_iter()
                .filter(|b| result.map_or(true, |r| b.result == r))
                .collect();

            if output.is_json() {
                output.data(&breedings);
            } else if breedings.is_empty() {
                println!("No breedings.");
            } else {
                println!(
                    "{:<6} {:<6} {:<6} {:<12} {:<12} RESULT",
                    "ID", "DOE", "BUCK", "BRED", "EXPECTED"
                );
                println!("{}", "-".repeat(60));
                for b in &breedings {
                    println!(
                        "{:<6} {:<6} {:<6} {:<12} {:<12} {}",
                        b.breeding_id, b.doe_id, b.buck_id, b.bred_date, b.expected_kindling, b.result
                    );
                }
            }
        }

        BreedingCommands::Update { id, result, notes } => {
            let breeding = ledger.update_breeding(id, &BreedingPatch { result, notes })?;

            if output.is_json() {
                output.data(&breeding);
            } else {
                output.success(&format!(
                    "Updated breeding {} (result: {}, notes: {})",
                    breeding.breeding_id,
                    breeding.result,
                    opt(breeding.notes.as_deref())
                ));
            }
        }
    }

    Ok(())
}
