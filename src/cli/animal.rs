//! Animal commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::app::{today, Session};
use super::output::{opt, Output};
use crate::domain::{Animal, AnimalId, AnimalStatus, LitterId, NewAnimal, Sex, StatusChange};
use crate::storage::AnimalQuery;

#[derive(Subcommand)]
pub enum AnimalCommands {
    /// Register an animal
    Add {
        /// Ear tattoo (unique)
        tattoo: String,

        /// Sex: M, F or U
        #[arg(long, short)]
        sex: Sex,

        /// Initial status: breeder, growout or sold
        #[arg(long, default_value = "breeder")]
        status: AnimalStatus,

        #[arg(long)]
        breed: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,

        /// Where the animal came from
        #[arg(long)]
        source: Option<String>,

        /// Litter the animal was born into
        #[arg(long)]
        litter: Option<LitterId>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List animals, newest first
    List {
        /// Only show animals with this status
        #[arg(long)]
        status: Option<AnimalStatus>,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = AnimalQuery::DEFAULT_LIMIT)]
        limit: u32,
    },

    /// Show one animal
    Show {
        id: AnimalId,
    },

    /// Change an animal's status
    Status {
        id: AnimalId,

        /// New status
        status: AnimalStatus,

        /// Date of death (defaults to today when marking deceased)
        #[arg(long)]
        death_date: Option<NaiveDate>,

        /// Cause of death
        #[arg(long)]
        reason: Option<String>,
    },

    /// Delete an animal with no breedings or harvest
    Delete {
        id: AnimalId,
    },
}

pub fn run(cmd: AnimalCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        AnimalCommands::Add {
            tattoo,
            sex,
            status,
            breed,
            color,
            birth_date,
            source,
            litter,
            notes,
        } => {
            let new = NewAnimal {
                breed,
                color,
                birth_date,
                source,
                litter_id: litter,
                notes,
                ..NewAnimal::new(tattoo, sex, status)
            };
            let animal = ledger.create_animal(new)?;

            if output.is_json() {
                output.data(&animal);
            } else {
                output.success(&format!("Added animal {} ({})", animal.animal_id, animal.tattoo));
            }
        }

        AnimalCommands::List {
            status,
            offset,
            limit,
        } => {
            let query = AnimalQuery {
                status,
                offset,
                limit,
            };
            output.verbose_ctx("animal", &format!("Listing with {:?}", query));
            let animals = ledger.list_animals(&query)?;

            if output.is_json() {
                output.data(&animals);
            } else if animals.is_empty() {
                println!("No animals.");
            } else {
                print_table(&animals);
            }
        }

        AnimalCommands::Show { id } => {
            let animal = ledger.get_animal(id)?;

            if output.is_json() {
                output.data(&animal);
            } else {
                print_detail(&animal);
            }
        }

        AnimalCommands::Status {
            id,
            status,
            death_date,
            reason,
        } => {
            let change = StatusChange {
                death_date,
                death_reason: reason,
                ..StatusChange::to(status)
            };
            let animal = ledger.update_animal_status(id, &change, today())?;

            if output.is_json() {
                output.data(&animal);
            } else {
                output.success(&format!("Animal {} is now {}", animal.tattoo, animal.status));
            }
        }

        AnimalCommands::Delete { id } => {
            let animal = ledger.delete_animal(id)?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "deleted": true,
                    "animal_id": animal.animal_id,
                }));
            } else {
                output.success(&format!("Deleted animal {} ({})", animal.animal_id, animal.tattoo));
            }
        }
    }

    Ok(())
}

fn print_table(animals: &[Animal]) {
    println!(
        "{:<6} {:<14} {:<4} {:<10} {:<12} {:<8} BREED",
        "ID", "TATTOO", "SEX", "STATUS", "BORN", "LITTER"
    );
    println!("{}", "-".repeat(70));
    for animal in animals {
        println!(
            "{:<6} {:<14} {:<4} {:<10} {:<12} {:<8} {}",
            animal.animal_id,
            animal.tattoo,
            animal.sex,
            animal.status,
            opt(animal.birth_date),
            opt(animal.litter_id),
            opt(animal.breed.as_deref())
        );
    }
}

fn print_detail(animal: &Animal) {
    println!("Animal: {} ({})", animal.tattoo, animal.animal_id);
    println!("Sex: {}", animal.sex);
    println!("Status: {}", animal.status);
    if let Some(breed) = &animal.breed {
        println!("Breed: {}", breed);
    }
    if let Some(color) = &animal.color {
        println!("Color: {}", color);
    }
    if let Some(born) = animal.birth_date {
        match animal.age_on(today()) {
            Some(days) => println!("Born: {} ({} days)", born, days),
            None => println!("Born: {}", born),
        }
    }
    if let Some(source) = &animal.source {
        println!("Source: {}", source);
    }
    if let Some(litter) = animal.litter_id {
        println!("Litter: {}", litter);
    }
    if let Some(died) = animal.death_date {
        println!("Died: {} ({})", died, opt(animal.death_reason.as_deref()));
    }
    if let Some(notes) = &animal.notes {
        println!();
        println!("{}", notes);
    }
}
