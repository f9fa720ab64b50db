//! Litter commands, including weaning

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::app::Session;
use super::output::{opt, pct, Output};
use crate::domain::{AnimalStatus, BreedingId, KitRequest, LitterId, LitterPatch, NewLitter};

#[derive(Subcommand)]
pub enum LitterCommands {
    /// Record a kindling
    Add {
        /// Breeding the litter came from
        #[arg(long)]
        breeding: BreedingId,

        /// Kindling date (YYYY-MM-DD)
        #[arg(long)]
        kindled: NaiveDate,

        #[arg(long)]
        born_alive: u32,

        #[arg(long, default_value_t = 0)]
        born_dead: u32,

        #[arg(long)]
        weaned: Option<u32>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List litters, most recent first
    List,

    /// Correct a litter's counts or dates
    Update {
        id: LitterId,

        #[arg(long)]
        kindled: Option<NaiveDate>,

        #[arg(long)]
        born_alive: Option<u32>,

        #[arg(long)]
        born_dead: Option<u32>,

        #[arg(long)]
        weaned: Option<u32>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List the kits registered from a litter
    Kits {
        id: LitterId,
    },

    /// Wean a litter and register its kits as animals
    Wean {
        id: LitterId,

        /// Number of kits weaned
        #[arg(long)]
        count: u32,

        /// How many of them are bucks
        #[arg(long)]
        males: Option<u32>,

        /// How many of them are does
        #[arg(long)]
        females: Option<u32>,

        /// Status for the kits (defaults to the farm's kit setting)
        #[arg(long)]
        status: Option<AnimalStatus>,

        /// Tattoo prefix (defaults to L<litter id>)
        #[arg(long)]
        prefix: Option<String>,
    },
}

pub fn run(cmd: LitterCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        LitterCommands::Add {
            breeding,
            kindled,
            born_alive,
            born_dead,
            weaned,
            notes,
        } => {
            let litter = ledger.create_litter(NewLitter {
                breeding_id: breeding,
                kindling_date: kindled,
                born_alive,
                born_dead,
                weaned_count: weaned,
                notes,
            })?;

            if output.is_json() {
                output.data(&litter);
            } else {
                output.success(&format!(
                    "Recorded litter {} ({} born alive)",
                    litter.litter_id, litter.born_alive
                ));
            }
        }

        LitterCommands::List => {
            let litters = ledger.list_litters()?;

            if output.is_json() {
                output.data(&litters);
            } else if litters.is_empty() {
                println!("No litters.");
            } else {
                println!(
                    "{:<6} {:<9} {:<12} {:<6} {:<6} {:<7} SURVIVAL",
                    "ID", "BREEDING", "KINDLED", "ALIVE", "DEAD", "WEANED"
                );
                println!("{}", "-".repeat(60));
                for l in &litters {
                    println!(
                        "{:<6} {:<9} {:<12} {:<6} {:<6} {:<7} {}",
                        l.litter_id,
                        l.breeding_id,
                        l.kindling_date,
                        l.born_alive,
                        l.born_dead,
                        opt(l.weaned_count),
                        pct(l.survival_rate())
                    );
                }
            }
        }

        LitterCommands::Update {
            id,
            kindled,
            born_alive,
            born_dead,
            weaned,
            notes,
        } => {
            let patch = LitterPatch {
                kindling_date: kindled,
                born_alive,
                born_dead,
                weaned_count: weaned,
                notes,
            };
            let litter = ledger.update_litter(id, &patch)?;

            if output.is_json() {
                output.data(&litter);
            } else {
                output.success(&format!("Updated litter {}", litter.litter_id));
            }
        }

        LitterCommands::Kits { id } => {
            let kits = ledger.litter_kits(id)?;

            if output.is_json() {
                output.data(&kits);
            } else if kits.is_empty() {
                println!("No kits registered for litter {}.", id);
            } else {
                println!("{:<6} {:<14} {:<4} STATUS", "ID", "TATTOO", "SEX");
                println!("{}", "-".repeat(40));
                for kit in &kits {
                    println!("{:<6} {:<14} {:<4} {}", kit.animal_id, kit.tattoo, kit.sex, kit.status);
                }
            }
        }

        LitterCommands::Wean {
            id,
            count,
            males,
            females,
            status,
            prefix,
        } => {
            let request = KitRequest {
                male_count: males,
                female_count: females,
                status: status.unwrap_or(session.farm.kits.default_status),
                tattoo_prefix: prefix,
                ..KitRequest::new(count)
            };
            output.verbose_ctx("wean", &format!("Generating kits with {:?}", request));
            let generated = ledger.generate_kits(id, &request)?;

            if output.is_json() {
                output.data(&generated);
            } else {
                output.success(&format!(
                    "Weaned litter {}: registered {} kits ({})",
                    generated.litter_id,
                    generated.created,
                    generated.tattoos.join(", ")
                ));
            }
        }
    }

    Ok(())
}
