//! Sale commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::app::Session;
use super::output::{opt, Output};
use crate::domain::{AnimalId, LitterId, SaleId, SaleRequest, SaleTarget};

#[derive(Subcommand)]
pub enum SaleCommands {
    /// Sell one animal or every unsold kit of a litter
    Add {
        /// Sale date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Sale price
        #[arg(long)]
        price: f64,

        /// Animal sold
        #[arg(long)]
        animal: Option<AnimalId>,

        /// Litter sold as a group
        #[arg(long)]
        litter: Option<LitterId>,

        #[arg(long)]
        buyer: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List sales, most recent first
    List,

    /// Delete a sale and restore the animals it moved
    Delete {
        id: SaleId,
    },
}

fn target_label(target: SaleTarget) -> String {
    match target {
        SaleTarget::Animal(id) => format!("animal {}", id),
        SaleTarget::Litter(id) => format!("litter {}", id),
    }
}

pub fn run(cmd: SaleCommands, session: &mut Session, output: &Output) -> Result<()> {
    let ledger = &mut session.ledger;

    match cmd {
        SaleCommands::Add {
            date,
            price,
            animal,
            litter,
            buyer,
            contact,
            notes,
        } => {
            let sale = ledger.create_sale(SaleRequest {
                sale_date: date,
                sale_price: price,
                buyer_name: buyer,
                buyer_contact: contact,
                notes,
                animal_id: animal,
                litter_id: litter,
            })?;

            if output.is_json() {
                output.data(&sale);
            } else {
                output.success(&format!(
                    "Recorded sale {} of {} for {:.2}",
                    sale.sale_id,
                    target_label(sale.target),
                    sale.sale_price
                ));
            }
        }

        SaleCommands::List => {
            let sales = ledger.list_sales()?;

            if output.is_json() {
                output.data(&sales);
            } else if sales.is_empty() {
                println!("No sales.");
            } else {
                println!("{:<6} {:<12} {:<12} {:<10} BUYER", "ID", "DATE", "TARGET", "PRICE");
                println!("{}", "-".repeat(60));
                for s in &sales {
                    println!(
                        "{:<6} {:<12} {:<12} {:<10.2} {}",
                        s.sale_id,
                        s.sale_date,
                        target_label(s.target),
                        s.sale_price,
                        opt(s.buyer_name.as_deref())
                    );
                }
            }
        }

        SaleCommands::Delete { id } => {
            let reversal = ledger.delete_sale(id)?;

            if output.is_json() {
                output.data(&reversal);
            } else {
                output.success(&format!(
                    "Deleted sale {} and restored {} animal(s)",
                    reversal.sale.sale_id,
                    reversal.restored.len()
                ));
                for (animal_id, status) in &reversal.restored {
                    output.verbose_ctx("sale", &format!("Animal {} -> {}", animal_id, status));
                }
            }
        }
    }

    Ok(())
}
