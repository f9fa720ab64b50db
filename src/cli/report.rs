//! Reporting commands: summary, CSV export, metrics and the to-do board

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::app::{today, Session};
use super::output::{num, opt, pct, Output};
use crate::domain::export::{self, ExportFilter, ExportKind};
use crate::domain::report::{self, DateWindow, Summary};
use crate::domain::todo::{self, Todo};
use crate::domain::BreedingResult;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// KPIs and monthly series for a date range
    Summary {
        /// First day included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Export a table as CSV
    Export {
        /// breedings, litters, harvests or feed-costs
        kind: ExportKind,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only breedings with this result
        #[arg(long)]
        result: Option<BreedingResult>,

        /// Write to this file (or directory) instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct TodoArgs {
    /// Day to compute the board for (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Days ahead to list expected kindlings
    #[arg(long)]
    pub kindling_window: Option<u32>,

    /// Litter age in days at which weaning is due
    #[arg(long)]
    pub wean_age: Option<u32>,

    /// Growout age in days at which harvest is due
    #[arg(long)]
    pub harvest_age: Option<u32>,

    /// Maximum entries per list
    #[arg(long)]
    pub limit: Option<u32>,
}

pub fn run(cmd: ReportCommands, session: &mut Session, output: &Output) -> Result<()> {
    let snapshot = session.ledger.snapshot()?;

    match cmd {
        ReportCommands::Summary { from, to } => {
            let summary = report::summarize(&snapshot, DateWindow::new(from, to));

            if output.is_json() {
                output.data(&summary);
            } else {
                print_summary(&summary);
            }
        }

        ReportCommands::Export {
            kind,
            from,
            to,
            result,
            out,
        } => {
            let filter = ExportFilter {
                window: DateWindow::new(from, to),
                result,
            };
            let table = export::build(kind, &snapshot, filter);
            output.verbose_ctx("export", &format!("{} rows of {}", table.rows.len(), kind));

            match out {
                Some(path) => {
                    let path = if path.is_dir() { path.join(kind.file_name()) } else { path };
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    table
                        .write_csv(BufWriter::new(file))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output.success(&format!(
                        "Exported {} {} row(s) to {}",
                        table.rows.len(),
                        kind,
                        path.display()
                    ));
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    table.write_csv(&mut handle).context("Failed to write CSV")?;
                    handle.flush()?;
                }
            }
        }
    }

    Ok(())
}

pub fn metrics(session: &mut Session, output: &Output) -> Result<()> {
    let metrics = report::metrics(&session.ledger.snapshot()?);

    if output.is_json() {
        output.data(&metrics);
    } else {
        println!("Total litters:           {}", metrics.total_litters);
        println!("Average litter size:     {}", num(metrics.average_litter_size));
        println!("Kit survival rate:       {}", pct(metrics.kit_survival_rate));
        println!("Average days to harvest: {}", num(metrics.average_days_to_harvest));
        println!("Harvested rabbits:       {}", metrics.harvested_rabbits);
    }

    Ok(())
}

pub fn todo(args: TodoArgs, session: &mut Session, output: &Output) -> Result<()> {
    let defaults = session.farm.dashboard.params();
    let params = todo::TodoParams {
        kindling_window_days: args.kindling_window.unwrap_or(defaults.kindling_window_days),
        wean_age_days: args.wean_age.unwrap_or(defaults.wean_age_days),
        harvest_age_days: args.harvest_age.unwrap_or(defaults.harvest_age_days),
        limit: args.limit.unwrap_or(defaults.limit),
    };
    params.validate()?;

    let as_of = args.as_of.unwrap_or_else(today);
    output.verbose_ctx("todo", &format!("Board as of {} with {:?}", as_of, params));
    let board = todo::build(&session.ledger.snapshot()?, params, as_of);

    if output.is_json() {
        output.data(&board);
    } else {
        print_todo(&board);
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    let k = &summary.kpis;
    println!(
        "Range: {} to {}",
        opt(summary.range.start),
        opt(summary.range.end)
    );
    println!();
    println!("Litters:                 {}", k.total_litters);
    println!("Average litter size:     {}", num(k.avg_litter_size));
    println!("Survival to wean:        {}", pct(k.survival_to_wean));
    println!("Harvested:               {}", k.harvested_count);
    println!("Average days to harvest: {}", num(k.avg_days_to_harvest));
    println!("Average yield:           {}", pct(k.avg_yield));
    println!("Mortality:               {}", k.mortality_count);
    println!("Feed cost:               {:.2}", k.total_feed_cost);
    println!("Feed cost per month:     {}", num(k.avg_feed_cost_per_month));
    println!("Cost per harvest:        {}", num(k.cost_per_harvested_rabbit));

    let s = &summary.series;
    let mut months: Vec<&str> = s
        .litters
        .points
        .iter()
        .chain(&s.harvests.points)
        .chain(&s.mortality.points)
        .map(|p| p.month.as_str())
        .chain(s.feed_cost.points.iter().map(|p| p.month.as_str()))
        .chain(s.avg_yield.points.iter().map(|p| p.month.as_str()))
        .collect();
    months.sort_unstable();
    months.dedup();

    if months.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<8} {:<8} {:<8} {:<8} {:<9} {:<10} {:<10} FEED",
        "MONTH", "LITTERS", "ALIVE", "WEANED", "HARVESTS", "MORTALITY", "YIELD"
    );
    println!("{}", "-".repeat(75));
    for month in months {
        println!(
            "{:<8} {:<8} {:<8} {:<8} {:<9} {:<10} {:<10} {}",
            month,
            opt(s.litters.value_at(month)),
            opt(s.born_alive.value_at(month)),
            opt(s.weaned.value_at(month)),
            opt(s.harvests.value_at(month)),
            opt(s.mortality.value_at(month)),
            pct(s.avg_yield.value_at(month)),
            num(s.feed_cost.value_at(month))
        );
    }
}

fn print_todo(board: &Todo) {
    println!("To-do as of {}", board.as_of);

    if board.is_empty() {
        println!();
        println!("Nothing due.");
        return;
    }

    if !board.kindlings_due.is_empty() {
        println!();
        println!("Kindlings due (next {} days):", board.params.kindling_window_days);
        for k in &board.kindlings_due {
            println!(
                "  {}  breeding {}  {} x {}",
                k.expected_kindling, k.breeding_id, k.doe_tattoo, k.buck_tattoo
            );
        }
    }

    if !board.weanings_due.is_empty() {
        println!();
        println!("Weanings due ({}+ days old):", board.params.wean_age_days);
        for w in &board.weanings_due {
            println!(
                "  litter {}  kindled {}  {} days  {} born alive",
                w.litter_id, w.kindling_date, w.age_days, w.born_alive
            );
        }
    }

    if !board.harvest_ready.is_empty() {
        println!();
        println!("Ready to harvest ({}+ days old):", board.params.harvest_age_days);
        for h in &board.harvest_ready {
            println!("  {}  born {}  {} days", h.tattoo, h.birth_date, h.age_days);
        }
    }
}
