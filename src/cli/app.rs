//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{animal, breeding, harvest, litter, report, sale};
use crate::storage::{Config, Farm, FarmConfig, Ledger};

#[derive(Parser)]
#[command(name = "rabbitry")]
#[command(author, version, about = "Local-first production tracker for meat rabbit herds")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Ledger database to use instead of the farm's
    #[arg(long, global = true, env = "RABBITRY_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a farm directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage animals
    #[command(subcommand)]
    Animal(animal::AnimalCommands),

    /// Manage breedings
    #[command(subcommand)]
    Breeding(breeding::BreedingCommands),

    /// Manage litters and weaning
    #[command(subcommand)]
    Litter(litter::LitterCommands),

    /// Record and list harvests
    #[command(subcommand)]
    Harvest(harvest::HarvestCommands),

    /// Record and list feed purchases
    #[command(subcommand)]
    Feed(harvest::FeedCommands),

    /// Record, list and undo sales
    #[command(subcommand)]
    Sale(sale::SaleCommands),

    /// Production reports and CSV exports
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Whole-herd headline numbers
    Metrics,

    /// Kindlings, weanings and harvests coming due
    Todo(report::TodoArgs),
}

/// An open ledger plus the farm settings that apply to it
pub struct Session {
    pub ledger: Ledger,
    pub farm: FarmConfig,
}

impl Session {
    /// Opens `db` when given, otherwise the ledger of the enclosing farm
    pub fn open(db: Option<&Path>, output: &Output) -> Result<Self> {
        match db {
            Some(path) => {
                output.verbose_ctx("ledger", &format!("Using ledger at {}", path.display()));
                let ledger = Ledger::open(path)
                    .with_context(|| format!("Failed to open ledger: {}", path.display()))?;
                let config = Config::load()?;
                if config.is_in_farm() {
                    output.verbose_ctx("ledger", "Applying settings of the enclosing farm");
                }
                Ok(Self {
                    ledger,
                    farm: config.farm,
                })
            }
            None => {
                let farm = Farm::open_current()?;
                output.verbose_ctx("ledger", &format!("Using ledger at {}", farm.ledger_path().display()));
                Ok(Self {
                    ledger: farm.ledger()?,
                    farm: farm.config().farm.clone(),
                })
            }
        }
    }
}

/// Installs the tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "rabbitry=debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|config| OutputFormat::from(config.global.default_format))
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);
    let db = cli.db.as_deref();

    output.verbose("rabbitry starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing farm at: {}", path));
            let farm = Farm::init(&path)?;
            output.verbose_ctx("init", &format!("Ledger at: {}", farm.ledger_path().display()));
            output.success(&format!("Initialized rabbitry farm at {}", farm.root().display()));
        }

        Commands::Animal(cmd) => animal::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Breeding(cmd) => breeding::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Litter(cmd) => litter::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Harvest(cmd) => harvest::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Feed(cmd) => harvest::run_feed(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Sale(cmd) => sale::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Report(cmd) => report::run(cmd, &mut Session::open(db, &output)?, &output)?,
        Commands::Metrics => report::metrics(&mut Session::open(db, &output)?, &output)?,
        Commands::Todo(args) => report::todo(args, &mut Session::open(db, &output)?, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Today's date in local time
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
