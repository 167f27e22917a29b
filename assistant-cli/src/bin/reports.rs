//! Report management CLI.
//!
//! Commands:
//! - reports list - List your reports
//! - reports show <id> - Show one report with its forecast
//! - reports create --product-name ... - Run a new forecast
//! - reports update <id> --set field=value ... - Change a report's input
//! - reports delete <id> --yes - Delete a report

use anyhow::{bail, Context, Result};
use assistant_cli::commands::parse_assignment;
use assistant_cli::render::{render_report, render_summary};
use assistant_cli::{init_tracing, require, Backend};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shared::models::REGIONS;
use shared::{merge, Config, OverrideSet, ReportInput};
use tracing::info;
use validator::Validate;

#[derive(Parser)]
#[command(name = "reports")]
#[command(about = "Manage demand forecast reports")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your reports
    List,

    /// Show one report
    Show { id: String },

    /// Run a forecast and save it as a new report
    Create {
        #[arg(long)]
        product_name: String,

        /// One of Electronics, Fashion, Jewelry, Automotive, Grocery, Home
        #[arg(long)]
        category: String,

        /// Market tier (Tier-1, Tier-2, Tier-3, Rural) or state
        #[arg(long)]
        region: String,

        #[arg(long)]
        unit_price: f64,

        #[arg(long)]
        inventory: u64,

        /// Forecast date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        model_type: Option<String>,
    },

    /// Change fields of a report's input
    Update {
        id: String,

        /// field=value, repeatable
        #[arg(long = "set", required = true)]
        assignments: Vec<String>,
    },

    /// Delete a report
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let backend = Backend::from_config(&config)?;

    match args.command {
        Commands::List => {
            let reports = require(backend.reports.list().await)?;
            if reports.is_empty() {
                println!("No reports yet");
            }
            for report in &reports {
                println!("{}", render_summary(report));
            }
        }
        Commands::Show { id } => {
            let report = require(backend.reports.fetch(&id).await)?;
            println!("{}", render_report(&report));
        }
        Commands::Create {
            product_name,
            category,
            region,
            unit_price,
            inventory,
            date,
            model_type,
        } => {
            if !REGIONS.contains(&region.as_str()) {
                info!("Region {} is not a market tier, sending it as a state", region);
            }
            let input = ReportInput {
                product_name,
                category,
                region,
                unit_price,
                current_inventory: inventory,
                prediction_date: date,
                model_type,
            };
            let report = require(backend.reports.create(&input).await?)?;
            println!("{}", render_report(&report));
        }
        Commands::Update { id, assignments } => {
            let overrides = assignments
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<shared::Result<OverrideSet>>()?;

            let current = require(backend.reports.fetch(&id).await)?;
            let input = merge(&current.input, &overrides);
            if input == current.input {
                bail!("Nothing to change: no assignment produced a new value");
            }
            input.validate().context("Updated input is invalid")?;

            info!("Updating {} field(s) on report {}", overrides.len(), id);
            let report = require(backend.reports.update(&id, &input).await?)?;
            println!("{}", render_report(&report));
        }
        Commands::Delete { id, yes } => {
            if !yes {
                bail!("Refusing to delete {} without --yes", id);
            }
            if require(backend.reports.delete(&id).await)? {
                println!("Deleted {}", id);
            } else {
                println!("No report {}", id);
            }
        }
    }

    Ok(())
}
