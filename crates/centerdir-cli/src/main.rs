mod diff;
mod lookup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "centerdir")]
#[command(about = "Meditation center directory tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the centers nearest to a coordinate
    Nearest {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Maximum number of centers to list (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Drop centers farther than this many kilometres
        #[arg(long)]
        max_distance_km: Option<f64>,
        /// Also list centers that have no usable coordinates
        #[arg(long)]
        include_unlocated: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Dataset path or URL (overrides `CENTERDIR_DATASET`)
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Summarize the dataset: totals, unlocated centers, regions
    Stats {
        /// Dataset path or URL (overrides `CENTERDIR_DATASET`)
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Compare two dataset revisions and install the canonical new one
    Diff {
        /// Current dataset; overwritten with the formatted new dataset
        #[arg(long, default_value = "Center Locatore.json")]
        old: PathBuf,
        /// Incoming dataset
        #[arg(long, default_value = "Centers_Raw.json")]
        new: PathBuf,
        /// CSV report path (defaults to a timestamped file in the backup directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Directory receiving backups, formatted output and the default report
        #[arg(long, default_value = "backup")]
        backup_dir: PathBuf,
        /// Compare only; leave the old dataset untouched
        #[arg(long)]
        no_update: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Nearest {
            lat,
            lng,
            limit,
            max_distance_km,
            include_unlocated,
            json,
            dataset,
        }) => {
            let config = centerdir_core::load_app_config()?;
            let query = lookup::NearestQuery {
                lat,
                lng,
                limit: limit.unwrap_or(config.nearest_default_limit),
                max_distance_km: max_distance_km.or(config.nearest_max_distance_km),
                include_unlocated,
            };
            lookup::run_nearest(&config, dataset.as_deref(), &query, json).await?;
        }
        Some(Commands::Stats { dataset }) => {
            let config = centerdir_core::load_app_config()?;
            lookup::run_stats(&config, dataset.as_deref()).await?;
        }
        Some(Commands::Diff {
            old,
            new,
            output,
            backup_dir,
            no_update,
        }) => {
            let options = diff::DiffOptions {
                old,
                new,
                output,
                backup_dir,
                update: !no_update,
            };
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            let outcome = diff::run_diff(&options, &timestamp)?;
            diff::print_outcome(&options, &outcome);
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
