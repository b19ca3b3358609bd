//! Ratecard CLI
//!
//! Resolves negotiated rates against the catalog service or a directory of
//! catalog files.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ratecard::{
    error::Result,
    models::{Config, RateSheet},
    pipeline::{self, ReplayScript, ResolveRequest},
    services::{CatalogProvider, FileCatalog, HttpCatalog},
    utils::fs,
};

/// Ratecard - negotiated TV rate planner
#[derive(Parser, Debug)]
#[command(
    name = "ratecard",
    version,
    about = "Negotiated rate resolution for TV ad plans"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ratecard.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List channels with their resolution class and catalog size
    Channels {
        /// Channels to check (default: configured special and contracted)
        channels: Vec<String>,

        /// Target group column for ratings
        #[arg(long)]
        target_group: Option<String>,

        /// Read catalogs from `<dir>/<channel>.json` instead of the service
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
    },

    /// Resolve the negotiated rates of one channel
    Resolve {
        /// Channel to resolve
        channel: String,

        /// Other channels in the plan
        #[arg(long = "plan", value_delimiter = ',')]
        plan: Vec<String>,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        target_group: Option<String>,

        /// Discount percentage for the channel
        #[arg(long)]
        discount: Option<f64>,

        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Write the rate sheet as JSON instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a recorded JSON event script
    Replay {
        /// Path to the script
        events: PathBuf,

        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn provider(config: &Config, catalog_dir: Option<PathBuf>) -> Result<Arc<dyn CatalogProvider>> {
    Ok(match catalog_dir {
        Some(dir) => {
            log::info!("Reading catalogs from {}", dir.display());
            Arc::new(FileCatalog::new(dir))
        }
        None => Arc::new(HttpCatalog::new(&config.catalog)?),
    })
}

async fn emit(sheet: &RateSheet, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write_json(&path, sheet).await?;
            log::info!("Rate sheet saved to {}", path.display());
        }
        None => print!("{}", pipeline::render_table(sheet)),
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = if cli.config.exists() {
        Config::load_or_default(&cli.config)
    } else {
        log::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };

    match cli.command {
        Command::Channels {
            channels,
            target_group,
            catalog_dir,
        } => {
            config.validate()?;
            let provider = provider(&config, catalog_dir)?;
            let summaries = pipeline::run_channels(
                &config,
                provider.as_ref(),
                &channels,
                target_group.as_deref(),
            )
            .await;

            for summary in &summaries {
                let slots = summary
                    .slots
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                println!(
                    "{:<16} {:<40} {:>6}",
                    summary.channel,
                    format!("{:?}", summary.class),
                    slots
                );
                if let Some(error) = &summary.error {
                    log::warn!("{}: {}", summary.channel, error);
                }
            }
        }

        Command::Resolve {
            channel,
            plan,
            client,
            target_group,
            discount,
            catalog_dir,
            output,
        } => {
            config.validate()?;
            let provider = provider(&config, catalog_dir)?;
            let request = ResolveRequest {
                channels: plan,
                channel,
                client,
                target_group,
                discount,
            };
            let sheet = pipeline::run_resolve(&config, provider, request).await?;
            emit(&sheet, output).await?;
        }

        Command::Replay {
            events,
            catalog_dir,
            output,
        } => {
            config.validate()?;
            let script = ReplayScript::load(&events)?;
            log::info!(
                "Replaying {} events from {}",
                script.events.len(),
                events.display()
            );
            let provider = provider(&config, catalog_dir)?;
            let (sheet, _) = pipeline::run_replay(&config, provider, script).await?;
            emit(&sheet, output).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
