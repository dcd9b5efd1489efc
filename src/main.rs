mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use photocal_core::photocal::Photocal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photocal")]
#[command(about = "Turn photos of flyers, posters and tickets into calendar events")]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read an event from a photo, review it, and save it
    Analyze {
        /// Photo to analyze (jpeg, png, gif or webp)
        image: PathBuf,

        /// OpenAI API key (falls back to OPENAI_API_KEY, then a prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Save the extracted event without reviewing it
        #[arg(short, long)]
        yes: bool,
    },
    /// List saved events grouped by day
    Events {
        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month calendar (defaults to the current month)
    Month {
        /// Month to show, as YYYY-MM
        month: Option<String>,
    },
    /// Change a saved event (prompts for each field when no flags are given)
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New time (24-hour HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// New location or description
        #[arg(long)]
        context: Option<String>,
    },
    /// Delete a saved event
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show config and data paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let photocal = Photocal::load()?;

    match cli.command {
        Commands::Analyze {
            image,
            api_key,
            yes,
        } => commands::analyze::run(&photocal, &image, api_key, yes).await,
        Commands::Events { json } => commands::events::run(&photocal, json),
        Commands::Month { month } => commands::month::run(&photocal, month.as_deref()),
        Commands::Edit {
            id,
            title,
            date,
            time,
            context,
        } => commands::edit::run(
            &photocal,
            &id,
            commands::edit::FieldChanges {
                title,
                date,
                time,
                context,
            },
        ),
        Commands::Delete { id, force } => commands::delete::run(&photocal, &id, force),
        Commands::Config => commands::config::run(&photocal),
    }
}

/// Logs go to stderr so they never mix with command output.
/// `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("photocal=debug,photocal_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
