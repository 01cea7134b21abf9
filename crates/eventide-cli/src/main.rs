//! Eventide CLI - Command-line inspector for eventide stores

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::item::ItemArgs;

#[derive(Parser)]
#[command(name = "eventide")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the database directory
    #[arg(short, long, default_value = "./data")]
    db_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database information and status
    Status,

    /// Print raw events of one log partition
    Log {
        /// Partition to read
        #[arg(short, long, default_value_t = 1)]
        partition: u8,

        /// Start at this timestamp (nanoseconds)
        #[arg(long, default_value_t = 0)]
        from: u64,

        /// Maximum number of events to print
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },

    /// Print an item's events, aliases and views
    Item {
        /// Item id bytes (UTF-8)
        id: String,

        /// Item type tag
        #[arg(short = 't', long, default_value_t = 1)]
        type_tag: u16,

        /// First slot to load
        #[arg(long, default_value_t = 0)]
        from: u64,

        /// Last slot to load (0 = to the end)
        #[arg(long, default_value_t = 0)]
        to: u64,

        /// Resolve `id` as an alias first
        #[arg(long)]
        alias: bool,
    },

    /// Print the schema registry
    Schema {
        /// Rebuild the registry as of this version instead of the latest
        #[arg(long)]
        at: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Status => {
            commands::status::execute(cli.db_path)?;
        }
        Commands::Log {
            partition,
            from,
            limit,
        } => {
            commands::log::execute(cli.db_path, partition, from, limit)?;
        }
        Commands::Item {
            id,
            type_tag,
            from,
            to,
            alias,
        } => {
            commands::item::execute(cli.db_path, ItemArgs { id, type_tag, from, to, alias })?;
        }
        Commands::Schema { at } => {
            commands::schema::execute(cli.db_path, at)?;
        }
    }

    Ok(())
}
