//! CLI adapter for mcindex
//!
//! Thin clap front end over `core/`, parallel to `http/`. Both depend on
//! `core/` but not on each other.
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!          +------------+------------+
//!          |                         |
//!          v                         v
//! +------------------+      +------------------+
//! |      http/       |      |      cli/        |
//! | (axum adapter)   |      | (clap adapter)   |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::store::{MemoryStore, RecordSource};

/// mcindex - research data search indexing
///
/// Builds and maintains the search index for projects, samples,
/// processes, users and data files, and serves stored file bytes.
#[derive(Parser, Debug)]
#[command(name = "mcindex")]
#[command(version)]
#[command(about = "Search indexing and file serving for research data", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "MC_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index entities from a record store dump
    Index(commands::IndexArgs),

    /// Search the index
    Search(commands::SearchArgs),

    /// Walk a directory tree with a bounded worker pool
    Scan(commands::ScanArgs),

    /// Replay a change feed against the index
    Sync(commands::SyncArgs),

    /// Serve stored files over HTTP
    Serve(commands::ServeArgs),
}

/// Record store dump directory shared by commands that read records
#[derive(clap::Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory of `<table>.json` record dumps
    #[arg(long, env = "MC_DATA_DIR", default_value = "./data/store")]
    pub data: PathBuf,
}

impl DataArgs {
    pub fn load(&self) -> crate::core::error::Result<Arc<dyn RecordSource>> {
        Ok(Arc::new(MemoryStore::load_dir(&self.data)?))
    }
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match cli.command {
        Commands::Index(args) => {
            let services = Services::new(config, args.data.load()?)?;
            commands::index::execute(args, &services, cli.format).await
        }
        Commands::Search(args) => {
            let services = Services::new(config, Arc::new(MemoryStore::new()))?;
            commands::search::execute(args, &services, cli.format).await
        }
        Commands::Scan(args) => commands::scan::execute(args, &config, cli.format).await,
        Commands::Sync(args) => {
            let services = Services::new(config, args.data.load()?)?;
            commands::sync::execute(args, &services, cli.format).await
        }
        Commands::Serve(args) => {
            config.log_config();
            let services = Services::new(config, args.data.load()?)?;
            commands::serve::execute(args, &services).await
        }
    }
}
