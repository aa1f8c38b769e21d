//! Image Search CLI
//!
//! Command-line front end for similarity search over an image corpus.
//!
//! # Usage
//!
//! ```bash
//! # Images matching a description
//! image-search search a red car on the beach
//!
//! # Images similar to a stored exemplar, with distances
//! image-search neighbors img7.jpg --distances
//!
//! # Explicit configuration file
//! image-search --config config/production.toml search "blue boat" --json
//! ```
//!
//! Without `--config`, configuration comes from `config/default.toml`,
//! `config/{IMAGE_SEARCH_ENV}.toml` and `IMAGE_SEARCH__*` environment
//! variables; `DB_URL` supplies the database URL if nothing else does.
//!
//! # Exit Codes
//!
//! - 0: the query ran (an empty result is still success)
//! - 1: configuration, model or seed data could not be loaded

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use image_search_core::config::Config;
use tracing::{error, info};

mod adapters;
mod bootstrap;
mod commands;
mod logging;

use commands::neighbors::{handle_neighbors, NeighborsArgs};
use commands::search::{handle_search, SearchArgs};

/// Image similarity search
#[derive(Parser)]
#[command(name = "image-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "IMAGE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find images matching a text description
    Search(SearchArgs),
    /// Find images similar to a stored exemplar
    Neighbors(NeighborsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let config = match cli.config.as_deref() {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Error: {}", e);
        return 1;
    }

    info!(
        embedding_backend = %config.embedding.backend,
        storage_backend = %config.storage.backend,
        "image-search starting"
    );

    let orchestrator = match bootstrap::build_orchestrator(&config).await {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    match cli.command {
        Commands::Search(args) => handle_search(&orchestrator, args).await,
        Commands::Neighbors(args) => handle_neighbors(&orchestrator, args).await,
    }
}
