//! Release Crawler CLI
//!
//! Syncs release metadata into CSV tables kept in a storage directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use release_crawler::{
    error::Result,
    models::Config,
    pipeline::{self, SyncMode, SyncOptions},
    services::HttpSearchBackend,
    storage::{LocalTables, RELEASES_FILE},
    utils::time::format_epoch,
};

/// release-crawler - Package Index Release Sync
#[derive(Parser, Debug)]
#[command(
    name = "release-crawler",
    version,
    about = "Incremental package index release sync"
)]

struct Cli {
    /// Path to storage directory holding config.toml and the CSV tables
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch releases and update the tables (bootstrap on first run)
    Sync,

    /// Validate configuration file
    Validate,

    /// Show current table info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let tables = LocalTables::new(&cli.storage_dir);

    match cli.command {
        Command::Sync => {
            config.validate()?;
            let backend = HttpSearchBackend::new(&config.index)?;
            log::info!("Search service: {}", config.index.base_url);

            let options = SyncOptions {
                show_progress: !cli.quiet,
            };
            let report = pipeline::run_sync(&config, &tables, &backend, options).await?;
            report.log_summary();
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (search service {})", config.index.base_url);
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            match pipeline::select_mode(&tables) {
                SyncMode::Bootstrap => {
                    log::info!("Tables incomplete; next sync will bootstrap.");
                }
                SyncMode::Update => {
                    let existing = tables.load()?;
                    log::info!("Authors: {}", existing.authors.len());
                    log::info!("Distributions: {}", existing.dists.len());
                    log::info!("Releases: {}", existing.releases.len());
                    match existing.watermark() {
                        Some(epoch) => log::info!("Watermark: {}", format_epoch(epoch)?),
                        None => log::info!("No releases in {} yet.", RELEASES_FILE),
                    }
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
