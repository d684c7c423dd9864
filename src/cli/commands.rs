use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::client::ReqwestFetcher;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Result};
use crate::models::StationCatalog;
use crate::processors::Pipeline;
use crate::readers::StationReader;
use crate::utils::constants::{DEFAULT_CONFIG_FILE, TOKEN_ENV_VAR};
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvStore;

pub async fn run(cli: Cli) -> Result<()> {
    // An explicitly named settings file must exist; the default one may not.
    let config = match cli.config.as_deref() {
        Some(path) => CrawlerConfig::load(Some(path), true)?,
        None => CrawlerConfig::load(Some(Path::new(DEFAULT_CONFIG_FILE)), false)?,
    };

    match cli.command {
        Commands::Crawl {
            token,
            output_file,
            backup_dir,
            max_workers,
            timeout_secs,
            stations_file,
            quiet,
        } => {
            let token = require_token(token)?;

            let config = CrawlerConfig {
                output_file: output_file.unwrap_or(config.output_file),
                backup_dir: backup_dir.unwrap_or(config.backup_dir),
                max_workers: max_workers.unwrap_or(config.max_workers),
                timeout_secs: timeout_secs.unwrap_or(config.timeout_secs),
                stations_file: stations_file.or(config.stations_file),
                ..config
            };
            config.validate()?;

            let catalog = load_catalog(config.stations_file.as_ref())?;
            let client = ReqwestFetcher::new(config.timeout())?;
            let mut pipeline = Pipeline::from_config(&config, catalog, client, token)?;

            let progress = ProgressReporter::new(
                pipeline.catalog().len() as u64,
                "Fetching stations...",
                quiet,
            );
            let summary = pipeline.run(Some(&progress)).await?;
            progress.finish_with_message("Fetch complete");

            for (location, failure) in &summary.failed {
                println!("  ✗ {}: {}", location, failure);
            }
            if let Some(backup) = &summary.backup {
                println!("Backup: {}", backup.display());
            }
            if summary.has_new_records() {
                println!(
                    "✅ Saved {} records to {}",
                    summary.accepted,
                    config.output_file.display()
                );
            } else {
                println!("No new data to save.");
            }
            println!("📊 Summary: {}", summary);
        }

        Commands::Stations { stations_file } => {
            let catalog = load_catalog(stations_file.or(config.stations_file).as_ref())?;

            println!("{} stations:", catalog.len());
            for entry in &catalog {
                println!("  {:<24} @{}", entry.location, entry.station_id);
            }
        }

        Commands::Info { file } => {
            println!("Analyzing store: {}", file.display());

            let store = CsvStore::new(file, config.backup_dir);
            if !store.exists() {
                println!("Store does not exist yet");
                return Ok(());
            }

            let summary = store.summarize()?;
            println!("\n{}", summary.summary());
        }
    }

    Ok(())
}

/// The access token must be present before any client is built.
fn require_token(token: Option<String>) -> Result<String> {
    token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        CrawlError::Config(format!("Missing {} environment variable", TOKEN_ENV_VAR))
    })
}

fn load_catalog(stations_file: Option<&PathBuf>) -> Result<StationCatalog> {
    match stations_file {
        Some(path) => StationReader::new().read_catalog(path),
        None => Ok(StationCatalog::builtin()),
    }
}
