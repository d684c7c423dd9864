use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{DEFAULT_OUTPUT_FILE, TOKEN_ENV_VAR};

#[derive(Parser)]
#[command(name = "aqi-crawler")]
#[command(about = "Crawl air-quality and weather readings from WAQI stations into a CSV store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: aqi-crawler.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every station once and append new readings to the store
    Crawl {
        #[arg(long, env = TOKEN_ENV_VAR, hide_env_values = true, help = "WAQI access token")]
        token: Option<String>,

        #[arg(short, long, help = "CSV store path [default: aqi_data.csv]")]
        output_file: Option<PathBuf>,

        #[arg(short, long, help = "Backup directory [default: backups]")]
        backup_dir: Option<PathBuf>,

        #[arg(long, help = "Maximum concurrent requests [default: 10]")]
        max_workers: Option<usize>,

        #[arg(long, help = "Per-request timeout in seconds [default: 20]")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "CSV file with location,station_id columns")]
        stations_file: Option<PathBuf>,

        #[arg(long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// List the stations a crawl would fetch
    Stations {
        #[arg(long, help = "CSV file with location,station_id columns")]
        stations_file: Option<PathBuf>,
    },

    /// Display row counts and latest readings of a store
    Info {
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        file: PathBuf,
    },
}
