use aqi_crawler::cli::{run, Cli};
use aqi_crawler::error::Result;
use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    run(cli).await
}

fn init_logging(verbose: bool, log_file: Option<&std::path::Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
