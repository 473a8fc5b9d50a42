//! Fridgelens CLI - find out what's in the fridge from a photo.
//!
//! Sends fridge photos to a remote vision model (Roboflow object detection or
//! Gemini), prints the ingredients found per image, and the aggregated set.
//!
//! # Usage
//!
//! ```bash
//! # Detect ingredients in every image of the default directory
//! fridgelens detect
//!
//! # Use Roboflow on another directory and draw the boxes
//! fridgelens detect --dir ./photos --backend roboflow --annotate
//!
//! # Serve POST /analyze
//! fridgelens serve --mode detect
//!
//! # Write synthetic fridge photos for testing
//! fridgelens samples
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use fridgelens_core::config::expand_path;
use fridgelens_core::Config;

mod cli;
mod logging;

/// Fridgelens - ingredient detection for fridge photos.
#[derive(Parser, Debug)]
#[command(name = "fridgelens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect ingredients in a directory of images
    Detect(cli::detect::DetectArgs),

    /// Run the HTTP analysis endpoint
    Serve(cli::serve::ServeArgs),

    /// Write synthetic fridge photos
    Samples(cli::samples::SamplesArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Load the config from `--config` (errors are fatal) or the default location
/// (errors fall back to defaults with a warning).
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Ok(Config::load_from(&expand_path(path))?);
    }
    // Logging isn't initialized yet, so use eprintln for config warnings.
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `fridgelens config path`."
            );
            Ok(Config::default())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Fridgelens v{}", fridgelens_core::VERSION);

    match cli.command {
        Commands::Detect(args) => cli::detect::execute(args, config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await.map(|_| ExitCode::SUCCESS),
        Commands::Samples(args) => cli::samples::execute(args, &config)
            .await
            .map(|_| ExitCode::SUCCESS),
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref())
            .await
            .map(|_| ExitCode::SUCCESS),
    }
}
