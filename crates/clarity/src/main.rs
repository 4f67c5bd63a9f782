//! Clarity CLI - request an enhanced version of a local image.
//!
//! Clarity sends images to a remote enhancement service (denoise, deblur,
//! light, upscale). When the remote path is unavailable it returns the
//! original image as a data URL and marks the result as a fallback.
//!
//! # Usage
//!
//! ```bash
//! # Enhance a local file
//! clarity enhance photo.jpg
//!
//! # Enhance an image that is already publicly hosted
//! DEEP_IMAGE_API_KEY=... clarity enhance --url https://example.com/photo.jpg
//!
//! # View configuration
//! clarity config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Clarity - request enhanced versions of local images.
#[derive(Parser, Debug)]
#[command(name = "clarity")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Enhance an image file or a public image URL
    Enhance(cli::enhance::EnhanceArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match clarity_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `clarity config path`."
            );
            clarity_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Clarity v{}", clarity_core::VERSION);

    match cli.command {
        Commands::Enhance(args) => cli::enhance::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
