//! srtlingo - Context-Aware Subtitle Translation
//!
//! Entry point: loads the configuration, applies command line overrides and
//! runs the translation pipeline.

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use srtlingo::cli::{Args, Commands};
use srtlingo::config::Config;
use srtlingo::workflow::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { input_dir, output_dir, source_lang, target_lang, concurrency } => {
            if let Some(input_dir) = input_dir {
                config.directories.input = input_dir;
            }
            if let Some(output_dir) = output_dir {
                config.directories.output = output_dir;
            }
            if let Some(source_lang) = source_lang {
                config.languages.input = source_lang;
            }
            if let Some(target_lang) = target_lang {
                config.languages.output = target_lang;
            }
            if let Some(concurrency) = concurrency {
                config.pipeline.concurrency = concurrency;
            }

            info!(
                "Translating {} -> {}",
                config.directories.input.display(),
                config.directories.output.display()
            );

            let pipeline = Pipeline::from_config(config)?;
            pipeline.translate().await?;
        }
        Commands::Check => {
            let pipeline = Pipeline::from_config(config)?;
            pipeline.check_backend().await?;
            println!("Backend is ready");
        }
        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                bail!("{} already exists, use --force to overwrite it", output.display());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    info!("srtlingo completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".srtlingo").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "srtlingo.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    // No ANSI colors in file
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("srtlingo.log").display());

    Ok(())
}
