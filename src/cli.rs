use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every .srt file in the input directory
    Translate {
        /// Directory containing the subtitle files
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory for translated subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Source language name used in the prompt (e.g. English)
        #[arg(short, long)]
        source_lang: Option<String>,

        /// Target language name used in the prompt (e.g. German)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Number of captions translated at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Check that the translation backend is reachable and the model is available
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Where to write the configuration
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
