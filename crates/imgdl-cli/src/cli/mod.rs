//! CLI for the imgdl batch downloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imgdl_core::config;
use std::path::PathBuf;

use commands::{run_check, run_config, run_download};

/// Top-level CLI for the imgdl batch downloader.
#[derive(Debug, Parser)]
#[command(name = "imgdl")]
#[command(about = "imgdl: download every URL of a list into a directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Text file with one URL per line.
    pub urls_file: PathBuf,

    /// Directory the files are written to (created if missing).
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Overwrite existing files instead of picking `name_2.ext`, `name_3.ext`, ...
    #[arg(long)]
    pub rewrite: bool,

    /// Number of parallel downloads (overrides `threads_max` from config).
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Print the SHA-256 of every finished file.
    #[arg(long)]
    pub sha256: bool,

    /// Print one JSON object per completed download.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL of a list.
    Download(DownloadArgs),

    /// Validate a URL list without downloading anything.
    Check {
        /// Text file with one URL per line.
        urls_file: PathBuf,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download(args) => run_download(&cfg, &args)?,
            CliCommand::Check { urls_file } => run_check(&urls_file)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
