//! CLI for the mdsweep assets cleaner.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdsweep_core::config;
use std::path::PathBuf;

use commands::{run_clean, run_scan};

/// Top-level CLI for the mdsweep assets cleaner.
#[derive(Debug, Parser)]
#[command(name = "mdsweep")]
#[command(about = "mdsweep: move unreferenced images out of a Markdown assets folder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Report which images in the document's assets folder are unreferenced,
    /// without moving anything.
    Scan {
        /// Path to the Markdown document.
        file: PathBuf,
    },

    /// Move unreferenced images into the assets folder's deleted_images
    /// backup subfolder.
    Clean {
        /// Path to the Markdown document.
        file: PathBuf,

        /// Only print the summary, not per-file and progress lines.
        #[arg(long)]
        quiet: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Scan { file } => run_scan(&file, &cfg),
            CliCommand::Clean { file, quiet } => run_clean(&file, &cfg, quiet),
        }
    }
}
