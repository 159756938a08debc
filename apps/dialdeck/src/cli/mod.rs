//! # Dialdeck CLI Module
//!
//! This module implements the CLI interface for Dialdeck.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP control surface (default)
//! - `preview` - Parse a CSV file and show the contacts it would import
//! - `roll` - Run one shuffle in the terminal

mod commands;

use clap::{Parser, Subcommand};
use dialdeck_core::DialdeckError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Dialdeck - shuffle through your contacts and call one.
#[derive(Parser, Debug)]
#[command(name = "dialdeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP control surface
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Parse a CSV file and show the contacts it would import
    Preview {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run one shuffle in the terminal and show where it lands
    Roll {
        /// CSV file to import before rolling
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Fixed RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DialdeckError> {
    let config = crate::config::DeckConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&config, &host, port).await,
        Some(Commands::Preview { file }) => cmd_preview(&file, json_mode).await,
        Some(Commands::Roll { file, seed }) => {
            cmd_roll(&config, file.as_deref(), seed, json_mode).await
        }
        None => cmd_serve(&config, "127.0.0.1", 8080).await,
    }
}
