//! # argcheck CLI Module
//!
//! This module implements the CLI interface for argcheck.
//!
//! ## Available Commands
//!
//! - `check` - Validate a document and print the report
//! - `crux` - Print crux notes only
//! - `summary` - Print document statistics only

mod commands;

use argcheck_core::ArgcheckError;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

/// Exit status when a usage error is printed.
pub const EXIT_USAGE: i32 = 2;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// argcheck - validate argument graphs
///
/// Checks structure, references, embedded math, circular reasoning and
/// credence consistency of an argument document, and points out the
/// statements the rest of the argument hinges on.
#[derive(Parser, Debug)]
#[command(name = "argcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress the summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,

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
    /// Validate a document
    Check {
        /// Document to validate (JSON or YAML, `-` for stdin)
        file: PathBuf,

        /// JSON schema to pre-check against instead of the bundled one
        #[arg(long, conflicts_with = "no_schema")]
        schema: Option<PathBuf>,

        /// Skip the schema pre-check
        #[arg(long)]
        no_schema: bool,

        /// Send a HEAD request to every cited http(s) URL
        #[arg(long)]
        check_urls: bool,

        /// Contradiction tolerance around a credence sum of 1
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show crux statements
    Crux {
        /// Document to analyse (JSON or YAML, `-` for stdin)
        file: PathBuf,
    },

    /// Show document statistics
    Summary {
        /// Document to summarise (JSON or YAML, `-` for stdin)
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and return the exit status.
pub async fn execute(cli: Cli) -> Result<i32, ArgcheckError> {
    let output = OutputMode {
        json_mode: cli.json_mode,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Check {
            file,
            schema,
            no_schema,
            check_urls,
            tolerance,
            config,
        }) => {
            let schema = if no_schema {
                SchemaSource::Disabled
            } else {
                schema.map_or(SchemaSource::Bundled, SchemaSource::File)
            };
            let options = CheckOptions {
                file,
                schema,
                check_urls,
                tolerance,
                config,
            };
            cmd_check(&options, output).await
        }
        Some(Commands::Crux { file }) => cmd_crux(&file, output),
        Some(Commands::Summary { file }) => cmd_summary(&file, output),
        None => {
            eprintln!("error: a subcommand is required\n");
            eprintln!("{}", Cli::command().render_usage());
            Ok(EXIT_USAGE)
        }
    }
}
