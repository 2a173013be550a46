//! layer-guard CLI tool.
//!
//! Usage:
//! ```bash
//! layer-guard verify [OPTIONS] [PATH]
//! layer-guard dump [OPTIONS] [PATH]
//! layer-guard show-rules [PATH]
//! layer-guard init [--force] [PATH]
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Layered-architecture dependency checker
#[derive(Parser)]
#[command(name = "layer-guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check dependency facts against the configured rules
    Verify {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Facts file (overrides `[analyzer] facts`)
        #[arg(long)]
        facts: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the dependency graph as JSON
    Dump {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Facts file (overrides `[analyzer] facts`)
        #[arg(long)]
        facts: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print every rule in normalized form
    ShowRules {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Directory to write `layer-guard.toml` into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for inspection results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Verify {
            path,
            facts,
            format,
        } => commands::verify::run(&path, config, facts.as_deref(), format),
        Commands::Dump {
            path,
            facts,
            output,
        } => commands::dump::run(&path, config, facts.as_deref(), output.as_deref()),
        Commands::ShowRules { path } => commands::show_rules::run(&path, config),
        Commands::Init { path, force } => commands::init::run(&path, force),
    };

    result.unwrap_or_else(|err| {
        commands::report_error(&err);
        commands::exit_code_for(&err)
    })
}
