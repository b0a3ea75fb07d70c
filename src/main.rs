//! `timegrid` CLI - extract class schedules from grid timetable PDFs

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::parse::ParseOptions;

#[derive(Parser)]
#[command(name = "timegrid")]
#[command(about = "Extract structured class schedules from grid timetable PDFs")]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a timetable and print the extraction result as JSON
    Parse {
        /// PDF file, or a runs JSON file produced by `timegrid runs`
        input: PathBuf,

        /// Config file (default: ~/.config/timegrid/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the completion-service refinement pass
        #[arg(long)]
        no_refine: bool,

        /// Refinement timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Dump the positioned text runs of a PDF as JSON
    Runs {
        /// PDF file
        input: PathBuf,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the line-by-line page text sent to the refinement service
    Text {
        /// PDF file or runs JSON file
        input: PathBuf,

        /// Config file (default: ~/.config/timegrid/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective time-slot table
    Slots {
        /// Config file (default: ~/.config/timegrid/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the whole effective configuration as TOML
        #[arg(long)]
        toml: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON
    let filter = if cli.verbose {
        EnvFilter::new("timegrid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Parse {
            input,
            config,
            no_refine,
            timeout,
            output,
            compact,
        } => {
            let options = ParseOptions {
                config,
                no_refine,
                timeout,
                output,
                compact,
            };
            cmd::cmd_parse(&input, options).await?;
        }
        Commands::Runs { input, compact } => {
            cmd::cmd_runs(&input, compact).await?;
        }
        Commands::Text { input, config } => {
            cmd::cmd_text(&input, config.as_deref()).await?;
        }
        Commands::Slots { config, toml } => {
            cmd::cmd_slots(config.as_deref(), toml)?;
        }
    }

    Ok(())
}
