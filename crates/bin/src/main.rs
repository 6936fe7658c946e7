//! finsight CLI binary.
//!
//! Provides a command-line interface for financial statement analysis.

mod commands;
mod logging;

use clap::{ArgAction, Parser, Subcommand};
use commands::analyze::AnalyzeArgs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "finsight: financial ratios, sector comparison and growth", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more companies
    Analyze(AnalyzeArgs),

    /// List the ratios of a ratio catalog
    Ratios {
        /// Ratio catalog (JSON); the standard ratios when omitted
        #[arg(long)]
        ratios: Option<PathBuf>,
    },

    /// List known sectors
    Sectors {
        /// Sector averages (CSV) to check coverage against
        #[arg(long)]
        averages: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(&args)?,
        Commands::Ratios { ratios } => commands::catalog::list_ratios(ratios.as_deref())?,
        Commands::Sectors { averages } => commands::catalog::list_sectors(averages.as_deref())?,
    }

    Ok(())
}
