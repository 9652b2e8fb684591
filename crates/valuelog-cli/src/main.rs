//! valuelog CLI
//!
//! Captures JSON documents and diffs them with the valuelog engines.

use clap::{Parser, Subcommand};
use valuelog_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "valuelog")]
#[command(about = "valuelog - capture and diff value snapshots", long_about = None)]
struct Cli {
    /// Logging profile (dev or prod); logs go to stderr
    #[arg(long, global = true)]
    log_profile: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Capture a JSON document and print its canonical rendering
    Capture(commands::capture::CaptureArgs),
    /// Print the structural diff between two JSON documents
    Diff(commands::diff::DiffArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.log_profile {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Capture(args) => commands::capture::execute(args).map(|()| 0),
        Commands::Diff(args) => commands::diff::execute(args),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
