//! Command implementations for the HL7 enricher CLI
//!
//! Each command lives in its own module:
//! - `process`: run a queue batch through the full pipeline
//! - `parse`: tokenize and project a single message
//! - `geocode`: standalone address lookup

pub mod geocode;
pub mod parse;
pub mod process;
pub mod shared;

use crate::cli::args::Commands;

/// Dispatch to the subcommand handler
pub async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Process(process_args) => process::run_process(process_args).await,
        Commands::Parse(parse_args) => parse::run_parse(parse_args),
        Commands::Geocode(geocode_args) => geocode::run_geocode(geocode_args).await,
    }
}

