use clap::Parser;
use hl7_enricher::cli::{args::Args, commands};
use std::process;

fn main() {
    // Load .env before parsing so environment overrides apply
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(command) => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    eprintln!("Failed to listen for CTRL+C: {}", e);
                }
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::Error::from(hl7_enricher::Error::processing_interrupted(
                    "Processing interrupted by user",
                )))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("HL7 Enricher - HL7v2 ADT Parsing, Enrichment and Notification");
    println!("==============================================================");
    println!();
    println!("Parse HL7v2 admission/discharge/transfer messages from a queue batch,");
    println!("geocode the patient address, extract medications and conditions from");
    println!("the admission notes, and notify the patient's family doctor.");
    println!();
    println!("USAGE:");
    println!("    hl7-enricher <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Process a queue batch end to end (main command)");
    println!("    parse       Tokenize and project one message to JSON");
    println!("    geocode     Geocode a single address");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process a queue event document without sending notifications:");
    println!("    hl7-enricher process event.json --dry-run");
    println!();
    println!("    # Process a directory of .hl7 files four at a time:");
    println!("    hl7-enricher process ./inbox -j 4 --output-format json");
    println!();
    println!("    # Show the projected record of a message:");
    println!("    hl7-enricher parse admit.hl7");
    println!();
    println!("    # Geocode an address:");
    println!("    hl7-enricher geocode --address-line \"123 Main St\" --municipality Toronto \\");
    println!("                         --state ON --postal K1A0B1");
    println!();
    println!("For detailed help on any command, use:");
    println!("    hl7-enricher <COMMAND> --help");
}
