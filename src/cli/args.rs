//! Command-line argument definitions for the HL7 enricher
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::NotificationChannel;
use crate::constants::SEGMENT_WHITELIST;
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the HL7 enricher
///
/// Parses HL7v2 ADT messages, enriches them with a geocoded patient address
/// and clinical entities from the admission notes, and notifies the family
/// doctor.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hl7-enricher",
    version,
    about = "Parse, enrich and route HL7v2 ADT messages",
    long_about = "Reads a batch of HL7v2 admission/discharge/transfer messages, projects the \
                  MSH, EVN, PID, PV1, PD1 and OBX segments into flat records, geocodes the \
                  patient address, extracts medications and conditions from the admission \
                  notes, and sends a notification to the patient's family doctor."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process a queue batch end to end (main command)
    Process(ProcessArgs),
    /// Tokenize and project one message, printing the record as JSON
    Parse(ParseArgs),
    /// Geocode a single address
    Geocode(GeocodeArgs),
}

/// Verbosity flags shared by every command
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LoggingArgs {
    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl LoggingArgs {
    /// Determine the log level from verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Batch input
    ///
    /// A queue event JSON document, a directory of .hl7 files, or a single
    /// HL7 file. Reads standard input when omitted or `-`.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// hl7-enricher/config.toml in the user config directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Log notifications instead of sending them
    #[arg(
        long = "dry-run",
        help = "Render notifications to the log instead of sending them"
    )]
    pub dry_run: bool,

    /// Messages processed concurrently (0 = one per CPU)
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of messages processed concurrently (0 = one per CPU)"
    )]
    pub workers: Option<usize>,

    /// Per-call collaborator timeout in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Notification channel override
    #[arg(long = "channel", value_enum)]
    pub channel: Option<ChannelArg>,

    /// Include enriched records in JSON output
    #[arg(long = "include-records")]
    pub include_records: bool,

    /// Output format for the batch report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// HL7 file to parse; reads standard input when omitted or `-`
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Segments to project (comma-separated)
    #[arg(
        short = 's',
        long = "segments",
        value_name = "LIST",
        help = "Comma-separated segment whitelist (default: MSH,EVN,PID,PV1,PD1,OBX)"
    )]
    pub segments: Option<SegmentList>,

    /// Print the token tree instead of the projected record
    #[arg(long = "tokens")]
    pub tokens: bool,

    /// Single-line JSON output
    #[arg(long = "compact")]
    pub compact: bool,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Arguments for the geocode command
#[derive(Debug, Clone, Parser)]
pub struct GeocodeArgs {
    #[arg(long = "address-line", value_name = "TEXT", default_value = "")]
    pub address_line: String,

    #[arg(long = "municipality", value_name = "TEXT", default_value = "")]
    pub municipality: String,

    #[arg(long = "state", value_name = "CODE", default_value = "")]
    pub state: String,

    #[arg(long = "postal", value_name = "CODE", default_value = "")]
    pub postal: String,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Output format options for the batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
    /// CSV metrics
    Csv,
}

/// Notification channel as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelArg {
    Email,
    Topic,
}

impl From<ChannelArg> for NotificationChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Email => NotificationChannel::Email,
            ChannelArg::Topic => NotificationChannel::Topic,
        }
    }
}

/// Wrapper for parsing comma-separated segment lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentList {
    pub segments: Vec<String>,
}

impl FromStr for SegmentList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(Error::configuration("No segments specified"));
        }

        for segment in &segments {
            if segment.len() != 3 || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::configuration(format!(
                    "Invalid segment name: {}",
                    segment
                )));
            }
        }

        Ok(SegmentList { segments })
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<&Commands> {
        self.command.as_ref()
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = self.input_path() {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input path does not exist: {}",
                    input.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(Error::configuration("Timeout must be greater than 0 seconds"));
        }

        Ok(())
    }

    /// Input path, `None` meaning standard input
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.logging.quiet && self.output_format == OutputFormat::Human
    }
}

impl ParseArgs {
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }

    /// Segments to project, defaulting to the standard whitelist
    pub fn get_segments(&self) -> Vec<String> {
        match &self.segments {
            Some(list) => list.segments.clone(),
            None => SEGMENT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}
