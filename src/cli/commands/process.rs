//! Process command implementation
//!
//! Reads a queue batch, runs it through the pipeline and reports the
//! outcome of every message.

use std::time::Instant;

use anyhow::Context;
use colored::*;
use indicatif::HumanDuration;
use tracing::{debug, info};

use super::shared::{
    build_pipeline, create_progress_bar, load_configuration, read_batch, setup_logging,
};
use crate::app::services::pipeline::{BatchReport, MessageOutcome};
use crate::cli::args::{OutputFormat, ProcessArgs};

/// Process command runner
///
/// 1. Set up logging and load configuration
/// 2. Read the batch and wire the collaborators
/// 3. Run every message with progress reporting
/// 4. Print the report; fail if every message failed fatally
pub async fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();

    setup_logging(&args.logging);
    info!("Starting HL7 enricher");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    if let Some(workers) = args.workers {
        config = config.with_max_concurrent_messages(workers);
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config = config.with_call_timeout_secs(timeout_secs);
    }
    if let Some(channel) = args.channel {
        config = config.with_notification_channel(channel.into());
    }

    let pipeline = build_pipeline(&config, args.dry_run).context("Invalid configuration")?;

    let batch = read_batch(args.input_path().map(|p| p.as_path()))?;
    info!(
        source = %batch.source,
        messages = batch.len(),
        dry_run = args.dry_run,
        "Loaded batch"
    );

    let progress = (args.show_progress() && batch.len() > 1)
        .then(|| create_progress_bar(batch.len() as u64, "Processing messages"));

    let report = pipeline
        .run_batch(batch.into_messages(), progress.as_ref())
        .await;

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Processed {} messages", report.stats.total));
    }

    generate_report(&report, &args, start_time)?;

    report.into_result()?;
    Ok(())
}

fn generate_report(
    report: &BatchReport,
    args: &ProcessArgs,
    start_time: Instant,
) -> anyhow::Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            generate_human_report(report, start_time);
            Ok(())
        }
        OutputFormat::Json => generate_json_report(report, args.include_records),
        OutputFormat::Csv => {
            generate_csv_report(report);
            Ok(())
        }
    }
}

fn generate_human_report(report: &BatchReport, start_time: Instant) {
    let stats = &report.stats;
    let heading = if stats.all_failed() {
        "HL7 Batch Failed".red().bold()
    } else {
        "HL7 Batch Processed".green().bold()
    };

    println!("\n{}", heading);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Batch Summary:");
    println!("   • Messages received: {}", stats.total);
    println!("   • Completed: {}", stats.completed);
    println!("   • Geocoded: {}", stats.geocoded);
    println!("   • Clinical entries: {}", stats.clinical_entries);
    println!("   • Notifications sent: {}", stats.dispatched);
    println!("   • Success rate: {:.1}%", stats.success_rate());
    println!(
        "   • Processing time: {}",
        HumanDuration(start_time.elapsed())
    );

    if stats.failed > 0 {
        println!("{}", format!("   • Failed messages: {}", stats.failed).red());
    }
    if stats.dispatch_failures > 0 {
        println!(
            "{}",
            format!("   • Dispatch failures: {}", stats.dispatch_failures).yellow()
        );
    }
    if stats.enrichment_warnings > 0 {
        println!(
            "{}",
            format!("   • Enrichment warnings: {}", stats.enrichment_warnings).yellow()
        );
    }

    if !report.outcomes.is_empty() {
        println!("\nMessages:");
        for outcome in &report.outcomes {
            println!("   {}", describe_outcome(outcome));
        }
    }

    println!();
}

fn describe_outcome(outcome: &MessageOutcome) -> String {
    let status = if outcome.is_failed() {
        outcome.stage.to_string().red()
    } else if outcome.dispatched {
        outcome.stage.to_string().green()
    } else {
        outcome.stage.to_string().yellow()
    };

    let detail = outcome
        .failure
        .as_deref()
        .or(outcome.dispatch_error.as_deref())
        .unwrap_or_default();

    let mut line = format!("• {} [{}]", outcome.label(), status);
    if let Some(location) = outcome.record.as_ref().and_then(|r| r.location.as_ref()) {
        line.push_str(&format!(" @{}", location.coordinates()));
    }
    if !detail.is_empty() {
        line.push(' ');
        line.push_str(detail);
    }
    line
}

fn generate_json_report(report: &BatchReport, include_records: bool) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(report).context("Failed to serialize batch report")?;

    if !include_records {
        if let Some(outcomes) = value.get_mut("outcomes").and_then(|o| o.as_array_mut()) {
            for outcome in outcomes {
                if let Some(object) = outcome.as_object_mut() {
                    object.remove("record");
                }
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn generate_csv_report(report: &BatchReport) {
    let stats = &report.stats;
    println!("metric,value");
    println!("messages_received,{}", stats.total);
    println!("messages_completed,{}", stats.completed);
    println!("messages_failed,{}", stats.failed);
    println!("geocoded,{}", stats.geocoded);
    println!("clinical_entries,{}", stats.clinical_entries);
    println!("notifications_sent,{}", stats.dispatched);
    println!("dispatch_failures,{}", stats.dispatch_failures);
    println!("enrichment_warnings,{}", stats.enrichment_warnings);
    println!(
        "processing_time_seconds,{}",
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::app::models::{EnrichedRecord, Location, ProjectedRecord};

    #[test]
    fn test_describe_outcome() {
        colored::control::set_override(false);

        let mut failed = MessageOutcome::received(1, Some("queue-1".to_string()));
        failed.fail(&Error::malformed_message("message contains no segments"));
        let text = describe_outcome(&failed);

        assert!(text.contains("queue-1"));
        assert!(text.contains("failed(received)"));
        assert!(text.contains("no segments"));

        let pending = MessageOutcome::received(0, None);
        assert_eq!(describe_outcome(&pending), "• #0 [received]");
    }

    #[test]
    fn test_describe_outcome_with_location() {
        colored::control::set_override(false);

        let mut record = EnrichedRecord::new(ProjectedRecord::new());
        record.location = Some(Location::new(43.7, -79.4, "Toronto, ON"));
        let mut outcome = MessageOutcome::received(2, None);
        outcome.record = Some(record);
        outcome.dispatch_error = Some("no recipient".to_string());

        assert_eq!(
            describe_outcome(&outcome),
            "• #2 [received] @43.7,-79.4 no recipient"
        );
    }
}
