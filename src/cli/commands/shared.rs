//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, input reading and collaborator
//! wiring used by more than one command.

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::Result;
use crate::app::adapters::http::{HttpEntityExtractor, HttpGeocoder, HttpNotifier, build_client};
use crate::app::adapters::log_notifier::LogNotifier;
use crate::app::adapters::queue::QueueBatch;
use crate::app::collaborators::NotificationTransport;
use crate::app::services::pipeline::Pipeline;
use crate::cli::args::LoggingArgs;
use crate::config::{Config, NotificationChannel};

/// Set up structured logging to stderr
pub fn setup_logging(args: &LoggingArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hl7_enricher={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load layered configuration: defaults, file, environment
pub fn load_configuration(config_file: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(config_file).with_context(|| match config_file {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Read a batch from a path or standard input
pub fn read_batch(input: Option<&Path>) -> anyhow::Result<QueueBatch> {
    match input {
        Some(path) => QueueBatch::from_path(path)
            .with_context(|| format!("Failed to read batch from {}", path.display())),
        None => QueueBatch::from_reader("stdin", io::stdin().lock())
            .context("Failed to read batch from standard input"),
    }
}

pub fn build_geocoder(config: &Config) -> Result<HttpGeocoder> {
    let client = build_client(config.call_timeout())?;
    Ok(HttpGeocoder::new(
        client,
        &config.geocoding.endpoint,
        &config.geocoding.index_name,
    ))
}

/// Notification transport for the configured channel
///
/// Dry runs log notifications instead of sending them.
pub fn build_transport(config: &Config, dry_run: bool) -> Result<Arc<dyn NotificationTransport>> {
    if dry_run {
        return Ok(Arc::new(LogNotifier::new()));
    }

    config.validate_notification()?;
    let client = build_client(config.call_timeout())?;
    let endpoint = &config.notification.endpoint;

    let notifier = match config.notification.channel {
        NotificationChannel::Email => HttpNotifier::email(
            client,
            endpoint,
            &config.sender,
            &config.notification.charset,
        ),
        NotificationChannel::Topic => {
            HttpNotifier::topic(client, endpoint, config.topic_arn().unwrap_or_default())
        }
    };
    Ok(Arc::new(notifier))
}

/// Wire HTTP collaborators into a pipeline
pub fn build_pipeline(config: &Config, dry_run: bool) -> Result<Pipeline> {
    config.validate()?;

    let geocoder = Arc::new(build_geocoder(config)?);
    let extractor = Arc::new(HttpEntityExtractor::new(
        build_client(config.call_timeout())?,
        &config.clinical.endpoint,
    ));
    let transport = build_transport(config, dry_run)?;

    Ok(Pipeline::new(
        geocoder,
        extractor,
        transport,
        config.pipeline_settings(),
    ))
}

/// Create a progress bar with consistent styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
