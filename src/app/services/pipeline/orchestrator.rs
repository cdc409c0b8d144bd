//! Batch orchestration with per-message failure isolation

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

use super::stage::MessageStage;
use super::stats::{BatchReport, MessageOutcome};
use crate::{Error, Result};
use crate::app::collaborators::{EntityExtractor, Geocoder, NotificationTransport};
use crate::app::models::{EnrichedRecord, RawMessage};
use crate::app::services::enrichment::{EnrichmentOptions, enrich_address, enrich_clinical};
use crate::app::services::field_projector::FieldProjector;
use crate::app::services::hl7_parser::tokenize;
use crate::app::services::notification::{compose, dispatch, mask_recipient};
use crate::constants::{DEFAULT_MAX_CONCURRENT_MESSAGES, record_keys};

/// Tunables for a pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub enrichment: EnrichmentOptions,
    pub projector: FieldProjector,
    /// Messages processed at once within a batch; 0 means one per CPU
    pub max_concurrent_messages: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            enrichment: EnrichmentOptions::default(),
            projector: FieldProjector::default(),
            max_concurrent_messages: DEFAULT_MAX_CONCURRENT_MESSAGES,
        }
    }
}

impl PipelineSettings {
    pub fn with_max_concurrent_messages(mut self, max_concurrent_messages: usize) -> Self {
        self.max_concurrent_messages = max_concurrent_messages;
        self
    }

    pub fn effective_concurrency(&self) -> usize {
        match self.max_concurrent_messages {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

/// Runs raw messages through tokenize, project, enrich and notify
///
/// Collaborators are injected so tests can substitute fakes. The pipeline
/// holds no per-message state; every message owns its record for the
/// duration of its run.
pub struct Pipeline {
    geocoder: Arc<dyn Geocoder>,
    extractor: Arc<dyn EntityExtractor>,
    transport: Arc<dyn NotificationTransport>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        extractor: Arc<dyn EntityExtractor>,
        transport: Arc<dyn NotificationTransport>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            geocoder,
            extractor,
            transport,
            settings,
        }
    }

    /// Process a batch and fail only if every message failed fatally
    pub async fn process_batch(&self, messages: Vec<RawMessage>) -> Result<BatchReport> {
        self.run_batch(messages, None).await.into_result()
    }

    /// Process a batch, returning outcomes in document order
    ///
    /// Never fails: fatal errors are isolated to their message. Use
    /// [`BatchReport::into_result`] to apply the batch acknowledgement rule.
    pub async fn run_batch(
        &self,
        messages: Vec<RawMessage>,
        progress: Option<&ProgressBar>,
    ) -> BatchReport {
        let started_at = Utc::now();
        let concurrency = self.settings.effective_concurrency();

        info!(
            messages = messages.len(),
            concurrency, "Starting batch processing"
        );

        let outcomes: Vec<MessageOutcome> = stream::iter(messages.into_iter().enumerate())
            .map(|(index, message)| self.process_message(index, message))
            .buffered(concurrency)
            .inspect(|outcome| {
                if let Some(pb) = progress {
                    pb.inc(1);
                    pb.set_message(format!("{} {}", outcome.label(), outcome.stage));
                }
            })
            .collect()
            .await;

        let report = BatchReport::new(started_at, outcomes);
        info!("{}", report.summary());
        report
    }

    /// Run one message through every stage
    ///
    /// Tokenizer and projector errors end the message in a failed stage.
    /// Enrichment and dispatch problems are logged and recorded on the
    /// outcome while the message keeps advancing.
    pub async fn process_message(&self, index: usize, message: RawMessage) -> MessageOutcome {
        let mut outcome = MessageOutcome::received(index, message.message_id.clone());

        if let Err(e) = self.run_stages(&message, &mut outcome).await {
            error!(
                id = %outcome.label(),
                stage = %outcome.stage,
                error = %e,
                "Message processing failed"
            );
            outcome.fail(&e);
        }

        outcome
    }

    async fn run_stages(&self, message: &RawMessage, outcome: &mut MessageOutcome) -> Result<()> {
        let tokens = tokenize(&message.body)?;
        outcome.advance(MessageStage::Tokenized)?;

        let projected = match self.settings.projector.project(&tokens) {
            Ok(projected) => projected,
            Err(e @ Error::EmptyProjection { .. }) => {
                // Projection ran to completion but left nothing to enrich
                outcome.advance(MessageStage::Projected)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        outcome.control_id = projected
            .get(record_keys::MESSAGE_CONTROL_ID)
            .map(str::to_string);
        outcome.advance(MessageStage::Projected)?;
        debug!(id = %outcome.label(), keys = projected.len(), "Projected message");

        let mut record = EnrichedRecord::new(projected);
        let options = &self.settings.enrichment;

        match enrich_address(&mut record, self.geocoder.as_ref(), options).await {
            Ok(attached) => outcome.location_attached = attached,
            Err(e) => {
                warn!(id = %outcome.label(), error = %e, "Address enrichment degraded");
                outcome.enrichment_warnings.push(e.to_string());
            }
        }
        outcome.advance(MessageStage::AddressEnriched)?;

        match enrich_clinical(&mut record, self.extractor.as_ref(), options).await {
            Ok(added) => outcome.clinical_entries = added,
            Err(e) => {
                warn!(id = %outcome.label(), error = %e, "Clinical enrichment degraded");
                outcome.enrichment_warnings.push(e.to_string());
            }
        }
        outcome.advance(MessageStage::ClinicallyEnriched)?;

        let payload = compose(&record);
        match dispatch(&payload, self.transport.as_ref(), options.call_timeout).await {
            Ok(()) => outcome.dispatched = true,
            Err(e) => {
                warn!(id = %outcome.label(), error = %e, "Notification not delivered");
                outcome.dispatch_error = Some(e.to_string());
            }
        }
        outcome.advance(MessageStage::Notified)?;

        info!(
            id = %outcome.label(),
            recipient = %mask_recipient(&payload.recipient),
            dispatched = outcome.dispatched,
            "Message processed"
        );

        outcome.record = Some(record);
        outcome.advance(MessageStage::Done)?;
        Ok(())
    }
}
