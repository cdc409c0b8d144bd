//! Per-message outcomes and batch statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stage::MessageStage;
use crate::app::models::EnrichedRecord;
use crate::{Error, Result};

/// What happened to one message of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageOutcome {
    /// Zero-based position in the batch
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// MSH-10 message control id, once projected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_id: Option<String>,
    pub stage: MessageStage,
    /// Fatal error that stopped the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub location_attached: bool,
    pub clinical_entries: usize,
    /// Degraded enrichment steps, already safe to log
    pub enrichment_warnings: Vec<String>,
    pub dispatched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<EnrichedRecord>,
}

impl MessageOutcome {
    pub fn received(index: usize, message_id: Option<String>) -> Self {
        Self {
            index,
            message_id,
            control_id: None,
            stage: MessageStage::Received,
            failure: None,
            location_attached: false,
            clinical_entries: 0,
            enrichment_warnings: Vec::new(),
            dispatched: false,
            dispatch_error: None,
            record: None,
        }
    }

    /// Move to `target`, rejecting transitions the state machine forbids
    pub fn advance(&mut self, target: MessageStage) -> Result<()> {
        self.stage = self.stage.transition(target)?;
        Ok(())
    }

    /// Record a fatal error and move to the matching failed stage
    pub fn fail(&mut self, error: &Error) {
        if let Some(failed) = self.stage.failure() {
            self.stage = failed;
        }
        self.failure = Some(error.to_string());
    }

    pub fn is_failed(&self) -> bool {
        self.stage.is_failed()
    }

    /// Label used in logs and reports: control id, queue id, or batch position
    pub fn label(&self) -> String {
        self.control_id
            .clone()
            .or_else(|| self.message_id.clone())
            .unwrap_or_else(|| format!("#{}", self.index))
    }
}

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub geocoded: usize,
    pub clinical_entries: usize,
    pub enrichment_warnings: usize,
    pub dispatched: usize,
    pub dispatch_failures: usize,
    pub error_messages: Vec<String>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the counters
    pub fn record(&mut self, outcome: &MessageOutcome) {
        self.total += 1;
        if outcome.is_failed() {
            self.failed += 1;
            if let Some(reason) = &outcome.failure {
                self.add_error(format!("{}: {}", outcome.label(), reason));
            }
            return;
        }

        if outcome.stage == MessageStage::Done {
            self.completed += 1;
        }
        if outcome.location_attached {
            self.geocoded += 1;
        }
        self.clinical_entries += outcome.clinical_entries;
        self.enrichment_warnings += outcome.enrichment_warnings.len();
        if outcome.dispatched {
            self.dispatched += 1;
        } else {
            self.dispatch_failures += 1;
        }
    }

    pub fn add_error(&mut self, message: String) {
        self.error_messages.push(message);
    }

    /// Share of messages that got past the fatal stages, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            ((self.total - self.failed) as f64 / self.total as f64) * 100.0
        }
    }

    /// Every message of a non-empty batch failed at a fatal stage
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch Summary: {} messages ({:.1}% success) | Failed: {} | Geocoded: {} | \
             Clinical entries: {} | Dispatched: {} | Dispatch failures: {} | Warnings: {}",
            self.total,
            self.success_rate(),
            self.failed,
            self.geocoded,
            self.clinical_entries,
            self.dispatched,
            self.dispatch_failures,
            self.enrichment_warnings
        )
    }
}

/// Outcomes of a batch in document order plus their statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: BatchStats,
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    pub fn new(started_at: DateTime<Utc>, outcomes: Vec<MessageOutcome>) -> Self {
        let mut stats = BatchStats::new();
        for outcome in &outcomes {
            stats.record(outcome);
        }
        Self {
            started_at,
            finished_at: Utc::now(),
            stats,
            outcomes,
        }
    }

    /// Convert into the queue-level result
    ///
    /// Fails with [`Error::BatchFailed`] only when every message failed at a
    /// fatal stage, so the queue can redeliver the batch.
    pub fn into_result(self) -> Result<BatchReport> {
        if self.stats.all_failed() {
            Err(Error::batch_failed(self.stats.total))
        } else {
            Ok(self)
        }
    }

    pub fn summary(&self) -> String {
        self.stats.summary()
    }
}
