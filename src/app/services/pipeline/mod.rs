//! Pipeline orchestration for HL7 queue batches
//!
//! Each message moves through a fixed sequence of stages:
//!
//! 1. **Tokenize** the raw text (fatal on failure)
//! 2. **Project** whitelisted segments into a flat record (fatal on failure)
//! 3. **Address enrichment** (best-effort)
//! 4. **Clinical enrichment** (best-effort)
//! 5. **Notify** the clinician (failure recorded, message still processed)
//!
//! A batch is acknowledged unless every one of its messages failed fatally.
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hl7_enricher::app::adapters::log_notifier::LogNotifier;
//! use hl7_enricher::app::collaborators::{EntityExtractor, Geocoder};
//! use hl7_enricher::app::models::RawMessage;
//! use hl7_enricher::app::services::pipeline::{Pipeline, PipelineSettings};
//!
//! # async fn example(
//! #     geocoder: Arc<dyn Geocoder>,
//! #     extractor: Arc<dyn EntityExtractor>,
//! #     messages: Vec<RawMessage>,
//! # ) -> hl7_enricher::Result<()> {
//! let pipeline = Pipeline::new(
//!     geocoder,
//!     extractor,
//!     Arc::new(LogNotifier::new()),
//!     PipelineSettings::default(),
//! );
//!
//! let report = pipeline.process_batch(messages).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod stage;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use orchestrator::{Pipeline, PipelineSettings};
pub use stage::{FailedStage, MessageStage};
pub use stats::{BatchReport, BatchStats, MessageOutcome};
