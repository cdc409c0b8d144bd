//! HL7 Enricher Library
//!
//! A Rust library for turning HL7v2 admission/discharge/transfer messages into
//! structured records and enriching them before a provider notification is sent.
//!
//! This library provides tools for:
//! - Tokenizing HL7v2 messages into segments, fields and elements with escape decoding
//! - Projecting whitelisted segments into a flat `<Field>_<index>` record
//! - Geocoding the patient address through a pluggable geocoding service
//! - Extracting medications and conditions from admission notes
//! - Composing and dispatching provider notifications with masked diagnostics
//! - Running whole queue batches with per-message failure isolation

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod collaborators;
    pub mod models;
    pub mod services {
        pub mod enrichment;
        pub mod field_projector;
        pub mod hl7_parser;
        pub mod notification;
        pub mod pipeline;
    }
    pub mod adapters {
        pub mod http;
        pub mod log_notifier;
        pub mod queue;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{EnrichedRecord, Hl7Message, Location, ProjectedRecord};
pub use config::Config;

/// Result type alias for the HL7 enricher
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for HL7 enrichment operations
///
/// Only [`Error::MalformedMessage`] and [`Error::EmptyProjection`] stop a single
/// message. Enrichment and dispatch problems have their own step-level types
/// and never surface here unless a caller converts them explicitly.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Raw message text could not be tokenized
    #[error("Malformed HL7 message: {reason}")]
    MalformedMessage { reason: String },

    /// Tokenized message produced no projected keys
    #[error("Projection produced no fields from {segment_count} segment(s)")]
    EmptyProjection { segment_count: usize },

    /// JSON (de)serialization error
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Queue batch could not be read
    #[error("Queue input error: {message}")]
    QueueInput { message: String },

    /// Orchestrator attempted a stage transition the state machine forbids
    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Every message in a non-empty batch failed at a fatal stage
    #[error("Batch failed: all {total} message(s) failed at a fatal stage")]
    BatchFailed { total: usize },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a malformed message error
    pub fn malformed_message(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Create an empty projection error
    pub fn empty_projection(segment_count: usize) -> Self {
        Self::EmptyProjection { segment_count }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a queue input error
    pub fn queue_input(message: impl Into<String>) -> Self {
        Self::QueueInput {
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create a batch failed error
    pub fn batch_failed(total: usize) -> Self {
        Self::BatchFailed { total }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
