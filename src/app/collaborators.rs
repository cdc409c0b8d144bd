//! Contracts for the external services the pipeline consumes
//!
//! The orchestrator only ever talks to these traits. Production wiring uses the
//! HTTP adapters in [`crate::app::adapters::http`]; tests substitute fakes.

use crate::app::models::{EntityCategory, NotificationPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a collaborator call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("call timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// Geocoding
// =============================================================================

/// Free-text place search restricted to one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeocodeRequest {
    pub text: String,
    pub country_code: String,
}

/// One ranked place match
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeocodeMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for places matching the request, best match first
    ///
    /// An empty vector is a valid answer, not an error.
    async fn search_place(
        &self,
        request: &GeocodeRequest,
    ) -> Result<Vec<GeocodeMatch>, CollaboratorError>;
}

// =============================================================================
// Clinical Entities
// =============================================================================

/// Key/value attribute attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntityAttribute {
    pub kind: String,
    pub text: String,
}

/// Entity discovered in free text, category already decoded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClinicalEntity {
    pub category: EntityCategory,
    pub text: String,
    #[serde(default)]
    pub attributes: Vec<EntityAttribute>,
}

impl ClinicalEntity {
    pub fn new(category: EntityCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, kind: impl Into<String>, text: impl Into<String>) -> Self {
        self.attributes.push(EntityAttribute {
            kind: kind.into(),
            text: text.into(),
        });
        self
    }

    /// Text of the first attribute of the given kind (case-insensitive)
    pub fn attribute(&self, kind: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.kind.eq_ignore_ascii_case(kind))
            .map(|attribute| attribute.text.as_str())
    }
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Detect clinical entities in `text`
    async fn detect_entities(&self, text: &str) -> Result<Vec<ClinicalEntity>, CollaboratorError>;
}

// =============================================================================
// Notification Transport
// =============================================================================

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver a rendered notification; only success or failure is observed
    async fn send(&self, payload: &NotificationPayload) -> Result<(), CollaboratorError>;

    /// Short channel name for logs
    fn channel(&self) -> &'static str;
}

/// Run a collaborator call with an upper bound on its duration
///
/// Hitting the bound yields [`CollaboratorError::Timeout`].
pub async fn call_with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout {
            millis: timeout.as_millis() as u64,
        }),
    }
}
