//! Best-effort enrichment of projected records
//!
//! Two steps run once per message, address first:
//!
//! 1. **Address**: geocode the patient address and attach a [`Location`]
//! 2. **Clinical**: extract medications and conditions from admission notes
//!
//! Each step returns `Result<_, EnrichmentUnavailable>`. A failed step leaves
//! the record exactly as it was; deciding to log and carry on is the caller's
//! job (see [`crate::app::services::pipeline`]).
//!
//! [`Location`]: crate::app::models::Location

pub mod address;
pub mod clinical;

#[cfg(test)]
pub mod tests;

use std::fmt;
use std::time::Duration;

use crate::app::collaborators::CollaboratorError;
use crate::constants::{DEFAULT_CALL_TIMEOUT, DEFAULT_COUNTRY_CODE};

pub use address::{AddressQuery, enrich_address, location_from_matches};
pub use clinical::{enrich_clinical, entry_from_entity};

/// Settings shared by the enrichment steps
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOptions {
    /// Country filter applied to place searches
    pub country_code: String,
    /// Upper bound on each collaborator call
    pub call_timeout: Duration,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Which enrichment step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStep {
    Address,
    Clinical,
}

impl fmt::Display for EnrichmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentStep::Address => f.write_str("address"),
            EnrichmentStep::Clinical => f.write_str("clinical"),
        }
    }
}

/// An enrichment collaborator could not produce a usable answer
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{step} enrichment unavailable for \"{query}\": {cause}")]
pub struct EnrichmentUnavailable {
    pub step: EnrichmentStep,
    /// Text sent to the collaborator
    pub query: String,
    #[source]
    pub cause: CollaboratorError,
}

impl EnrichmentUnavailable {
    pub fn new(step: EnrichmentStep, query: impl Into<String>, cause: CollaboratorError) -> Self {
        Self {
            step,
            query: query.into(),
            cause,
        }
    }
}
