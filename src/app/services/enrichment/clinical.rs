//! Clinical enrichment through the entity extraction collaborator

use tracing::{debug, info};

use super::{EnrichmentOptions, EnrichmentStep, EnrichmentUnavailable};
use crate::app::collaborators::{ClinicalEntity, EntityExtractor, call_with_timeout};
use crate::app::models::{ClinicalEntry, EnrichedRecord, EntityCategory};
use crate::constants::{DOSAGE_ATTRIBUTE, record_keys};

/// Convert an extracted entity into a record entry
///
/// Medications carry their first dosage attribute; categories other than
/// medication and condition are dropped.
pub fn entry_from_entity(entity: ClinicalEntity) -> Option<ClinicalEntry> {
    match entity.category {
        EntityCategory::Medication => {
            let dosage = entity.attribute(DOSAGE_ATTRIBUTE).map(str::to_string);
            Some(ClinicalEntry::medication(entity.text, dosage))
        }
        EntityCategory::Condition => Some(ClinicalEntry::condition(entity.text)),
        EntityCategory::Other => None,
    }
}

/// Extract medications and conditions from the admission notes into `record`
///
/// Returns the number of entries appended. Blank notes yield `Ok(0)`
/// without calling the collaborator. On error the record is not modified.
pub async fn enrich_clinical(
    record: &mut EnrichedRecord,
    extractor: &dyn EntityExtractor,
    options: &EnrichmentOptions,
) -> Result<usize, EnrichmentUnavailable> {
    let notes = record.get(record_keys::ADMISSION_NOTES).to_string();
    if notes.trim().is_empty() {
        debug!("No admission notes on record, skipping entity extraction");
        return Ok(0);
    }

    let entities = call_with_timeout(options.call_timeout, extractor.detect_entities(&notes))
        .await
        .map_err(|cause| EnrichmentUnavailable::new(EnrichmentStep::Clinical, &notes, cause))?;

    let discovered = entities.len();
    let mut added = 0;
    for entry in entities.into_iter().filter_map(entry_from_entity) {
        if record.push_entry(entry) {
            added += 1;
        }
    }

    info!(
        discovered,
        medications = record.medications.len(),
        conditions = record.conditions.len(),
        "Extracted clinical entities from admission notes"
    );

    Ok(added)
}
