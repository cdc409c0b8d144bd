//! Address enrichment through the geocoding collaborator

use tracing::{debug, info};

use super::{EnrichmentOptions, EnrichmentStep, EnrichmentUnavailable};
use crate::app::collaborators::{GeocodeMatch, GeocodeRequest, Geocoder, call_with_timeout};
use crate::app::models::{EnrichedRecord, Location, ProjectedRecord};
use crate::constants::record_keys;

/// Address parts read from the projected record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressQuery {
    pub line: String,
    pub municipality: String,
    pub state: String,
    pub postal: String,
}

impl AddressQuery {
    /// Read the four address parts, defaulting absent keys to empty strings
    pub fn from_record(record: &ProjectedRecord) -> Self {
        Self {
            line: record.get_or_empty(record_keys::ADDRESS_LINE).to_string(),
            municipality: record.get_or_empty(record_keys::ADDRESS_CITY).to_string(),
            state: record.get_or_empty(record_keys::ADDRESS_PROVINCE).to_string(),
            postal: record.get_or_empty(record_keys::ADDRESS_POSTAL).to_string(),
        }
    }

    /// Free-text query: line, municipality, state and postal code joined by single spaces
    pub fn text(&self) -> String {
        [
            self.line.as_str(),
            self.municipality.as_str(),
            self.state.as_str(),
            self.postal.as_str(),
        ]
        .join(" ")
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Pick the authoritative location from ranked matches
///
/// The first match wins; `multiple_matches` records that others existed.
pub fn location_from_matches(matches: Vec<GeocodeMatch>) -> Option<Location> {
    let multiple_matches = matches.len() > 1;
    matches.into_iter().next().map(|best| Location {
        latitude: best.latitude,
        longitude: best.longitude,
        label: best.label,
        multiple_matches,
    })
}

/// Geocode the patient address and attach the result to `record`
///
/// Returns whether a location was attached. Zero matches (or a blank
/// address) leave `record.location` untouched, so a location set earlier is
/// never cleared. On error the record is not modified.
pub async fn enrich_address(
    record: &mut EnrichedRecord,
    geocoder: &dyn Geocoder,
    options: &EnrichmentOptions,
) -> Result<bool, EnrichmentUnavailable> {
    let query = AddressQuery::from_record(&record.fields);
    if query.is_blank() {
        debug!("No address on record, skipping geocoding");
        return Ok(false);
    }

    let request = GeocodeRequest {
        text: query.text(),
        country_code: options.country_code.clone(),
    };

    let matches = call_with_timeout(options.call_timeout, geocoder.search_place(&request))
        .await
        .map_err(|cause| EnrichmentUnavailable::new(EnrichmentStep::Address, &request.text, cause))?;

    let match_count = matches.len();
    match location_from_matches(matches) {
        Some(location) => {
            info!(
                matches = match_count,
                label = %location.label,
                "Geocoded patient address"
            );
            record.location = Some(location);
            Ok(true)
        }
        None => {
            debug!(query = %request.text, "No geocoding results found");
            Ok(false)
        }
    }
}
