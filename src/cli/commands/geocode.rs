//! Geocode command implementation
//!
//! Standalone address lookup, independent of any HL7 message. Prints the
//! best match as `{"Longitude", "Latitude", "Label"}`, or an `Error` or
//! `Exception` object when there is no usable answer.

use serde::Serialize;
use tracing::{info, warn};

use super::shared::{build_geocoder, load_configuration, setup_logging};
use crate::app::collaborators::{
    CollaboratorError, GeocodeMatch, GeocodeRequest, Geocoder, call_with_timeout,
};
use crate::app::services::enrichment::{AddressQuery, location_from_matches};
use crate::cli::args::GeocodeArgs;

/// Result printed by the geocode command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeocodeReport {
    Found {
        #[serde(rename = "Longitude")]
        longitude: f64,
        #[serde(rename = "Latitude")]
        latitude: f64,
        #[serde(rename = "Label")]
        label: String,
    },
    NotFound {
        #[serde(rename = "Error")]
        error: String,
    },
    Failed {
        #[serde(rename = "Exception")]
        exception: String,
    },
}

pub async fn run_geocode(args: GeocodeArgs) -> anyhow::Result<()> {
    setup_logging(&args.logging);

    let config = load_configuration(args.config_file.as_deref())?;
    config.validate_geocoding()?;
    let geocoder = build_geocoder(&config)?;

    let query = AddressQuery {
        line: args.address_line,
        municipality: args.municipality,
        state: args.state,
        postal: args.postal,
    };
    let request = GeocodeRequest {
        text: query.text(),
        country_code: config.geocoding.country_code.clone(),
    };

    let result = call_with_timeout(config.call_timeout(), geocoder.search_place(&request)).await;
    let report = summarize(&request, result);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Turn a geocoder answer into the printed report
pub fn summarize(
    request: &GeocodeRequest,
    result: Result<Vec<GeocodeMatch>, CollaboratorError>,
) -> GeocodeReport {
    match result {
        Ok(matches) => match location_from_matches(matches) {
            Some(location) => {
                info!(query = %request.text, label = %location.label, "Geocoded address");
                GeocodeReport::Found {
                    longitude: location.longitude,
                    latitude: location.latitude,
                    label: location.label,
                }
            }
            None => GeocodeReport::NotFound {
                error: "No geocoding results found".to_string(),
            },
        },
        Err(e) => {
            warn!(query = %request.text, error = %e, "Geocoding failed");
            GeocodeReport::Failed {
                exception: e.to_string(),
            }
        }
    }
}
