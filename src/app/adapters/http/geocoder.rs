//! Place-index geocoding over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::post_json;
use crate::app::collaborators::{CollaboratorError, GeocodeMatch, GeocodeRequest, Geocoder};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchPlaceRequest<'a> {
    index_name: &'a str,
    text: &'a str,
    filter_countries: [&'a str; 1],
}

/// Place search response, reduced to the fields the pipeline reads
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchPlaceResponse {
    #[serde(default)]
    pub results: Vec<SearchPlaceResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchPlaceResult {
    pub place: Option<Place>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Place {
    #[serde(default)]
    pub label: String,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// `[longitude, latitude]`
    #[serde(default)]
    pub point: Vec<f64>,
}

/// Convert a search response into ranked matches
///
/// A result without a two-element point makes the whole response malformed.
pub fn matches_from_response(
    response: SearchPlaceResponse,
) -> Result<Vec<GeocodeMatch>, CollaboratorError> {
    response
        .results
        .into_iter()
        .enumerate()
        .map(|(rank, result)| {
            let place = result.place.ok_or_else(|| {
                CollaboratorError::MalformedResponse(format!("result {} has no Place", rank))
            })?;
            match place.geometry.as_ref().map(|g| g.point.as_slice()) {
                Some([longitude, latitude, ..]) => Ok(GeocodeMatch {
                    latitude: *latitude,
                    longitude: *longitude,
                    label: place.label,
                }),
                _ => Err(CollaboratorError::MalformedResponse(format!(
                    "result {} has no Geometry.Point",
                    rank
                ))),
            }
        })
        .collect()
}

/// Geocoder backed by a place-index search endpoint
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
    index_name: String,
}

impl HttpGeocoder {
    pub fn new(client: Client, endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            index_name: index_name.into(),
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn search_place(
        &self,
        request: &GeocodeRequest,
    ) -> Result<Vec<GeocodeMatch>, CollaboratorError> {
        let body = SearchPlaceRequest {
            index_name: &self.index_name,
            text: &request.text,
            filter_countries: [request.country_code.as_str()],
        };
        let response: SearchPlaceResponse = post_json(&self.client, &self.endpoint, &body).await?;
        matches_from_response(response)
    }
}
