//! JSON-over-HTTP implementations of the collaborator traits
//!
//! Each adapter owns a [`reqwest::Client`] and translates between the
//! service's wire format and the collaborator types. Wire mapping lives in
//! plain functions so it can be tested without a server.

pub mod entity_extractor;
pub mod geocoder;
pub mod notifier;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::app::collaborators::CollaboratorError;
use crate::{Error, Result};

pub use entity_extractor::{HttpEntityExtractor, entities_from_response};
pub use geocoder::{HttpGeocoder, matches_from_response};
pub use notifier::{HttpNotifier, NotificationEnvelope};

/// Build a client whose requests give up after `timeout`
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hl7-enricher/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::configuration(format!("failed to build HTTP client: {}", e)))
}

/// POST a JSON body and decode a JSON response
async fn post_json<B, R>(client: &Client, url: &str, body: &B) -> std::result::Result<R, CollaboratorError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    debug!(url, status = status.as_u16(), "collaborator responded");

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(status_error(status, &text));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| CollaboratorError::MalformedResponse(e.to_string()))
}

/// POST a JSON body where only success or failure matters
async fn post_json_ack<B>(client: &Client, url: &str, body: &B) -> std::result::Result<(), CollaboratorError>
where
    B: Serialize + ?Sized,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, &text))
    }
}

fn transport_error(error: reqwest::Error) -> CollaboratorError {
    if error.is_timeout() {
        CollaboratorError::Transport(format!("request timed out: {}", error))
    } else {
        CollaboratorError::Transport(error.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> CollaboratorError {
    let detail = format!("{} {}", status, body.trim());
    if status.is_client_error() {
        CollaboratorError::Rejected(detail.trim_end().to_string())
    } else {
        CollaboratorError::Transport(detail.trim_end().to_string())
    }
}
