//! Tests for the enrichment steps
//!
//! Also hosts the fake collaborators reused by the pipeline tests.


use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::app::collaborators::{
    ClinicalEntity, CollaboratorError, EntityExtractor, GeocodeMatch, GeocodeRequest, Geocoder,
    NotificationTransport,
};
use crate::app::models::{EnrichedRecord, NotificationPayload, ProjectedRecord};
use crate::app::services::enrichment::EnrichmentOptions;

/// Geocoder returning a fixed answer and recording requests
pub struct StubGeocoder {
    response: Result<Vec<GeocodeMatch>, CollaboratorError>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<GeocodeRequest>>,
}

impl StubGeocoder {
    pub fn returning(matches: Vec<GeocodeMatch>) -> Self {
        Self {
            response: Ok(matches),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search_place(
        &self,
        request: &GeocodeRequest,
    ) -> Result<Vec<GeocodeMatch>, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// Entity extractor returning a fixed answer and counting calls
pub struct StubExtractor {
    response: Result<Vec<ClinicalEntity>, CollaboratorError>,
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn returning(entities: Vec<ClinicalEntity>) -> Self {
        Self {
            response: Ok(entities),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityExtractor for StubExtractor {
    async fn detect_entities(&self, _text: &str) -> Result<Vec<ClinicalEntity>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Transport recording every payload it is asked to send
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<NotificationPayload>>,
    pub fail_with: Option<CollaboratorError>,
}

impl RecordingTransport {
    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push(payload.clone());
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn channel(&self) -> &'static str {
        "recording"
    }
}

pub fn geocode_match(latitude: f64, longitude: f64, label: &str) -> GeocodeMatch {
    GeocodeMatch {
        latitude,
        longitude,
        label: label.to_string(),
    }
}

/// Record with a Toronto address and the given admission notes
pub fn create_test_record(notes: &str) -> EnrichedRecord {
    let fields: ProjectedRecord = [
        ("PID_5_0", "Doe"),
        ("PID_5_1", "Jane"),
        ("PID_11_0", "123 Main St"),
        ("PID_11_2", "Toronto"),
        ("PID_11_3", "ON"),
        ("PID_11_4", "K1A0B1"),
        ("OBX_5_0", notes),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect();
    EnrichedRecord::new(fields)
}

pub fn create_test_options() -> EnrichmentOptions {
    EnrichmentOptions {
        country_code: "CAN".to_string(),
        call_timeout: Duration::from_millis(200),
    }
}
