//! Tests for pipeline orchestration

pub mod stats_tests;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;

use crate::app::collaborators::{ClinicalEntity, CollaboratorError};
use crate::app::models::{EntityCategory, RawMessage};
use crate::app::services::enrichment::EnrichmentOptions;
use crate::app::services::enrichment::tests::{
    RecordingTransport, StubExtractor, StubGeocoder, geocode_match,
};
use crate::app::services::pipeline::{Pipeline, PipelineSettings};

/// ADT^A01 for Jane Doe living at 123 Main St, Toronto
pub fn adt_message(control_id: &str) -> RawMessage {
    let body = [
        format!(
            "MSH|^~\\&|EPIC|EPICADT|SMS|General Hospital|202401011200||ADT^A01|{}|P|2.5",
            control_id
        ),
        "EVN|A01|202401011200".to_string(),
        "PID|1||454721||Doe^Jane||19800101|F|||123 Main St^^Toronto^ON^K1A0B1".to_string(),
        "PD1|||CLINIC|alice@example.com^Smith^Alice".to_string(),
        "OBX|1|TX|NOTES||Takes Aspirin 81mg daily".to_string(),
    ]
    .join("\r");
    RawMessage::new(body).with_message_id(format!("queue-{}", control_id))
}

pub fn malformed_message() -> RawMessage {
    RawMessage::new("this is not an HL7 message").with_message_id("queue-bad")
}

pub fn toronto_geocoder() -> Arc<StubGeocoder> {
    Arc::new(StubGeocoder::returning(vec![geocode_match(
        43.7,
        -79.4,
        "123 Main St, Toronto, ON",
    )]))
}

pub fn aspirin_extractor() -> Arc<StubExtractor> {
    Arc::new(StubExtractor::returning(vec![
        ClinicalEntity::new(EntityCategory::Medication, "Aspirin").with_attribute("DOSAGE", "81mg"),
    ]))
}

pub fn failing_geocoder() -> Arc<StubGeocoder> {
    Arc::new(StubGeocoder::failing(CollaboratorError::Transport(
        "connection reset".to_string(),
    )))
}

pub fn create_test_settings() -> PipelineSettings {
    PipelineSettings {
        enrichment: EnrichmentOptions {
            country_code: "CAN".to_string(),
            call_timeout: Duration::from_millis(200),
        },
        ..PipelineSettings::default()
    }
}

pub fn create_pipeline(
    geocoder: Arc<StubGeocoder>,
    extractor: Arc<StubExtractor>,
    transport: Arc<RecordingTransport>,
) -> Pipeline {
    Pipeline::new(geocoder, extractor, transport, create_test_settings())
}

/// Collects formatted log output written during a test
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a WARN-level subscriber for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
