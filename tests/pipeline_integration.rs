//! Integration tests for the HL7 enrichment pipeline
//!
//! These tests drive the public API end to end: queue batches read from disk,
//! tokenizing and projecting, enrichment through fake collaborators and
//! notification dispatch.

use async_trait::async_trait;
use hl7_enricher::app::adapters::log_notifier::LogNotifier;
use hl7_enricher::app::adapters::queue::QueueBatch;
use hl7_enricher::app::collaborators::{
    ClinicalEntity, CollaboratorError, EntityExtractor, GeocodeMatch, GeocodeRequest, Geocoder,
    NotificationTransport,
};
use hl7_enricher::app::models::{EntityCategory, NotificationPayload, RawMessage};
use hl7_enricher::app::services::field_projector::project;
use hl7_enricher::app::services::hl7_parser::tokenize;
use hl7_enricher::app::services::pipeline::{FailedStage, MessageStage, Pipeline, PipelineSettings};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const ADT_A01: &str = "MSH|^~\\&|EPIC|EPICADT|SMS|General Hospital|202401011200||ADT^A01|CTRL-1|P|2.5\r\
EVN|A01|202401011200\r\
PID|1||454721||Doe^Jane||19800101|F|||123 Main St^^Toronto^ON^K1A0B1\r\
PD1|||CLINIC|alice@example.com^Smith^Alice\r\
OBX|1|TX|NOTES||Takes Aspirin 81mg daily for angina";

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn search_place(
        &self,
        request: &GeocodeRequest,
    ) -> Result<Vec<GeocodeMatch>, CollaboratorError> {
        assert_eq!(request.country_code, "CAN");
        Ok(vec![GeocodeMatch {
            latitude: 43.7,
            longitude: -79.4,
            label: "123 Main St, Toronto, ON".to_string(),
        }])
    }
}

struct FixedExtractor;

#[async_trait]
impl EntityExtractor for FixedExtractor {
    async fn detect_entities(
        &self,
        _text: &str,
    ) -> Result<Vec<ClinicalEntity>, CollaboratorError> {
        Ok(vec![
            ClinicalEntity::new(EntityCategory::Medication, "Aspirin")
                .with_attribute("DOSAGE", "81mg"),
            ClinicalEntity::new(EntityCategory::Condition, "angina"),
        ])
    }
}

#[derive(Default)]
struct CollectingTransport {
    sent: Mutex<Vec<NotificationPayload>>,
}

#[async_trait]
impl NotificationTransport for CollectingTransport {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "collecting"
    }
}

fn create_pipeline(transport: Arc<dyn NotificationTransport>) -> Pipeline {
    Pipeline::new(
        Arc::new(FixedGeocoder),
        Arc::new(FixedExtractor),
        transport,
        PipelineSettings::default(),
    )
}

/// Tokenizing and projecting the same text twice yields identical records
#[test]
fn test_tokenize_and_project_are_deterministic() {
    let first = project(&tokenize(ADT_A01).unwrap()).unwrap();
    let second = project(&tokenize(ADT_A01).unwrap()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.get("MSH_10_0"), Some("CTRL-1"));
    assert_eq!(first.get("PID_5_0"), Some("Doe"));
    assert_eq!(first.get("PID_11_2"), Some("Toronto"));
    assert_eq!(first.get("PD1_4_0"), Some("alice@example.com"));
}

/// Line feeds and CRLF terminators produce the same record as carriage returns
#[test]
fn test_terminator_conventions_project_identically() {
    let expected = project(&tokenize(ADT_A01).unwrap()).unwrap();

    let lf = ADT_A01.replace('\r', "\n");
    let crlf = ADT_A01.replace('\r', "\r\n");

    assert_eq!(project(&tokenize(&lf).unwrap()).unwrap(), expected);
    assert_eq!(project(&tokenize(&crlf).unwrap()).unwrap(), expected);
}

/// A well-formed message is enriched and a notification is sent
#[tokio::test]
async fn test_end_to_end_notification() {
    let transport = Arc::new(CollectingTransport::default());
    let pipeline = create_pipeline(transport.clone());

    let report = pipeline
        .process_batch(vec![RawMessage::new(ADT_A01).with_message_id("m-1")])
        .await
        .unwrap();

    assert_eq!(report.stats.completed, 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.stage, MessageStage::Done);
    assert!(outcome.location_attached);
    assert_eq!(outcome.clinical_entries, 2);

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "alice@example.com");
    assert_eq!(sent[0].subject, "New A01 notification for Jane Doe");
    assert!(sent[0].body.contains("Facility: General Hospital"));
    assert!(sent[0].body.contains("Family Doctor: Smith, Alice"));
    assert!(sent[0].body.contains("Medical Conditions on encounter: angina"));
    assert!(sent[0].body.contains("Medications: Aspirin(81mg)"));
}

/// A malformed message fails alone and its neighbours still complete
#[tokio::test]
async fn test_malformed_message_is_isolated() {
    let transport = Arc::new(CollectingTransport::default());
    let pipeline = create_pipeline(transport.clone());

    let messages = vec![
        RawMessage::new(ADT_A01).with_message_id("m-1"),
        RawMessage::new("garbage").with_message_id("m-2"),
        RawMessage::new(ADT_A01.replace("CTRL-1", "CTRL-3")).with_message_id("m-3"),
    ];

    let report = pipeline.process_batch(messages).await.unwrap();

    assert_eq!(report.stats.total, 3);
    assert_eq!(report.stats.completed, 2);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(
        report.outcomes[1].stage,
        MessageStage::Failed(FailedStage::Received)
    );
    assert_eq!(report.outcomes[2].control_id.as_deref(), Some("CTRL-3"));
    assert_eq!(transport.sent.lock().unwrap().len(), 2);
}

/// A batch read from a directory runs through the log notifier
#[tokio::test]
async fn test_directory_batch_with_log_notifier() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.hl7"), ADT_A01).unwrap();
    fs::write(
        temp_dir.path().join("b.hl7"),
        ADT_A01.replace("CTRL-1", "CTRL-2"),
    )
    .unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

    let batch = QueueBatch::from_path(temp_dir.path()).unwrap();
    assert_eq!(batch.len(), 2);

    let notifier = Arc::new(LogNotifier::new());
    let pipeline = create_pipeline(notifier.clone());
    let report = pipeline.process_batch(batch.into_messages()).await.unwrap();

    assert_eq!(report.stats.completed, 2);
    assert_eq!(report.stats.dispatched, 2);
    assert_eq!(notifier.delivered(), 2);
    assert_eq!(report.outcomes[0].control_id.as_deref(), Some("CTRL-1"));
    assert_eq!(report.outcomes[1].control_id.as_deref(), Some("CTRL-2"));
}

/// A batch in which every message is malformed is reported as failed
#[tokio::test]
async fn test_all_malformed_batch_fails() {
    let pipeline = create_pipeline(Arc::new(CollectingTransport::default()));

    let result = pipeline
        .process_batch(vec![RawMessage::new("nope"), RawMessage::new("PID|1")])
        .await;

    assert!(matches!(
        result,
        Err(hl7_enricher::Error::BatchFailed { total: 2 })
    ));
}
