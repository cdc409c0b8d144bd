//! Tests for notification composition and dispatch


use crate::app::models::{ClinicalEntry, EnrichedRecord, ProjectedRecord};

/// Enriched record carrying every key the template reads
pub fn create_enriched_record() -> EnrichedRecord {
    let fields: ProjectedRecord = [
        ("MSH_6_0", "General Hospital"),
        ("EVN_1_0", "A01"),
        ("PID_5_0", "Doe"),
        ("PID_5_1", "Jane"),
        ("PD1_4_0", "alice@example.com"),
        ("PD1_4_1", "Smith"),
        ("PD1_4_2", "Alice"),
    ]
    .into_iter()
    .collect();

    let mut record = EnrichedRecord::new(fields);
    record.push_entry(ClinicalEntry::medication("Aspirin", Some("81mg".to_string())));
    record.push_entry(ClinicalEntry::medication("Ventolin", None));
    record.push_entry(ClinicalEntry::condition("angina"));
    record
}
