//! Fixed-template notification rendering

use crate::app::models::{EnrichedRecord, NotificationPayload};
use crate::constants::record_keys;

/// Render the notification for an enriched record
///
/// Missing keys render as empty strings; composing never fails.
pub fn compose(record: &EnrichedRecord) -> NotificationPayload {
    NotificationPayload {
        recipient: record.get(record_keys::CLINICIAN_CONTACT).trim().to_string(),
        subject: render_subject(record),
        body: render_body(record),
    }
}

pub fn render_subject(record: &EnrichedRecord) -> String {
    format!(
        "New {} notification for {} {}",
        record.get(record_keys::EVENT_TYPE),
        record.get(record_keys::PATIENT_FIRST_NAME),
        record.get(record_keys::PATIENT_LAST_NAME),
    )
}

pub fn render_body(record: &EnrichedRecord) -> String {
    let lines = [
        format!(
            "Patient Name: {}, {}",
            record.get(record_keys::PATIENT_LAST_NAME),
            record.get(record_keys::PATIENT_FIRST_NAME)
        ),
        format!("Event: {}", record.get(record_keys::EVENT_TYPE)),
        format!("Facility: {}", record.get(record_keys::FACILITY)),
        format!(
            "Family Doctor: {}, {}",
            record.get(record_keys::CLINICIAN_LAST_NAME),
            record.get(record_keys::CLINICIAN_FIRST_NAME)
        ),
        format!(
            "Medical Conditions on encounter: {}",
            record.conditions_display()
        ),
        format!("Medications: {}", record.medications_display()),
    ];
    lines.join("\n")
}
