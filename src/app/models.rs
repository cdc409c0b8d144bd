//! Data models for HL7 enrichment
//!
//! This module contains the core data structures flowing through the pipeline:
//! the raw queue record, the HL7 token tree, the flat projected record, the
//! enriched record and the notification payload rendered from it.

use crate::constants::{HL7_NULL, delimiters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Raw Input
// =============================================================================

/// One queue record carrying a single HL7 message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawMessage {
    /// Queue-assigned identifier, when the transport provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Opaque HL7 text as received
    pub body: String,
}

impl RawMessage {
    /// Create a raw message without a queue identifier
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message_id: None,
            body: body.into(),
        }
    }

    /// Attach the queue identifier
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

// =============================================================================
// Token Tree
// =============================================================================

/// Encoding characters declared by the MSH header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub sub_component: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: delimiters::FIELD,
            component: delimiters::COMPONENT,
            repetition: delimiters::REPETITION,
            escape: delimiters::ESCAPE,
            sub_component: delimiters::SUB_COMPONENT,
        }
    }
}

/// Leaf value of the token tree
///
/// Zero-length components and the HL7 null `""` are kept as [`Element::Empty`]
/// so the projector can skip them while still advancing its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Element {
    Value(String),
    Empty,
}

impl Element {
    /// Build an element from decoded component text
    pub fn from_decoded(text: String) -> Self {
        if text.is_empty() || text == HL7_NULL {
            Element::Empty
        } else {
            Element::Value(text)
        }
    }

    /// Value of a populated element
    pub fn value(&self) -> Option<&str> {
        match self {
            Element::Value(value) => Some(value),
            Element::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }
}

/// One occurrence of a field within a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name in `<SEG>_<position>` form, e.g. `PID_5`
    pub name: String,

    /// One-based field position within the segment
    pub position: usize,

    /// Components in document order
    pub elements: Vec<Element>,
}

/// A named group of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Three-character segment code
    pub name: String,

    /// Field occurrences in document order (repetitions appear as siblings)
    pub fields: Vec<Field>,
}

impl Segment {
    /// First occurrence of the field at `position`
    pub fn field(&self, position: usize) -> Option<&Field> {
        self.fields.iter().find(|field| field.position == position)
    }
}

/// Tokenized HL7 message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hl7Message {
    pub delimiters: Delimiters,
    pub segments: Vec<Segment>,
}

impl Hl7Message {
    /// Segments with the given name in document order
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |segment| segment.name == name)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

// =============================================================================
// Projected Record
// =============================================================================

/// Flat `<FieldName>_<index>` mapping built from whitelisted segments
///
/// Keys are kept sorted so serialisation is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProjectedRecord {
    fields: BTreeMap<String, String>,
}

impl ProjectedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; a later write to the same key replaces the earlier one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value for `key`, or the empty string when absent
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProjectedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ProjectedRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

// =============================================================================
// Clinical Entities
// =============================================================================

/// Category of an entity returned by the clinical-entity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Medication,
    Condition,
    Other,
}

impl EntityCategory {
    /// Decode a service category label; unknown labels map to `Other`
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "medication" => EntityCategory::Medication,
            "medical condition" => EntityCategory::Condition,
            _ => EntityCategory::Other,
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityCategory::Medication => "medication",
            EntityCategory::Condition => "medical condition",
            EntityCategory::Other => "other",
        };
        f.write_str(label)
    }
}

/// Medication or condition discovered in the admission notes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClinicalEntry {
    pub category: EntityCategory,

    /// Entity text as it appeared in the notes
    pub text: String,

    /// Dosage attribute, medications only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
}

impl ClinicalEntry {
    pub fn medication(text: impl Into<String>, dosage: Option<String>) -> Self {
        Self {
            category: EntityCategory::Medication,
            text: text.into(),
            dosage,
        }
    }

    pub fn condition(text: impl Into<String>) -> Self {
        Self {
            category: EntityCategory::Condition,
            text: text.into(),
            dosage: None,
        }
    }
}

impl fmt::Display for ClinicalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dosage {
            Some(dosage) => write!(f, "{}({})", self.text, dosage),
            None => f.write_str(&self.text),
        }
    }
}

// =============================================================================
// Enriched Record
// =============================================================================

/// Geocoded patient location
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,

    /// The geocoder returned more than one candidate; this one ranked first
    #[serde(default)]
    pub multiple_matches: bool,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: label.into(),
            multiple_matches: false,
        }
    }

    /// `lat,lon` pair as a single string
    pub fn coordinates(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Projected record plus the optional attributes added by enrichment
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub fields: ProjectedRecord,
    pub medications: Vec<ClinicalEntry>,
    pub conditions: Vec<ClinicalEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl EnrichedRecord {
    /// Wrap a projected record with empty enrichment attributes
    pub fn new(fields: ProjectedRecord) -> Self {
        Self {
            fields,
            medications: Vec::new(),
            conditions: Vec::new(),
            location: None,
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get_or_empty(key)
    }

    /// Append a clinical entry to the list matching its category
    ///
    /// Returns false for `Other` entries, which are not kept.
    pub fn push_entry(&mut self, entry: ClinicalEntry) -> bool {
        match entry.category {
            EntityCategory::Medication => self.medications.push(entry),
            EntityCategory::Condition => self.conditions.push(entry),
            EntityCategory::Other => return false,
        }
        true
    }

    /// Comma-separated medication display string
    pub fn medications_display(&self) -> String {
        join_entries(&self.medications)
    }

    /// Comma-separated condition display string
    pub fn conditions_display(&self) -> String {
        join_entries(&self.conditions)
    }
}

fn join_entries(entries: &[ClinicalEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Notification
// =============================================================================

/// Rendered provider notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    /// Recipient identifier (clinician contact)
    pub recipient: String,
    pub subject: String,
    pub body: String,
}
