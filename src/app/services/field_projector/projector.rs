//! Field projector implementation

use tracing::debug;

use crate::app::models::{Hl7Message, ProjectedRecord};
use crate::constants::SEGMENT_WHITELIST;
use crate::{Error, Result};

/// Projects whitelisted segments of a token tree into a [`ProjectedRecord`]
#[derive(Debug, Clone)]
pub struct FieldProjector {
    whitelist: Vec<String>,
}

impl Default for FieldProjector {
    fn default() -> Self {
        Self::new(SEGMENT_WHITELIST.iter().copied())
    }
}

impl FieldProjector {
    /// Create a projector for the given segment names
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_whitelisted(&self, segment: &str) -> bool {
        self.whitelist.iter().any(|name| name == segment)
    }

    /// Walk segments, fields and elements in document order
    ///
    /// Repeated keys (repeated segments or field repetitions) keep the last
    /// value written. Fails with [`Error::EmptyProjection`] when nothing was
    /// projected.
    pub fn project(&self, message: &Hl7Message) -> Result<ProjectedRecord> {
        let mut record = ProjectedRecord::new();
        let mut skipped = 0usize;

        for segment in message
            .segments
            .iter()
            .filter(|segment| self.is_whitelisted(&segment.name))
        {
            for field in &segment.fields {
                for (index, element) in field.elements.iter().enumerate() {
                    match element.value() {
                        Some(value) => record.insert(format!("{}_{}", field.name, index), value),
                        None => skipped += 1,
                    }
                }
            }
        }

        if record.is_empty() {
            return Err(Error::empty_projection(message.segment_count()));
        }

        debug!(
            keys = record.len(),
            skipped_empty = skipped,
            "projected HL7 message"
        );

        Ok(record)
    }
}

/// Project with the default segment whitelist
pub fn project(message: &Hl7Message) -> Result<ProjectedRecord> {
    FieldProjector::default().project(message)
}
