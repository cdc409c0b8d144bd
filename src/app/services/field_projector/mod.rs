//! Projection of tokenized HL7 messages into flat records
//!
//! Only whitelisted segments contribute. Each element becomes one key of the
//! form `<FieldName>_<index>`, where the index counts every element of the
//! field occurrence, including skipped empty ones.

pub mod projector;

pub use projector::{FieldProjector, project};
