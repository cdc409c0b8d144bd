//! HL7v2 tokenizer for ADT messages
//!
//! This module splits raw HL7v2 text into a token tree of segments, fields and
//! elements. Component hierarchy stops at the element level: sub-components are
//! kept verbatim inside the element and repetitions become sibling fields.
//!
//! ## Architecture
//!
//! - [`header`] - Encoding character discovery from the MSH segment
//! - [`escape`] - Escape sequence decoding (and the inverse used for fixtures)
//! - [`parser`] - Line normalisation and segment/field/element splitting
//!
//! ## Usage
//!
//! ```rust
//! use hl7_enricher::app::services::hl7_parser::tokenize;
//!
//! # fn example() -> hl7_enricher::Result<()> {
//! let message = tokenize("MSH|^~\\&|EPIC|EPICADT\nPID|||42||Doe^Jane")?;
//! assert_eq!(message.segments.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod escape;
pub mod header;
pub mod parser;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use escape::{decode_escapes, escape_element};
pub use header::read_delimiters;
pub use parser::{normalize_terminators, tokenize};
