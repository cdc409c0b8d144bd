//! Core HL7v2 tokenizer
//!
//! This module normalises segment terminators and splits each segment into
//! fields and elements using the delimiters declared by the MSH header.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::escape::decode_escapes;
use super::header::read_delimiters;
use crate::app::models::{Delimiters, Element, Field, Hl7Message, Segment};
use crate::constants::{HEADER_SEGMENT, MLLP_END_BLOCK, MLLP_START_BLOCK, SEGMENT_DELIMITER};
use crate::{Error, Result};

static SEGMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{2}$").expect("segment name pattern is valid"));

/// Tokenize raw HL7 text into a token tree
///
/// Fails with [`Error::MalformedMessage`] when no segment can be recognised,
/// the first segment is not MSH, or a line does not start with a segment name.
pub fn tokenize(raw: &str) -> Result<Hl7Message> {
    let normalized = normalize_terminators(raw);

    let lines: Vec<&str> = normalized
        .split(SEGMENT_DELIMITER)
        .map(str::trim_start)
        .filter(|line| !line.trim_end().is_empty())
        .collect();

    let header_line = lines
        .first()
        .ok_or_else(|| Error::malformed_message("message contains no segments"))?;
    let delimiters = read_delimiters(header_line)?;

    let mut segments = Vec::with_capacity(lines.len());
    for (line_number, line) in lines.iter().enumerate() {
        let segment = parse_segment(line, &delimiters).map_err(|e| match e {
            Error::MalformedMessage { reason } => {
                Error::malformed_message(format!("segment {}: {}", line_number + 1, reason))
            }
            other => other,
        })?;
        trace!(
            segment = %segment.name,
            fields = segment.fields.len(),
            "tokenized segment"
        );
        segments.push(segment);
    }

    debug!(
        segments = segments.len(),
        field_separator = %delimiters.field,
        "tokenized HL7 message"
    );

    Ok(Hl7Message {
        delimiters,
        segments,
    })
}

/// Convert every line terminator convention to the segment delimiter and drop MLLP framing
pub fn normalize_terminators(raw: &str) -> String {
    raw.trim_matches(|c| c == MLLP_START_BLOCK || c == MLLP_END_BLOCK)
        .replace("\r\n", "\r")
        .replace('\n', "\r")
}

fn parse_segment(line: &str, delimiters: &Delimiters) -> Result<Segment> {
    let mut parts = line.split(delimiters.field);
    let name = parts.next().unwrap_or_default();

    if !SEGMENT_NAME.is_match(name) {
        return Err(Error::malformed_message(format!(
            "'{}' is not a segment name",
            name.chars().take(16).collect::<String>()
        )));
    }

    let mut fields = Vec::new();

    if name == HEADER_SEGMENT {
        // MSH-1 is the separator itself and MSH-2 the encoding characters,
        // neither of which may be split or decoded.
        fields.push(Field {
            name: field_name(name, 1),
            position: 1,
            elements: vec![Element::Value(delimiters.field.to_string())],
        });
        let encoding = parts.next().unwrap_or_default();
        fields.push(Field {
            name: field_name(name, 2),
            position: 2,
            elements: vec![Element::Value(encoding.to_string())],
        });
        for (offset, text) in parts.enumerate() {
            push_field(&mut fields, name, offset + 3, text, delimiters);
        }
    } else {
        for (offset, text) in parts.enumerate() {
            push_field(&mut fields, name, offset + 1, text, delimiters);
        }
    }

    Ok(Segment {
        name: name.to_string(),
        fields,
    })
}

fn push_field(
    fields: &mut Vec<Field>,
    segment: &str,
    position: usize,
    text: &str,
    delimiters: &Delimiters,
) {
    if text.is_empty() {
        return;
    }

    for repetition in text.split(delimiters.repetition) {
        if repetition.is_empty() {
            continue;
        }

        let elements = repetition
            .split(delimiters.component)
            .map(|component| Element::from_decoded(decode_escapes(component, delimiters)))
            .collect();

        fields.push(Field {
            name: field_name(segment, position),
            position,
            elements,
        });
    }
}

fn field_name(segment: &str, position: usize) -> String {
    format!("{}_{}", segment, position)
}
