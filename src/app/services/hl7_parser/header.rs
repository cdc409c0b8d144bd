//! Encoding character discovery from the MSH header
//!
//! The field separator is the character immediately after `MSH`; MSH-2 then
//! lists the component, repetition, escape and sub-component characters.

use crate::app::models::Delimiters;
use crate::constants::HEADER_SEGMENT;
use crate::{Error, Result};

/// Read the delimiters declared by an MSH segment line
pub fn read_delimiters(header_line: &str) -> Result<Delimiters> {
    let rest = header_line.strip_prefix(HEADER_SEGMENT).ok_or_else(|| {
        Error::malformed_message(format!(
            "first segment must be {}, found '{}'",
            HEADER_SEGMENT,
            header_line.chars().take(3).collect::<String>()
        ))
    })?;

    let mut chars = rest.chars();
    let field = chars
        .next()
        .ok_or_else(|| Error::malformed_message("MSH segment has no field separator"))?;

    if field.is_ascii_alphanumeric() || field.is_whitespace() {
        return Err(Error::malformed_message(format!(
            "invalid field separator '{}'",
            field
        )));
    }

    let encoding: Vec<char> = chars.take_while(|c| *c != field).collect();
    if encoding.len() < 4 {
        return Err(Error::malformed_message(format!(
            "MSH-2 declares {} encoding character(s), expected 4",
            encoding.len()
        )));
    }

    let delimiters = Delimiters {
        field,
        component: encoding[0],
        repetition: encoding[1],
        escape: encoding[2],
        sub_component: encoding[3],
    };

    let mut seen = vec![delimiters.field];
    for c in &encoding[..4] {
        if seen.contains(c) {
            return Err(Error::malformed_message(format!(
                "encoding character '{}' is declared twice",
                c
            )));
        }
        seen.push(*c);
    }

    Ok(delimiters)
}
