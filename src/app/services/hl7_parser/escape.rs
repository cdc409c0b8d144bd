//! HL7 escape sequence handling
//!
//! Supported sequences, using the declared escape character (usually `\`):
//! `\F\` field separator, `\S\` component separator, `\R\` repetition
//! separator, `\T\` sub-component separator and `\E\`, which is dropped.
//! Anything else between escape characters (e.g. `\.br\`, `\X0D\`) is kept
//! verbatim.

use crate::app::models::Delimiters;

/// Decode escape sequences in a raw element value
pub fn decode_escapes(raw: &str, delimiters: &Delimiters) -> String {
    let escape = delimiters.escape;
    if !raw.contains(escape) {
        return raw.to_string();
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find(escape) {
        decoded.push_str(&rest[..start]);
        let after_open = &rest[start + escape.len_utf8()..];

        let Some(end) = after_open.find(escape) else {
            // Unterminated sequence, keep the remainder as-is
            decoded.push_str(&rest[start..]);
            return decoded;
        };

        let code = &after_open[..end];
        match code {
            "F" => decoded.push(delimiters.field),
            "S" => decoded.push(delimiters.component),
            "R" => decoded.push(delimiters.repetition),
            "T" => decoded.push(delimiters.sub_component),
            "E" => {}
            _ => {
                decoded.push(escape);
                decoded.push_str(code);
                decoded.push(escape);
            }
        }

        rest = &after_open[end + escape.len_utf8()..];
    }

    decoded.push_str(rest);
    decoded
}

/// Escape delimiter characters in plain text so it can be embedded in an element
///
/// The escape character itself is not encoded; text passed here must not
/// contain it.
pub fn escape_element(text: &str, delimiters: &Delimiters) -> String {
    let mut encoded = String::with_capacity(text.len());
    let e = delimiters.escape;

    for c in text.chars() {
        let code = if c == delimiters.field {
            Some('F')
        } else if c == delimiters.component {
            Some('S')
        } else if c == delimiters.repetition {
            Some('R')
        } else if c == delimiters.sub_component {
            Some('T')
        } else {
            None
        };

        match code {
            Some(code) => {
                encoded.push(e);
                encoded.push(code);
                encoded.push(e);
            }
            None => encoded.push(c),
        }
    }

    encoded
}
