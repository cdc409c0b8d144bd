//! Tests for escape sequence decoding

use super::*;
use crate::app::services::hl7_parser::{decode_escapes, escape_element};

#[test]
fn test_decode_all_separator_escapes() {
    let delimiters = Delimiters::default();

    assert_eq!(decode_escapes("A\\F\\B", &delimiters), "A|B");
    assert_eq!(decode_escapes("A\\S\\B", &delimiters), "A^B");
    assert_eq!(decode_escapes("A\\R\\B", &delimiters), "A~B");
    assert_eq!(decode_escapes("A\\T\\B", &delimiters), "A&B");
    assert_eq!(decode_escapes("A\\E\\B", &delimiters), "AB");
}

#[test]
fn test_decode_without_escapes_is_identity() {
    let delimiters = Delimiters::default();
    assert_eq!(decode_escapes("Main St & 5th", &delimiters), "Main St & 5th");
    assert_eq!(decode_escapes("", &delimiters), "");
}

#[test]
fn test_decode_keeps_unknown_and_unterminated_sequences() {
    let delimiters = Delimiters::default();

    assert_eq!(decode_escapes("line\\.br\\next", &delimiters), "line\\.br\\next");
    assert_eq!(decode_escapes("hex\\X0D\\", &delimiters), "hex\\X0D\\");
    assert_eq!(decode_escapes("dangling\\F", &delimiters), "dangling\\F");
}

#[test]
fn test_decode_multiple_sequences_in_one_element() {
    let delimiters = Delimiters::default();
    assert_eq!(
        decode_escapes("Smith \\T\\ Sons\\F\\Ltd\\S\\Inc", &delimiters),
        "Smith & Sons|Ltd^Inc"
    );
}

#[test]
fn test_decode_uses_declared_escape_character() {
    let delimiters = Delimiters {
        escape: '#',
        ..Delimiters::default()
    };
    assert_eq!(decode_escapes("A#F#B\\F\\", &delimiters), "A|B\\F\\");
}

#[test]
fn test_escape_round_trip() {
    let delimiters = Delimiters::default();
    let fixtures = [
        "plain text",
        "A\\F\\B",
        "\\S\\leading and trailing\\R\\",
        "Smith \\T\\ Sons\\F\\Ltd\\S\\Inc\\R\\2",
    ];

    for raw in fixtures {
        let decoded = decode_escapes(raw, &delimiters);
        assert_eq!(escape_element(&decoded, &delimiters), raw, "fixture {raw}");
    }
}
