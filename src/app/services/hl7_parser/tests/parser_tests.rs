//! Tests for the HL7 tokenizer

use super::*;
use crate::Error;
use crate::app::services::hl7_parser::{normalize_terminators, read_delimiters, tokenize};

#[test]
fn test_tokenize_sample_message() {
    let message = tokenize(&sample_adt_message()).unwrap();

    let names: Vec<&str> = message.segments.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["MSH", "EVN", "PID", "PD1", "NK1", "PV1", "OBX"]);
    assert_eq!(message.delimiters, Delimiters::default());
}

#[test]
fn test_msh_numbering_and_encoding_fields() {
    let message = tokenize(&sample_adt_message()).unwrap();

    assert_eq!(elements_of(&message, "MSH", "MSH_1"), &[value("|")]);
    assert_eq!(elements_of(&message, "MSH", "MSH_2"), &[value("^~\\&")]);
    assert_eq!(elements_of(&message, "MSH", "MSH_3"), &[value("EPIC")]);
    assert_eq!(elements_of(&message, "MSH", "MSH_6"), &[value("SMSADT")]);
    assert_eq!(
        elements_of(&message, "MSH", "MSH_9"),
        &[value("ADT"), value("A01")]
    );
    assert_eq!(elements_of(&message, "MSH", "MSH_10"), &[value("1817457")]);
}

#[test]
fn test_empty_components_become_sentinels() {
    let message = tokenize(&sample_adt_message()).unwrap();

    assert_eq!(
        elements_of(&message, "PID", "PID_11"),
        &[
            value("254 MYSTREET AVE"),
            Element::Empty,
            value("MYTOWN"),
            value("OH"),
            value("44123"),
            value("USA"),
        ]
    );
    assert_eq!(
        elements_of(&message, "PID", "PID_5"),
        &[
            value("DOE"),
            value("JOHN"),
            Element::Empty,
            Element::Empty,
            Element::Empty,
        ]
    );
}

#[test]
fn test_empty_fields_are_not_modeled() {
    let message = tokenize(&sample_adt_message()).unwrap();
    let pid = message.segments_named("PID").next().unwrap();

    assert!(pid.field(1).is_none());
    assert_eq!(pid.field(2).unwrap().name, "PID_2");
    assert!(pid.field(4).is_none());
}

#[test]
fn test_repetitions_become_sibling_fields() {
    let message = tokenize(&sample_adt_message()).unwrap();
    let pv1 = message.segments_named("PV1").next().unwrap();

    let occurrences: Vec<_> = pv1.fields.iter().filter(|f| f.position == 3).collect();
    assert_eq!(occurrences.len(), 4);
    assert_eq!(occurrences[0].elements, vec![value("168 ")]);
    assert_eq!(occurrences[3].elements[0], value("PMA"));
    assert!(occurrences.iter().all(|f| f.name == "PV1_3"));
}

#[test]
fn test_hl7_null_is_sentinel() {
    let message = tokenize("MSH|^~\\&|A|B\rPID|||\"\"||DOE^\"\"^JOHN").unwrap();

    assert_eq!(elements_of(&message, "PID", "PID_3"), &[Element::Empty]);
    assert_eq!(
        elements_of(&message, "PID", "PID_5"),
        &[value("DOE"), Element::Empty, value("JOHN")]
    );
}

#[test]
fn test_line_terminator_conventions_are_equivalent() {
    let cr = sample_adt_message();
    let lf = cr.replace('\r', "\n");
    let crlf = cr.replace('\r', "\r\n");

    let expected = tokenize(&cr).unwrap();
    assert_eq!(tokenize(&lf).unwrap(), expected);
    assert_eq!(tokenize(&crlf).unwrap(), expected);
}

#[test]
fn test_normalize_strips_mllp_framing() {
    let framed = "\u{0b}MSH|^~\\&|A\nPID|1\u{1c}";
    assert_eq!(normalize_terminators(framed), "MSH|^~\\&|A\rPID|1");
    assert_eq!(tokenize(framed).unwrap().segments.len(), 2);
}

#[test]
fn test_escaped_values_are_decoded() {
    let message =
        tokenize("MSH|^~\\&|A|B\rOBX|1|TX|NOTES||BP 120\\S\\80 \\T\\ stable\\F\\ok").unwrap();

    assert_eq!(
        elements_of(&message, "OBX", "OBX_5"),
        &[value("BP 120^80 & stable|ok")]
    );
}

#[test]
fn test_custom_delimiters_from_header() {
    let message = tokenize("MSH#*~\\&#SENDER#FACILITY\rPID###\rPID#1##ID*X").unwrap();

    assert_eq!(message.delimiters.field, '#');
    assert_eq!(message.delimiters.component, '*');
    let pid = message.segments_named("PID").nth(1).unwrap();
    assert_eq!(pid.field(3).unwrap().elements, vec![value("ID"), value("X")]);
}

#[test]
fn test_sub_components_stay_atomic() {
    let message = tokenize("MSH|^~\\&|A\rPID|||123&HOSP&ISO").unwrap();
    assert_eq!(elements_of(&message, "PID", "PID_3"), &[value("123&HOSP&ISO")]);
}

#[test]
fn test_malformed_messages_are_rejected() {
    let cases = [
        "",
        "   \n\r\n",
        "PID|||123",
        "not an hl7 message",
        "MSH",
        "MSH|^~",
        "MSH|^~\\&|A\rpid|lowercase",
        "MSH|^~\\&|A\rThis line is free text",
    ];

    for raw in cases {
        match tokenize(raw) {
            Err(Error::MalformedMessage { .. }) => {}
            other => panic!("expected malformed error for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_read_delimiters_rejects_duplicates() {
    assert!(read_delimiters("MSH|^^\\&").is_err());
    assert!(read_delimiters("MSHA^~\\&").is_err());
    assert!(read_delimiters("MSH|^~\\&|X").is_ok());
}
