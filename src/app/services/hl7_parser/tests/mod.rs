//! Tests for the HL7 tokenizer module

pub mod escape_tests;
pub mod parser_tests;

// Shared fixtures
pub use crate::app::models::{Delimiters, Element, Hl7Message};

/// ADT^A01 message using `\r` segment terminators
pub fn sample_adt_message() -> String {
    [
        "MSH|^~\\&|EPIC|EPICADT|SMS|SMSADT|199912271408|CHARRIS|ADT^A01|1817457|D|2.5|",
        "EVN|A01|199912271408",
        "PID||0493575^^^2^ID 1|454721||DOE^JOHN^^^^|DOE^JOHN^^^^|19480203|M||B|254 MYSTREET AVE^^MYTOWN^OH^44123^USA||(216)123-4567",
        "PD1|||CLINIC|dr.smith@example.com^SMITH^ANNA",
        "NK1||ROE^MARIE^^^^|SPO||(216)123-4567",
        "PV1||O|168 ~219~C~PMA^^^^^^^^^",
        "OBX|1|TX|NOTES||Patient takes Aspirin 81mg daily for angina",
    ]
    .join("\r")
}

/// Elements of the first field named `name` in the first matching segment
pub fn elements_of<'a>(message: &'a Hl7Message, segment: &str, field: &str) -> &'a [Element] {
    message
        .segments
        .iter()
        .filter(|s| s.name == segment)
        .flat_map(|s| s.fields.iter())
        .find(|f| f.name == field)
        .map(|f| f.elements.as_slice())
        .unwrap_or(&[])
}

pub fn value(text: &str) -> Element {
    Element::Value(text.to_string())
}
