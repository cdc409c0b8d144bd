//! Application constants for the HL7 enricher
//!
//! This module contains HL7 delimiter defaults, the projection whitelist,
//! the record keys read by the enrichment steps, and service defaults.

use std::time::Duration;

// =============================================================================
// HL7 Encoding
// =============================================================================

/// Segment names eligible for projection into the flat record
pub const SEGMENT_WHITELIST: &[&str] = &["MSH", "EVN", "PID", "PV1", "PD1", "OBX"];

/// Name of the header segment every message must start with
pub const HEADER_SEGMENT: &str = "MSH";

/// Segment delimiter after line terminator normalisation
pub const SEGMENT_DELIMITER: char = '\r';

/// MLLP start-of-block byte
pub const MLLP_START_BLOCK: char = '\u{0b}';

/// MLLP end-of-block byte
pub const MLLP_END_BLOCK: char = '\u{1c}';

/// HL7 explicit null value, treated like an empty component
pub const HL7_NULL: &str = "\"\"";

/// Default HL7 delimiters used when building fixtures
pub mod delimiters {
    pub const FIELD: char = '|';
    pub const COMPONENT: char = '^';
    pub const REPETITION: char = '~';
    pub const ESCAPE: char = '\\';
    pub const SUB_COMPONENT: char = '&';
}

// =============================================================================
// Projected Record Keys
// =============================================================================

/// Keys of the projected record read downstream of the projector
pub mod record_keys {
    pub const MESSAGE_CONTROL_ID: &str = "MSH_10_0";
    pub const FACILITY: &str = "MSH_6_0";
    pub const EVENT_TYPE: &str = "EVN_1_0";

    pub const PATIENT_LAST_NAME: &str = "PID_5_0";
    pub const PATIENT_FIRST_NAME: &str = "PID_5_1";

    pub const ADDRESS_LINE: &str = "PID_11_0";
    pub const ADDRESS_CITY: &str = "PID_11_2";
    pub const ADDRESS_PROVINCE: &str = "PID_11_3";
    pub const ADDRESS_POSTAL: &str = "PID_11_4";

    pub const CLINICIAN_CONTACT: &str = "PD1_4_0";
    pub const CLINICIAN_LAST_NAME: &str = "PD1_4_1";
    pub const CLINICIAN_FIRST_NAME: &str = "PD1_4_2";

    pub const ADMISSION_NOTES: &str = "OBX_5_0";
}

// =============================================================================
// Enrichment and Notification
// =============================================================================

/// Default country filter for place searches
pub const DEFAULT_COUNTRY_CODE: &str = "CAN";

/// Default place index queried by the geocoder
pub const DEFAULT_PLACE_INDEX: &str = "Canada";

/// Entity attribute type carrying a medication dosage
pub const DOSAGE_ATTRIBUTE: &str = "DOSAGE";

/// Fixed mask replacing the interior of recipient identifiers in logs
pub const RECIPIENT_MASK: &str = "********";

/// Default notification body charset
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Default bound on each collaborator call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of messages processed concurrently within a batch
pub const DEFAULT_MAX_CONCURRENT_MESSAGES: usize = 1;

// =============================================================================
// Configuration
// =============================================================================

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "HL7_ENRICHER_";

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "hl7-enricher";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// File extension for single-message input files
pub const HL7_FILE_EXTENSION: &str = "hl7";
