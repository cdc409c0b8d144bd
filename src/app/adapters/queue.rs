//! Queue consumer boundary
//!
//! A batch can come from a queue event document
//! (`{"Records":[{"messageId":..,"body":..}]}`), a directory of `*.hl7`
//! files (one message per file, sorted by path), or a single HL7 file.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::app::models::RawMessage;
use crate::constants::HL7_FILE_EXTENSION;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct QueueEvent {
    #[serde(rename = "Records")]
    records: Vec<QueueRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueRecord {
    #[serde(default)]
    message_id: Option<String>,
    body: String,
}

/// Messages delivered together by one queue invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBatch {
    /// Where the batch was read from, for logs
    pub source: String,
    pub messages: Vec<RawMessage>,
}

impl QueueBatch {
    /// Parse a queue event document
    pub fn from_event_json(source: impl Into<String>, text: &str) -> Result<Self> {
        let event: QueueEvent = serde_json::from_str(text)
            .map_err(|e| Error::json("invalid queue event document", e))?;

        let messages = event
            .records
            .into_iter()
            .map(|record| RawMessage {
                message_id: record.message_id,
                body: record.body,
            })
            .collect();

        Ok(Self {
            source: source.into(),
            messages,
        })
    }

    /// Read a batch from a file or directory
    ///
    /// Files with a `.json` extension are queue event documents; any other
    /// file is a single HL7 message. Directories contribute every `*.hl7`
    /// file beneath them.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Self::from_directory(path);
        }

        let bytes =
            fs::read(path).map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
        let text = decode_text(&bytes, &path.display().to_string());
        let source = path.display().to_string();

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_event_json(source, &text)
        } else {
            Ok(Self {
                messages: vec![RawMessage::new(text).with_message_id(file_message_id(path))],
                source,
            })
        }
    }

    /// Read one message per `*.hl7` file, ordered by path
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(HL7_FILE_EXTENSION))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::queue_input(format!(
                "no .{} files found in {}",
                HL7_FILE_EXTENSION,
                dir.display()
            )));
        }

        let mut messages = Vec::with_capacity(paths.len());
        for path in &paths {
            debug!(path = %path.display(), "Reading HL7 file");
            // An unreadable file becomes an empty message that fails on its own
            let body = match fs::read(path) {
                Ok(bytes) => decode_text(&bytes, &path.display().to_string()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read HL7 file");
                    String::new()
                }
            };
            messages.push(RawMessage::new(body).with_message_id(file_message_id(path)));
        }

        info!(files = messages.len(), dir = %dir.display(), "Loaded HL7 files");
        Ok(Self {
            source: dir.display().to_string(),
            messages,
        })
    }

    /// Read a batch from a stream, detecting event JSON by its leading `{`
    pub fn from_reader(source: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::io("failed to read batch input", e))?;

        let source = source.into();
        let text = decode_text(&bytes, &source);
        if text.trim_start().starts_with('{') {
            Self::from_event_json(source, &text)
        } else if text.trim().is_empty() {
            Err(Error::queue_input(format!("{} is empty", source)))
        } else {
            Ok(Self {
                source,
                messages: vec![RawMessage::new(text)],
            })
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<RawMessage> {
        self.messages
    }
}

/// Decode message bytes, replacing invalid UTF-8 (e.g. Latin-1 feeds)
fn decode_text(bytes: &[u8], source: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!(source, "Input is not valid UTF-8, invalid bytes replaced");
            text
        }
    }
}

fn file_message_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
