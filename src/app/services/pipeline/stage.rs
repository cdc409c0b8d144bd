//! Per-message stage state machine
//!
//! ```text
//! Received -> Tokenized -> Projected -> AddressEnriched -> ClinicallyEnriched -> Notified -> Done
//!     |           |            |
//!     +-----------+------------+--> Failed(stage)
//! ```
//!
//! Only the three stages before enrichment may fail. Enrichment stages
//! degrade in place and always advance, and `Notified` is reached whether or
//! not dispatch succeeded.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// Stage at which a message's pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    /// Tokenizer rejected the raw text
    Received,
    Tokenized,
    /// Projection produced no record
    Projected,
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FailedStage::Received => MessageStage::Received,
            FailedStage::Tokenized => MessageStage::Tokenized,
            FailedStage::Projected => MessageStage::Projected,
        };
        write!(f, "{}", stage)
    }
}

/// Position of one message in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStage {
    Received,
    Tokenized,
    Projected,
    AddressEnriched,
    ClinicallyEnriched,
    Notified,
    Done,
    Failed(FailedStage),
}

impl MessageStage {
    /// Stage that normally follows this one, `None` for terminal stages
    pub fn next(self) -> Option<MessageStage> {
        match self {
            MessageStage::Received => Some(MessageStage::Tokenized),
            MessageStage::Tokenized => Some(MessageStage::Projected),
            MessageStage::Projected => Some(MessageStage::AddressEnriched),
            MessageStage::AddressEnriched => Some(MessageStage::ClinicallyEnriched),
            MessageStage::ClinicallyEnriched => Some(MessageStage::Notified),
            MessageStage::Notified => Some(MessageStage::Done),
            MessageStage::Done | MessageStage::Failed(_) => None,
        }
    }

    /// Failure stage reachable from this one, if any
    pub fn failure(self) -> Option<MessageStage> {
        match self {
            MessageStage::Received => Some(MessageStage::Failed(FailedStage::Received)),
            MessageStage::Tokenized => Some(MessageStage::Failed(FailedStage::Tokenized)),
            MessageStage::Projected => Some(MessageStage::Failed(FailedStage::Projected)),
            _ => None,
        }
    }

    pub fn can_transition_to(self, target: MessageStage) -> bool {
        self.next() == Some(target) || self.failure() == Some(target)
    }

    /// Validated transition
    pub fn transition(self, target: MessageStage) -> Result<MessageStage> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Error::invalid_transition(self, target))
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MessageStage::Done | MessageStage::Failed(_))
    }

    pub fn is_failed(self) -> bool {
        matches!(self, MessageStage::Failed(_))
    }
}

impl fmt::Display for MessageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStage::Received => f.write_str("received"),
            MessageStage::Tokenized => f.write_str("tokenized"),
            MessageStage::Projected => f.write_str("projected"),
            MessageStage::AddressEnriched => f.write_str("address-enriched"),
            MessageStage::ClinicallyEnriched => f.write_str("clinically-enriched"),
            MessageStage::Notified => f.write_str("notified"),
            MessageStage::Done => f.write_str("done"),
            MessageStage::Failed(stage) => write!(f, "failed({})", stage),
        }
    }
}
