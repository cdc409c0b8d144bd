//! Notification dispatch with masked diagnostics

use std::time::Duration;

use tracing::{debug, info};

use super::masking::mask_recipient;
use crate::app::collaborators::{CollaboratorError, NotificationTransport, call_with_timeout};
use crate::app::models::NotificationPayload;

/// The notification transport did not accept a notification
///
/// Only the masked recipient is kept so the error is safe to log.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DispatchFailure {
    #[error("notification has no recipient")]
    MissingRecipient,

    #[error("dispatch to {recipient} via {channel} failed: {cause}")]
    Transport {
        recipient: String,
        channel: &'static str,
        #[source]
        cause: CollaboratorError,
    },
}

/// Send a payload through the transport, bounded by `timeout`
pub async fn dispatch(
    payload: &NotificationPayload,
    transport: &dyn NotificationTransport,
    timeout: Duration,
) -> Result<(), DispatchFailure> {
    if payload.recipient.trim().is_empty() {
        return Err(DispatchFailure::MissingRecipient);
    }

    let masked = mask_recipient(&payload.recipient);
    let channel = transport.channel();

    match call_with_timeout(timeout, transport.send(payload)).await {
        Ok(()) => {
            info!(recipient = %masked, channel, "Notification dispatched");
            Ok(())
        }
        Err(cause) => {
            debug!(recipient = %masked, channel, error = %cause, "Notification dispatch failed");
            Err(DispatchFailure::Transport {
                recipient: masked,
                channel,
                cause,
            })
        }
    }
}
