//! Notification transport that only writes to the log
//!
//! Used for dry runs: the rendered notification is logged with the
//! recipient masked and nothing leaves the process.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::app::collaborators::{CollaboratorError, NotificationTransport};
use crate::app::models::NotificationPayload;
use crate::app::services::notification::mask_recipient;

#[derive(Debug, Default)]
pub struct LogNotifier {
    delivered: AtomicUsize,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications logged so far
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NotificationTransport for LogNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), CollaboratorError> {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        info!(
            recipient = %mask_recipient(&payload.recipient),
            subject = %payload.subject,
            "Dry run notification:\n{}",
            payload.body
        );
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "log"
    }
}
