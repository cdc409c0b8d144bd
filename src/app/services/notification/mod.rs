//! Provider notification rendering and dispatch
//!
//! The composer turns an [`EnrichedRecord`] into a [`NotificationPayload`];
//! the dispatcher hands it to a [`NotificationTransport`] under a timeout.
//! Recipient identifiers never reach the logs unmasked.
//!
//! [`EnrichedRecord`]: crate::app::models::EnrichedRecord
//! [`NotificationPayload`]: crate::app::models::NotificationPayload
//! [`NotificationTransport`]: crate::app::collaborators::NotificationTransport

pub mod composer;
pub mod dispatcher;
pub mod masking;

#[cfg(test)]
pub mod tests;

pub use composer::{compose, render_body, render_subject};
pub use dispatcher::{DispatchFailure, dispatch};
pub use masking::mask_recipient;
