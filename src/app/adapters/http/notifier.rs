//! Notification delivery over HTTP
//!
//! Two channels are supported: a direct email envelope addressed to the
//! clinician, and a topic publish for deployments that fan notifications out
//! to subscribers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::post_json_ack;
use crate::app::collaborators::{CollaboratorError, NotificationTransport};
use crate::app::models::NotificationPayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Content {
    pub charset: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Destination {
    pub to_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailBody {
    pub text: Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailMessage {
    pub subject: Content,
    pub body: EmailBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailEnvelope {
    pub source: String,
    pub destination: Destination,
    pub message: EmailMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicEnvelope {
    pub topic_arn: String,
    pub subject: String,
    pub message: String,
}

/// Request body sent to the notification endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NotificationEnvelope {
    Email(EmailEnvelope),
    Topic(TopicEnvelope),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Email { sender: String, charset: String },
    Topic { topic_arn: String },
}

pub struct HttpNotifier {
    client: Client,
    endpoint: String,
    route: Route,
}

impl HttpNotifier {
    /// Send each notification as an email from `sender`
    pub fn email(
        client: Client,
        endpoint: impl Into<String>,
        sender: impl Into<String>,
        charset: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            route: Route::Email {
                sender: sender.into(),
                charset: charset.into(),
            },
        }
    }

    /// Publish each notification to a topic
    pub fn topic(client: Client, endpoint: impl Into<String>, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            route: Route::Topic {
                topic_arn: topic_arn.into(),
            },
        }
    }

    /// Build the wire envelope for a payload
    pub fn envelope(&self, payload: &NotificationPayload) -> NotificationEnvelope {
        match &self.route {
            Route::Email { sender, charset } => NotificationEnvelope::Email(EmailEnvelope {
                source: sender.clone(),
                destination: Destination {
                    to_addresses: vec![payload.recipient.clone()],
                },
                message: EmailMessage {
                    subject: Content {
                        charset: charset.clone(),
                        data: payload.subject.clone(),
                    },
                    body: EmailBody {
                        text: Content {
                            charset: charset.clone(),
                            data: payload.body.clone(),
                        },
                    },
                },
            }),
            Route::Topic { topic_arn } => NotificationEnvelope::Topic(TopicEnvelope {
                topic_arn: topic_arn.clone(),
                subject: payload.subject.clone(),
                message: payload.body.clone(),
            }),
        }
    }
}

#[async_trait]
impl NotificationTransport for HttpNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), CollaboratorError> {
        let envelope = self.envelope(payload);
        post_json_ack(&self.client, &self.endpoint, &envelope).await
    }

    fn channel(&self) -> &'static str {
        match self.route {
            Route::Email { .. } => "email",
            Route::Topic { .. } => "topic",
        }
    }
}
