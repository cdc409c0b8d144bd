//! Clinical entity detection over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::post_json;
use crate::app::collaborators::{
    ClinicalEntity, CollaboratorError, EntityAttribute, EntityExtractor,
};
use crate::app::models::EntityCategory;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectEntitiesRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectEntitiesResponse {
    #[serde(default)]
    pub entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireEntity {
    pub category: String,
    pub text: String,
    #[serde(default)]
    pub attributes: Vec<WireAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireAttribute {
    #[serde(rename = "Type")]
    pub kind: String,
    pub text: String,
}

/// Decode wire entities, resolving category labels at the boundary
pub fn entities_from_response(response: DetectEntitiesResponse) -> Vec<ClinicalEntity> {
    response
        .entities
        .into_iter()
        .map(|entity| ClinicalEntity {
            category: EntityCategory::from_label(&entity.category),
            text: entity.text,
            attributes: entity
                .attributes
                .into_iter()
                .map(|attribute| EntityAttribute {
                    kind: attribute.kind,
                    text: attribute.text,
                })
                .collect(),
        })
        .collect()
}

pub struct HttpEntityExtractor {
    client: Client,
    endpoint: String,
}

impl HttpEntityExtractor {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EntityExtractor for HttpEntityExtractor {
    async fn detect_entities(&self, text: &str) -> Result<Vec<ClinicalEntity>, CollaboratorError> {
        let body = DetectEntitiesRequest { text };
        let response: DetectEntitiesResponse =
            post_json(&self.client, &self.endpoint, &body).await?;
        Ok(entities_from_response(response))
    }
}
