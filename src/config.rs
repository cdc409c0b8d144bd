//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `HL7_ENRICHER_*` environment variables, then command-line flags. The
//! result is validated once at startup and treated as read-only afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::services::enrichment::EnrichmentOptions;
use crate::app::services::pipeline::PipelineSettings;
use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CALL_TIMEOUT, DEFAULT_CHARSET, DEFAULT_COUNTRY_CODE,
    DEFAULT_MAX_CONCURRENT_MESSAGES, DEFAULT_PLACE_INDEX, ENV_PREFIX,
};
use crate::{Error, Result};

/// Geocoding collaborator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Place search endpoint
    pub endpoint: String,
    /// Place index queried by every search
    pub index_name: String,
    /// ISO 3166-1 alpha-3 country filter
    pub country_code: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            index_name: DEFAULT_PLACE_INDEX.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

/// Clinical entity collaborator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalConfig {
    pub endpoint: String,
}

/// How notifications leave the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    /// One email per message, addressed to the clinician
    #[default]
    Email,
    /// Publish to a topic
    Topic,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::Email => f.write_str("email"),
            NotificationChannel::Topic => f.write_str("topic"),
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(NotificationChannel::Email),
            "topic" => Ok(NotificationChannel::Topic),
            other => Err(Error::configuration(format!(
                "unknown notification channel '{}', expected 'email' or 'topic'",
                other
            ))),
        }
    }
}

/// Notification transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub channel: NotificationChannel,
    pub endpoint: String,
    /// Full topic ARN; built from region, account and `topic_name` when empty
    pub topic_arn: String,
    pub topic_name: String,
    pub charset: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: NotificationChannel::default(),
            endpoint: String::new(),
            topic_arn: String::new(),
            topic_name: String::new(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on each collaborator call, in seconds
    pub call_timeout_secs: u64,
    /// Messages processed at once (0 = one per CPU)
    pub max_concurrent_messages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            max_concurrent_messages: DEFAULT_MAX_CONCURRENT_MESSAGES,
        }
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sender identity used for outgoing email
    pub sender: String,
    pub region: String,
    pub account_id: String,
    pub geocoding: GeocodingConfig,
    pub clinical: ClinicalConfig,
    pub notification: NotificationConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load defaults, the TOML file and environment overrides
    ///
    /// An explicit `path` must exist. Without one the per-user config file
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read config {}", path.display()), e))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::configuration(format!("invalid TOML: {}", e)))
    }

    /// Apply `HL7_ENRICHER_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve prefixed variable names
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = get("SENDER") {
            self.sender = value;
        }
        if let Some(value) = get("REGION") {
            self.region = value;
        }
        if let Some(value) = get("ACCOUNT_ID") {
            self.account_id = value;
        }
        if let Some(value) = get("GEOCODING_ENDPOINT") {
            self.geocoding.endpoint = value;
        }
        if let Some(value) = get("GEOCODING_INDEX_NAME") {
            self.geocoding.index_name = value;
        }
        if let Some(value) = get("COUNTRY_CODE") {
            self.geocoding.country_code = value;
        }
        if let Some(value) = get("CLINICAL_ENDPOINT") {
            self.clinical.endpoint = value;
        }
        if let Some(value) = get("NOTIFICATION_CHANNEL") {
            self.notification.channel = value.parse()?;
        }
        if let Some(value) = get("NOTIFICATION_ENDPOINT") {
            self.notification.endpoint = value;
        }
        if let Some(value) = get("TOPIC_ARN") {
            self.notification.topic_arn = value;
        }
        if let Some(value) = get("CALL_TIMEOUT_SECS") {
            self.pipeline.call_timeout_secs = parse_number("CALL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("MAX_CONCURRENT_MESSAGES") {
            self.pipeline.max_concurrent_messages =
                parse_number("MAX_CONCURRENT_MESSAGES", &value)?;
        }

        Ok(())
    }

    pub fn with_max_concurrent_messages(mut self, max_concurrent_messages: usize) -> Self {
        self.pipeline.max_concurrent_messages = max_concurrent_messages;
        self
    }

    pub fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.pipeline.call_timeout_secs = secs;
        self
    }

    pub fn with_notification_channel(mut self, channel: NotificationChannel) -> Self {
        self.notification.channel = channel;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.call_timeout_secs)
    }

    /// Topic ARN, explicit or built from region, account and topic name
    pub fn topic_arn(&self) -> Option<String> {
        if !self.notification.topic_arn.is_empty() {
            return Some(self.notification.topic_arn.clone());
        }
        if self.region.is_empty()
            || self.account_id.is_empty()
            || self.notification.topic_name.is_empty()
        {
            return None;
        }
        Some(format!(
            "arn:aws:sns:{}:{}:{}",
            self.region, self.account_id, self.notification.topic_name
        ))
    }

    /// Check settings needed by the full pipeline
    pub fn validate(&self) -> Result<()> {
        self.validate_geocoding()?;
        require("clinical.endpoint", &self.clinical.endpoint)
    }

    /// Check only the settings the geocoder needs
    pub fn validate_geocoding(&self) -> Result<()> {
        if self.pipeline.call_timeout_secs == 0 {
            return Err(Error::configuration("pipeline.call_timeout_secs must be positive"));
        }
        let country = &self.geocoding.country_code;
        if country.len() != 3 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::configuration(format!(
                "geocoding.country_code '{}' is not an ISO alpha-3 code",
                country
            )));
        }
        require("geocoding.endpoint", &self.geocoding.endpoint)?;
        require("geocoding.index_name", &self.geocoding.index_name)
    }

    /// Check the settings of the configured notification channel
    pub fn validate_notification(&self) -> Result<()> {
        require("notification.endpoint", &self.notification.endpoint)?;
        match self.notification.channel {
            NotificationChannel::Email => require("sender", &self.sender),
            NotificationChannel::Topic => self.topic_arn().map(|_| ()).ok_or_else(|| {
                Error::configuration(
                    "topic channel needs notification.topic_arn or region, account_id and notification.topic_name",
                )
            }),
        }
    }

    pub fn enrichment_options(&self) -> EnrichmentOptions {
        EnrichmentOptions {
            country_code: self.geocoding.country_code.clone(),
            call_timeout: self.call_timeout(),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            enrichment: self.enrichment_options(),
            ..PipelineSettings::default()
        }
        .with_max_concurrent_messages(self.pipeline.max_concurrent_messages)
    }
}

/// Per-user configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::configuration(format!("{} is not set", name)))
    } else {
        Ok(())
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration(format!("{}{} must be a number, got '{}'", ENV_PREFIX, name, value))
    })
}
