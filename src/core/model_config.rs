//! Saved model configurations and the form used to create or edit them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ConnectionProbe;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
    Custom,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Custom => "Custom",
        }
    }

    /// Base URL prefilled into a new form for this provider.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_BASE_URL,
            Provider::Anthropic => ANTHROPIC_BASE_URL,
            Provider::Custom => "",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!("unknown provider '{value}'. Expected one of: openai, anthropic, custom")
            })
    }
}

// Backends may grow providers the client has never heard of; those are
// treated as custom endpoints rather than failing the whole listing.
impl From<String> for Provider {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Provider::Custom)
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

/// A saved configuration as returned by the backend. The credential is
/// write-only and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfiguration {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    #[serde(default)]
    pub base_url: String,
    pub model_id: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What an edit should do with the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Leave the stored key untouched; the field is omitted from the request.
    Keep,
    Replace(String),
}

impl Credential {
    pub fn as_replacement(&self) -> Option<&str> {
        match self {
            Credential::Keep => None,
            Credential::Replace(key) => Some(key.as_str()),
        }
    }
}

/// Validated contents of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDraft {
    pub name: String,
    pub provider: Provider,
    pub base_url: String,
    pub model_id: String,
    pub api_key: Credential,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Model ID is required")]
    MissingModelId,
    #[error("API key is required")]
    MissingApiKey,
    #[error("Base URL is not a valid URL: {0}")]
    InvalidBaseUrl(String),
}

/// Editable form state for a configuration.
///
/// A form opened for editing never carries the stored credential: the key
/// field starts empty and an empty key on submit means "keep the old one".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigForm {
    editing_id: Option<String>,
    pub name: String,
    provider: Provider,
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
    pub is_default: bool,
}

impl ConfigForm {
    pub fn blank(provider: Provider) -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            provider,
            base_url: provider.default_base_url().to_string(),
            model_id: String::new(),
            api_key: String::new(),
            is_default: false,
        }
    }

    pub fn for_edit(config: &ModelConfiguration) -> Self {
        Self {
            editing_id: Some(config.id.clone()),
            name: config.name.clone(),
            provider: config.provider,
            base_url: config.base_url.clone(),
            model_id: config.model_id.clone(),
            api_key: String::new(),
            is_default: config.is_default,
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Switches provider, swapping in the new default base URL unless the
    /// user typed their own.
    pub fn set_provider(&mut self, provider: Provider) {
        let untouched = self.base_url.trim().is_empty()
            || self.base_url == self.provider.default_base_url();
        self.provider = provider;
        if untouched {
            self.base_url = provider.default_base_url().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.model_id.trim().is_empty() {
            return Err(ValidationError::MissingModelId);
        }
        if !self.is_edit() && self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        validate_base_url(&self.base_url)
    }

    pub fn to_draft(&self) -> Result<ConfigDraft, ValidationError> {
        self.validate()?;
        let api_key = match self.api_key.trim() {
            "" => Credential::Keep,
            key => Credential::Replace(key.to_string()),
        };
        Ok(ConfigDraft {
            name: self.name.trim().to_string(),
            provider: self.provider,
            base_url: self.base_url.trim().to_string(),
            model_id: self.model_id.trim().to_string(),
            api_key,
            is_default: self.is_default,
        })
    }

    /// Connection probe for the values currently in the form. A key must be
    /// typed in; stored keys are never available to the client.
    pub fn probe(&self) -> Result<ConnectionProbe, ValidationError> {
        if self.model_id.trim().is_empty() {
            return Err(ValidationError::MissingModelId);
        }
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        validate_base_url(&self.base_url)?;
        Ok(ConnectionProbe {
            base_url: self.base_url.trim().to_string(),
            model_id: self.model_id.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
        })
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    reqwest::Url::parse(trimmed)
        .map(|_| ())
        .map_err(|err| ValidationError::InvalidBaseUrl(format!("{trimmed} ({err})")))
}

/// Result of probing a draft configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl TestOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }
}
