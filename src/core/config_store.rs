//! In-memory copy of the backend's saved model configurations.
//!
//! The backend is the only source of truth: every successful mutation is
//! followed by a full re-list instead of merging the submitted draft, since
//! the backend normalizes fields (notably the default flag) on its own.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, Backend, ConfigPayload, ConnectionProbe};
use crate::core::message::model_label;
use crate::core::model_config::{
    ConfigDraft, ConfigForm, ModelConfiguration, TestOutcome, ValidationError,
};

const TEST_FAILED: &str = "Failed to test connection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Load,
    Save,
    Delete,
}

impl StoreAction {
    fn failure_text(self) -> &'static str {
        match self {
            StoreAction::Load => "Failed to load configurations",
            StoreAction::Save => "Failed to save configuration",
            StoreAction::Delete => "Failed to delete configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigStoreError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("{}", describe_request_failure(*action, source))]
    Request {
        action: StoreAction,
        source: ApiError,
    },
}

fn describe_request_failure(action: StoreAction, source: &ApiError) -> String {
    match source {
        ApiError::Status { message, .. } => message.clone(),
        other => format!("{}: {}", action.failure_text(), other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Cancelled,
}

/// Snapshot of everything the configuration screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStoreState {
    pub configs: Vec<ModelConfiguration>,
    /// Inline error line from the most recent failed operation.
    pub error: Option<String>,
    pub last_test: Option<TestOutcome>,
}

pub struct ConfigStore<B> {
    backend: Arc<B>,
    state: ConfigStoreState,
}

impl<B: Backend> ConfigStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: ConfigStoreState::default(),
        }
    }

    pub fn state(&self) -> &ConfigStoreState {
        &self.state
    }

    pub fn configs(&self) -> &[ModelConfiguration] {
        &self.state.configs
    }

    pub fn find(&self, id: &str) -> Option<&ModelConfiguration> {
        self.state.configs.iter().find(|config| config.id == id)
    }

    /// Display name for a configuration id, tolerating deleted ids.
    pub fn label_for(&self, config_id: Option<&str>) -> String {
        model_label(&self.state.configs, config_id)
    }

    /// Replaces the collection with the backend's current listing. On
    /// failure the previous collection is kept.
    pub async fn list(&mut self) -> Result<&[ModelConfiguration], ConfigStoreError> {
        match self.backend.list_configs().await {
            Ok(configs) => {
                debug!(count = configs.len(), "loaded model configurations");
                self.state.configs = configs;
                Ok(&self.state.configs)
            }
            Err(source) => Err(self.fail(StoreAction::Load, source)),
        }
    }

    /// Creates or updates depending on whether the form was opened for
    /// editing.
    pub async fn save(&mut self, form: &ConfigForm) -> Result<(), ConfigStoreError> {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(err) => {
                self.state.error = Some(err.to_string());
                return Err(err.into());
            }
        };
        match form.editing_id() {
            Some(id) => self.update(id, &draft).await,
            None => self.create(&draft).await,
        }
    }

    pub async fn create(&mut self, draft: &ConfigDraft) -> Result<(), ConfigStoreError> {
        if draft.api_key.as_replacement().is_none() {
            self.state.error = Some(ValidationError::MissingApiKey.to_string());
            return Err(ValidationError::MissingApiKey.into());
        }
        self.state.error = None;
        let payload = ConfigPayload::from(draft);
        match self.backend.create_config(&payload).await {
            Ok(()) => {
                debug!(name = %draft.name, "created model configuration");
                self.relist_after_mutation().await;
                Ok(())
            }
            Err(source) => Err(self.fail(StoreAction::Save, source)),
        }
    }

    pub async fn update(&mut self, id: &str, draft: &ConfigDraft) -> Result<(), ConfigStoreError> {
        self.state.error = None;
        let payload = ConfigPayload::from(draft);
        match self.backend.update_config(id, &payload).await {
            Ok(()) => {
                debug!(
                    %id,
                    key_replaced = payload.api_key.is_some(),
                    "updated model configuration"
                );
                self.relist_after_mutation().await;
                Ok(())
            }
            Err(source) => Err(self.fail(StoreAction::Save, source)),
        }
    }

    /// Deletes a configuration after `confirm` approves the prompt. Nothing
    /// is sent when the prompt is declined.
    pub async fn remove(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<RemoveOutcome, ConfigStoreError> {
        let prompt = match self.find(id) {
            Some(config) => format!(
                "Are you sure you want to delete the configuration '{}'?",
                config.name
            ),
            None => format!("Are you sure you want to delete the configuration '{id}'?"),
        };
        if !confirm(&prompt) {
            return Ok(RemoveOutcome::Cancelled);
        }

        self.state.error = None;
        match self.backend.delete_config(id).await {
            Ok(()) => {
                debug!(%id, "deleted model configuration");
                self.relist_after_mutation().await;
                Ok(RemoveOutcome::Removed)
            }
            Err(source) => Err(self.fail(StoreAction::Delete, source)),
        }
    }

    /// Probes an unsaved configuration. Never fails: problems come back as
    /// an unsuccessful outcome.
    pub async fn test(&mut self, probe: &ConnectionProbe) -> TestOutcome {
        self.state.error = None;
        let outcome = match self.backend.test_config(probe).await {
            Ok(outcome) => outcome,
            Err(ApiError::Status { message, .. }) => TestOutcome::failed(message),
            Err(err) => TestOutcome {
                error_details: Some(err.to_string()),
                ..TestOutcome::failed(TEST_FAILED)
            },
        };
        debug!(success = outcome.success, "connection test finished");
        self.state.last_test = Some(outcome.clone());
        outcome
    }

    /// Runs the connection test for a form's current values.
    pub async fn test_form(&mut self, form: &ConfigForm) -> Result<TestOutcome, ValidationError> {
        let probe = form.probe()?;
        Ok(self.test(&probe).await)
    }

    async fn relist_after_mutation(&mut self) {
        if let Err(err) = self.list().await {
            warn!(error = %err, "re-listing configurations after a change failed");
        }
    }

    fn fail(&mut self, action: StoreAction, source: ApiError) -> ConfigStoreError {
        let err = ConfigStoreError::Request { action, source };
        warn!(error = %err, "configuration request failed");
        self.state.error = Some(err.to_string());
        err
    }
}
