//! Ties the components together for the interactive client: configuration
//! changes feed the model selector, chat replies feed the conversation list.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::api::{ApiError, Backend};
use crate::core::config_store::{ConfigStore, ConfigStoreError, RemoveOutcome};
use crate::core::conversation::ConversationSummary;
use crate::core::directory::ConversationDirectory;
use crate::core::message::Message;
use crate::core::model_config::{ConfigForm, ModelConfiguration};
use crate::core::selector::{ModelSelector, SelectError};
use crate::core::session::{ConversationSession, ExchangeOutcome, SessionState, SubmitRejected};
use crate::utils::logging::LoggingState;

pub struct App<B> {
    configs: ConfigStore<B>,
    directory: ConversationDirectory<B>,
    session: ConversationSession<B>,
    selector: ModelSelector,
    pub logging: LoggingState,
}

impl<B: Backend> App<B> {
    pub fn new(backend: Arc<B>, logging: LoggingState) -> Self {
        Self {
            configs: ConfigStore::new(backend.clone()),
            directory: ConversationDirectory::new(backend.clone()),
            session: ConversationSession::new(backend),
            selector: ModelSelector::new(),
            logging,
        }
    }

    /// Initial load of configurations and conversations. Failures are
    /// returned as display lines; the app stays usable with what it has.
    pub async fn bootstrap(&mut self) -> Vec<String> {
        let mut startup_errors = Vec::new();
        if let Err(err) = self.refresh_configs().await {
            startup_errors.push(err.to_string());
        }
        if let Err(err) = self.directory.refresh().await {
            startup_errors.push(format!("Failed to load conversations: {err}"));
        }
        startup_errors
    }

    pub fn configs(&self) -> &[ModelConfiguration] {
        self.configs.configs()
    }

    pub fn summaries(&self) -> &[ConversationSummary] {
        self.directory.summaries()
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    pub fn selected_config(&self) -> Option<&ModelConfiguration> {
        self.selector
            .selected_id()
            .and_then(|id| self.configs.find(id))
    }

    pub fn speaker_label(&self, message: &Message) -> String {
        message.speaker_label(self.configs.configs())
    }

    pub async fn refresh_configs(&mut self) -> Result<(), ConfigStoreError> {
        let result = self.configs.list().await.map(|_| ());
        self.selector.reconcile(self.configs.configs());
        result
    }

    pub async fn save_config(&mut self, form: &ConfigForm) -> Result<(), ConfigStoreError> {
        self.configs.save(form).await?;
        self.selector.reconcile(self.configs.configs());
        Ok(())
    }

    pub async fn remove_config(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<RemoveOutcome, ConfigStoreError> {
        let outcome = self.configs.remove(id, confirm).await?;
        self.selector.reconcile(self.configs.configs());
        Ok(outcome)
    }

    pub fn choose_model(&mut self, id_or_name: &str) -> Result<String, SelectError> {
        self.selector
            .choose(self.configs.configs(), id_or_name)
            .map(|config| config.name.clone())
    }

    /// Sends `input` with the selected configuration and writes the new
    /// messages to the transcript log.
    pub async fn submit(&mut self, input: &str) -> Result<ExchangeOutcome, SubmitRejected> {
        let before = self.session.state().messages().len();
        let selected = self.selector.selected_id().map(str::to_owned);
        self.session.set_input(input);
        let outcome = self
            .session
            .submit(selected.as_deref(), &mut self.directory)
            .await?;
        self.log_new_messages(before);
        Ok(outcome)
    }

    /// Makes a stored conversation the active one. The active conversation
    /// is untouched when the fetch fails.
    pub async fn open_conversation(&mut self, id: &str) -> Result<(), ApiError> {
        let conversation = self.directory.load_full(id).await?;
        self.session.load(conversation);
        Ok(())
    }

    pub fn watch_loading(&self) -> watch::Receiver<bool> {
        self.directory.watch_loading()
    }

    pub async fn refresh_conversations(&mut self) -> Result<(), ApiError> {
        self.directory.refresh().await
    }

    pub fn start_new(&mut self) {
        self.session.start_new();
    }

    fn log_new_messages(&self, from: usize) {
        let messages = self.session.state().messages();
        for message in messages.iter().skip(from) {
            let speaker = self.speaker_label(message);
            if let Err(err) = self.logging.log_message(message, &speaker) {
                warn!(error = %err, "failed to write transcript");
            }
        }
    }
}
