//! The list of past conversations and on-demand loading of one of them.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiError, Backend};
use crate::core::conversation::{Conversation, ConversationSummary};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryState {
    pub summaries: Vec<ConversationSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DirectoryState {
    /// Marks a full-history fetch as in flight.
    pub fn begin_load(&self) -> DirectoryState {
        DirectoryState {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn finish_load(&self, error: Option<String>) -> DirectoryState {
        DirectoryState {
            loading: false,
            error,
            ..self.clone()
        }
    }

    pub fn refreshed(&self, summaries: Vec<ConversationSummary>) -> DirectoryState {
        DirectoryState {
            summaries,
            error: None,
            ..self.clone()
        }
    }

    pub fn refresh_failed(&self, error: String) -> DirectoryState {
        DirectoryState {
            error: Some(error),
            ..self.clone()
        }
    }
}

pub struct ConversationDirectory<B> {
    backend: Arc<B>,
    state: DirectoryState,
    loading: watch::Sender<bool>,
}

impl<B: Backend> ConversationDirectory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: DirectoryState::default(),
            loading: watch::Sender::new(false),
        }
    }

    /// Follows the loading flag while a `load_full` call is awaited.
    pub fn watch_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.state.summaries
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Replaces the summaries with the backend's listing. A failed refresh
    /// keeps what was shown before.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        match self.backend.list_conversations().await {
            Ok(summaries) => {
                debug!(count = summaries.len(), "refreshed conversation list");
                self.state = self.state.refreshed(summaries);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to refresh conversation list");
                self.state = self
                    .state
                    .refresh_failed(format!("Failed to load conversations: {err}"));
                Err(err)
            }
        }
    }

    /// Fetches one conversation with its whole history.
    pub async fn load_full(&mut self, id: &str) -> Result<Conversation, ApiError> {
        self.set_state(self.state.begin_load());
        let result = self.backend.get_conversation(id).await;
        match &result {
            Ok(conversation) => {
                if conversation.id() != id {
                    debug!(
                        requested = %id,
                        fetched = %conversation.id(),
                        "backend returned a different conversation id"
                    );
                }
                self.set_state(self.state.finish_load(None));
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to load conversation");
                self.set_state(
                    self.state
                        .finish_load(Some(format!("Failed to load conversation: {err}"))),
                );
            }
        }
        result
    }

    fn set_state(&mut self, state: DirectoryState) {
        self.loading.send_replace(state.loading);
        self.state = state;
    }
}
