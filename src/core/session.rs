//! The active conversation and the chat submit protocol.
//!
//! [`SessionState`] is an immutable snapshot; every transition returns a new
//! value. [`ConversationSession`] only sequences those transitions around the
//! network call.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, Backend, ChatReply, ChatRequest};
use crate::core::conversation::Conversation;
use crate::core::directory::ConversationDirectory;
use crate::core::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("A message is already being sent")]
    Busy,
    #[error("Nothing to send")]
    EmptyInput,
    #[error("No model configuration is selected")]
    NoConfigSelected,
}

/// What was sent by a submit that is now waiting for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub config_id: String,
    pub message: String,
    pub conversation_id: Option<String>,
}

impl PendingExchange {
    pub fn request(&self) -> ChatRequest {
        ChatRequest {
            model_config_id: self.config_id.clone(),
            message: self.message.clone(),
            conversation_id: self.conversation_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The reply was appended. `adopted_id` is set when this exchange gave an
    /// anonymous conversation its backend id.
    Replied { adopted_id: Option<String> },
    /// A synthetic failure message was appended instead of a reply.
    Failed { error: ApiError },
}

impl ExchangeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExchangeOutcome::Replied { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    input: String,
    sending: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn phase(&self) -> SessionPhase {
        if self.sending {
            SessionPhase::Sending
        } else if self.conversation_id.is_none() && self.messages.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Active
        }
    }

    pub fn with_input(&self, input: impl Into<String>) -> SessionState {
        SessionState {
            input: input.into(),
            ..self.clone()
        }
    }

    /// Starts a submit: appends the user message, clears the input and
    /// enters `Sending`. Rejections leave the state as it was.
    pub fn begin_submit(
        &self,
        selected_config: Option<&str>,
    ) -> Result<(SessionState, PendingExchange), SubmitRejected> {
        if self.sending {
            return Err(SubmitRejected::Busy);
        }
        let text = self.input.trim();
        if text.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        let config_id = selected_config.ok_or(SubmitRejected::NoConfigSelected)?;

        let pending = PendingExchange {
            config_id: config_id.to_string(),
            message: text.to_string(),
            conversation_id: self.conversation_id.clone(),
        };
        let mut messages = self.messages.clone();
        messages.push(Message::user(text));
        let next = SessionState {
            conversation_id: self.conversation_id.clone(),
            messages,
            input: String::new(),
            sending: true,
        };
        Ok((next, pending))
    }

    /// Finishes a submit with the backend's answer. Failures add one
    /// synthetic assistant message; the user message is always kept.
    pub fn complete_submit(
        &self,
        pending: &PendingExchange,
        result: Result<ChatReply, ApiError>,
    ) -> (SessionState, ExchangeOutcome) {
        let mut next = SessionState {
            sending: false,
            ..self.clone()
        };
        match result {
            Ok(reply) => {
                let adopted_id = match reply.conversation_id {
                    Some(id) if next.conversation_id.is_none() => {
                        next.conversation_id = Some(id.clone());
                        Some(id)
                    }
                    _ => None,
                };
                next.messages
                    .push(Message::assistant(reply.response, pending.config_id.as_str()));
                (next, ExchangeOutcome::Replied { adopted_id })
            }
            Err(error) => {
                next.messages.push(Message::failure(format!(
                    "Error: Failed to get response from server: {error}"
                )));
                (next, ExchangeOutcome::Failed { error })
            }
        }
    }

    /// Replaces the active conversation with one fetched from the backend.
    pub fn loaded(&self, conversation: Conversation) -> SessionState {
        SessionState {
            conversation_id: Some(conversation.summary.id),
            messages: conversation.messages,
            input: self.input.clone(),
            sending: false,
        }
    }

    /// Forgets the active conversation. Nothing is sent to the backend.
    pub fn reset(&self) -> SessionState {
        SessionState {
            input: self.input.clone(),
            ..SessionState::default()
        }
    }
}

pub struct ConversationSession<B> {
    backend: Arc<B>,
    state: SessionState,
}

impl<B: Backend> ConversationSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.state = self.state.with_input(input);
    }

    pub fn load(&mut self, conversation: Conversation) {
        debug!(
            id = %conversation.id(),
            messages = conversation.messages.len(),
            "opened conversation"
        );
        self.state = self.state.loaded(conversation);
    }

    pub fn start_new(&mut self) {
        self.state = self.state.reset();
    }

    /// Sends the current input with `selected_config`.
    ///
    /// A successful exchange refreshes `directory` exactly once; a failed
    /// refresh is logged and does not touch the message log.
    pub async fn submit(
        &mut self,
        selected_config: Option<&str>,
        directory: &mut ConversationDirectory<B>,
    ) -> Result<ExchangeOutcome, SubmitRejected> {
        let (sending, pending) = self.state.begin_submit(selected_config)?;
        self.state = sending;
        debug!(
            config = %pending.config_id,
            conversation = ?pending.conversation_id,
            "submitting chat message"
        );

        let result = self.backend.chat(&pending.request()).await;
        let (next, outcome) = self.state.complete_submit(&pending, result);
        self.state = next;

        match &outcome {
            ExchangeOutcome::Replied { adopted_id } => {
                if pending.conversation_id.is_none() && adopted_id.is_none() {
                    warn!("backend reply carried no conversation id; conversation stays anonymous");
                }
                if let Err(err) = directory.refresh().await {
                    debug!(error = %err, "conversation list not refreshed after reply");
                }
            }
            ExchangeOutcome::Failed { error } => {
                warn!(error = %error, "chat request failed");
            }
        }
        Ok(outcome)
    }
}
