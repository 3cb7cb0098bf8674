//! Wire payloads for the backend REST contract and the [`Backend`] seam the
//! core components talk through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::message::deserialize_optional_id;
use crate::core::model_config::{ConfigDraft, ModelConfiguration, Provider, TestOutcome};

pub mod client;
pub mod error;

pub use client::HttpBackend;
pub use error::ApiError;

/// Body of `POST /api/model-configs` and `PUT /api/model-configs/{id}`.
///
/// `apiKey` is left out entirely when an edit keeps the stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub name: String,
    pub provider: Provider,
    pub base_url: String,
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub is_default: bool,
}

impl From<&ConfigDraft> for ConfigPayload {
    fn from(draft: &ConfigDraft) -> Self {
        Self {
            name: draft.name.clone(),
            provider: draft.provider,
            base_url: draft.base_url.clone(),
            model_id: draft.model_id.clone(),
            api_key: draft.api_key.as_replacement().map(str::to_owned),
            is_default: draft.is_default,
        }
    }
}

/// Body of `POST /api/model-configs/test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProbe {
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
}

/// Body of `POST /api/chat`.
///
/// Only the `modelConfigId`-keyed contract is spoken; the older `modelId`
/// form is not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub model_config_id: String,
    pub message: String,
    pub conversation_id: Option<String>,
}

/// Response of `POST /api/chat`. Older backends omit `conversationId`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub conversation_id: Option<String>,
}

/// Every backend endpoint the client uses.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_configs(&self) -> Result<Vec<ModelConfiguration>, ApiError>;

    async fn create_config(&self, payload: &ConfigPayload) -> Result<(), ApiError>;

    async fn update_config(&self, id: &str, payload: &ConfigPayload) -> Result<(), ApiError>;

    async fn delete_config(&self, id: &str) -> Result<(), ApiError>;

    async fn test_config(&self, probe: &ConnectionProbe) -> Result<TestOutcome, ApiError>;

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError>;

    async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model_config::Credential;
    use serde_json::json;

    fn draft(api_key: Credential) -> ConfigDraft {
        ConfigDraft {
            name: "GPT-4o".to_string(),
            provider: Provider::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            model_id: "gpt-4o".to_string(),
            api_key,
            is_default: true,
        }
    }

    #[test]
    fn kept_credential_is_omitted_from_the_payload() {
        let payload = ConfigPayload::from(&draft(Credential::Keep));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "GPT-4o",
                "provider": "openai",
                "baseUrl": "https://api.openai.com/v1",
                "modelId": "gpt-4o",
                "isDefault": true
            })
        );
    }

    #[test]
    fn replaced_credential_is_sent() {
        let payload = ConfigPayload::from(&draft(Credential::Replace("sk-1".to_string())));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["apiKey"], "sk-1");
    }

    #[test]
    fn new_conversation_sends_explicit_null_id() {
        let request = ChatRequest {
            model_config_id: "cfg-1".to_string(),
            message: "Hello".to_string(),
            conversation_id: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"modelConfigId": "cfg-1", "message": "Hello", "conversationId": null})
        );
    }

    #[test]
    fn reply_without_conversation_id_is_accepted() {
        let legacy: ChatReply = serde_json::from_str(r#"{"response":"Hi"}"#).unwrap();
        assert_eq!(legacy.conversation_id, None);

        let blank: ChatReply =
            serde_json::from_str(r#"{"response":"Hi","conversationId":""}"#).unwrap();
        assert_eq!(blank.conversation_id, None);

        let current: ChatReply =
            serde_json::from_str(r#"{"response":"Hi","conversationId":"c1"}"#).unwrap();
        assert_eq!(current.conversation_id.as_deref(), Some("c1"));
    }
}
