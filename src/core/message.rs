use serde::{Deserialize, Deserializer, Serialize};

use crate::core::model_config::ModelConfiguration;

/// Label shown for assistant messages whose configuration is gone or was
/// never recorded.
pub const UNKNOWN_MODEL_LABEL: &str = "unknown model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// One entry of a conversation log.
///
/// Messages are never edited after they are appended to a log. Assistant
/// messages remember the configuration that produced them so history keeps
/// its attribution after that configuration is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MessageRecord")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produced_by_config_id: Option<String>,
    /// Client-authored failure notice, never sent to or received from the
    /// backend.
    #[serde(skip)]
    pub synthetic: bool,
}

/// Stored form of a message. Older histories name the producing
/// configuration `modelConfigId`; some carry both keys.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRecord {
    role: Role,
    content: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    produced_by_config_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    model_config_id: Option<String>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            role: record.role,
            content: record.content,
            produced_by_config_id: record.produced_by_config_id.or(record.model_config_id),
            synthetic: false,
        }
    }
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            produced_by_config_id: None,
            synthetic: false,
        }
    }

    pub fn assistant(content: impl Into<String>, config_id: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            produced_by_config_id: Some(config_id.into()),
            synthetic: false,
        }
    }

    /// An assistant-role placeholder reporting a failed exchange.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            produced_by_config_id: None,
            synthetic: true,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    /// Display name for the author of this message. Assistant replies are
    /// labeled with their configuration's name, or [`UNKNOWN_MODEL_LABEL`]
    /// when it no longer exists.
    pub fn speaker_label(&self, configs: &[ModelConfiguration]) -> String {
        match self.role {
            Role::User => "You".to_string(),
            Role::Assistant if self.synthetic => "error".to_string(),
            Role::Assistant => model_label(configs, self.produced_by_config_id.as_deref()),
        }
    }
}

/// Resolves a configuration id to its display name.
pub fn model_label(configs: &[ModelConfiguration], config_id: Option<&str>) -> String {
    config_id
        .and_then(|id| configs.iter().find(|config| config.id == id))
        .map(|config| config.name.clone())
        .unwrap_or_else(|| UNKNOWN_MODEL_LABEL.to_string())
}

/// Treats a missing, `null` or empty identifier as absent.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::sample_config;

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(Role::try_from("system").is_err());
        assert!(serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#).is_err());
    }

    #[test]
    fn history_accepts_either_attribution_field() {
        let current: Message = serde_json::from_str(
            r#"{"role":"assistant","content":"hi","producedByConfigId":"cfg-1"}"#,
        )
        .unwrap();
        let older: Message = serde_json::from_str(
            r#"{"id":7,"conversationId":"c1","role":"assistant","content":"hi","modelConfigId":"cfg-1","createdAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(current.produced_by_config_id.as_deref(), Some("cfg-1"));
        assert_eq!(older.produced_by_config_id.as_deref(), Some("cfg-1"));
        assert!(!older.synthetic);
    }

    #[test]
    fn history_with_both_attribution_fields_prefers_the_current_one() {
        let both: Message = serde_json::from_str(
            r#"{"role":"assistant","content":"hi","producedByConfigId":"cfg-1","modelConfigId":"cfg-1"}"#,
        )
        .unwrap();
        let diverging: Message = serde_json::from_str(
            r#"{"role":"assistant","content":"hi","producedByConfigId":"cfg-new","modelConfigId":"cfg-old"}"#,
        )
        .unwrap();
        let blank_current: Message = serde_json::from_str(
            r#"{"role":"assistant","content":"hi","producedByConfigId":"","modelConfigId":"cfg-old"}"#,
        )
        .unwrap();

        assert_eq!(both.produced_by_config_id.as_deref(), Some("cfg-1"));
        assert_eq!(diverging.produced_by_config_id.as_deref(), Some("cfg-new"));
        assert_eq!(blank_current.produced_by_config_id.as_deref(), Some("cfg-old"));
    }

    #[test]
    fn empty_attribution_is_treated_as_absent() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hi","modelConfigId":""}"#)
                .unwrap();
        assert_eq!(msg.produced_by_config_id, None);
    }

    #[test]
    fn deleted_configuration_degrades_to_unknown_label() {
        let configs = vec![sample_config("cfg-1", "GPT-4o", false)];
        let known = Message::assistant("a", "cfg-1");
        let orphaned = Message::assistant("b", "cfg-gone");
        let legacy = Message {
            produced_by_config_id: None,
            ..Message::assistant("c", "x")
        };

        assert_eq!(known.speaker_label(&configs), "GPT-4o");
        assert_eq!(orphaned.speaker_label(&configs), UNKNOWN_MODEL_LABEL);
        assert_eq!(legacy.speaker_label(&configs), UNKNOWN_MODEL_LABEL);
        assert_eq!(orphaned.content, "b");
        assert_eq!(Message::user("q").speaker_label(&configs), "You");
    }

    #[test]
    fn failure_messages_are_not_serialized_as_synthetic() {
        let failure = Message::failure("Error: boom");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json, serde_json::json!({"role":"assistant","content":"Error: boom"}));
    }
}
