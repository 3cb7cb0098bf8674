//! `reqwest` implementation of [`Backend`].

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{ApiError, Backend, ChatReply, ChatRequest, ConfigPayload, ConnectionProbe};
use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::model_config::{ModelConfiguration, TestOutcome};
use crate::utils::url::normalize_base_url;

const MODEL_CONFIGS: &str = "model-configs";
const CONVERSATIONS: &str = "conversations";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base}/api/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            ApiError::Transport(format!("invalid backend address {}: {err}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Transport(format!(
                    "backend address {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "backend request");
        Ok(self.client.request(method, url))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.request(Method::GET, segments)?.send().await?;
        read_json(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, ApiError> {
        Ok(self
            .request(method, segments)?
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        debug!(status = status.as_u16(), "backend rejected request");
        return Err(ApiError::from_status(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

async fn expect_success(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    debug!(status = status.as_u16(), "backend rejected request");
    Err(ApiError::from_status(status.as_u16(), &body))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_configs(&self) -> Result<Vec<ModelConfiguration>, ApiError> {
        let configs: Option<Vec<ModelConfiguration>> = self.get_json(&[MODEL_CONFIGS]).await?;
        Ok(configs.unwrap_or_default())
    }

    async fn create_config(&self, payload: &ConfigPayload) -> Result<(), ApiError> {
        let response = self
            .send_json(Method::POST, &[MODEL_CONFIGS], payload)
            .await?;
        expect_success(response).await
    }

    async fn update_config(&self, id: &str, payload: &ConfigPayload) -> Result<(), ApiError> {
        let response = self
            .send_json(Method::PUT, &[MODEL_CONFIGS, id], payload)
            .await?;
        expect_success(response).await
    }

    async fn delete_config(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &[MODEL_CONFIGS, id])?
            .send()
            .await?;
        expect_success(response).await
    }

    async fn test_config(&self, probe: &ConnectionProbe) -> Result<TestOutcome, ApiError> {
        let response = self
            .send_json(Method::POST, &[MODEL_CONFIGS, "test"], probe)
            .await?;
        read_json(response).await
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        let summaries: Option<Vec<ConversationSummary>> =
            self.get_json(&[CONVERSATIONS]).await?;
        Ok(summaries.unwrap_or_default())
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        self.get_json(&[CONVERSATIONS, id]).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let response = self.send_json(Method::POST, &["chat"], request).await?;
        read_json(response).await
    }
}
