//! Shared fixtures for unit tests: a scripted [`Backend`] and a minimal
//! HTTP/1.1 stub server.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use crate::api::{ApiError, Backend, ChatReply, ChatRequest, ConfigPayload, ConnectionProbe};
use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::model_config::{ModelConfiguration, Provider, TestOutcome};

pub fn sample_config(id: &str, name: &str, is_default: bool) -> ModelConfiguration {
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    ModelConfiguration {
        id: id.to_string(),
        name: name.to_string(),
        provider: Provider::OpenAi,
        base_url: Provider::OpenAi.default_base_url().to_string(),
        model_id: format!("{id}-model"),
        is_default,
        created_at: stamp,
        updated_at: stamp,
    }
}

pub fn sample_summary(id: &str, title: &str) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        title: title.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub fn chat_reply(response: &str, conversation_id: Option<&str>) -> ChatReply {
    ChatReply {
        response: response.to_string(),
        conversation_id: conversation_id.map(str::to_owned),
    }
}

/// One recorded call against [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListConfigs,
    CreateConfig(ConfigPayload),
    UpdateConfig(String, ConfigPayload),
    DeleteConfig(String),
    TestConfig(ConnectionProbe),
    ListConversations,
    GetConversation(String),
    Chat(ChatRequest),
}

/// Parks a scripted call until the test lets it through.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Resolves once the held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Backend whose answers are queued up front. Each endpoint pops its next
/// scripted result; an empty queue answers with an empty success, except
/// for endpoints that must return a value, which fail with a transport
/// error.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    configs: Mutex<VecDeque<Result<Vec<ModelConfiguration>, ApiError>>>,
    mutations: Mutex<VecDeque<Result<(), ApiError>>>,
    tests: Mutex<VecDeque<Result<TestOutcome, ApiError>>>,
    summaries: Mutex<VecDeque<Result<Vec<ConversationSummary>, ApiError>>>,
    conversations: Mutex<VecDeque<Result<Conversation, ApiError>>>,
    replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    conversation_gate: Mutex<Option<Gate>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_configs(&self, result: Result<Vec<ModelConfiguration>, ApiError>) {
        self.configs.lock().unwrap().push_back(result);
    }

    pub fn push_mutation(&self, result: Result<(), ApiError>) {
        self.mutations.lock().unwrap().push_back(result);
    }

    pub fn push_test(&self, result: Result<TestOutcome, ApiError>) {
        self.tests.lock().unwrap().push_back(result);
    }

    pub fn push_summaries(&self, result: Result<Vec<ConversationSummary>, ApiError>) {
        self.summaries.lock().unwrap().push_back(result);
    }

    pub fn push_conversation(&self, result: Result<Conversation, ApiError>) {
        self.conversations.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: Result<ChatReply, ApiError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    /// Every later `get_conversation` waits on the returned gate.
    pub fn hold_conversations(&self) -> Gate {
        let gate = Gate::default();
        *self.conversation_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn unscripted<T>(endpoint: &str) -> Result<T, ApiError> {
    Err(ApiError::Transport(format!("no scripted response for {endpoint}")))
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_configs(&self) -> Result<Vec<ModelConfiguration>, ApiError> {
        self.record(Call::ListConfigs);
        self.configs.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn create_config(&self, payload: &ConfigPayload) -> Result<(), ApiError> {
        self.record(Call::CreateConfig(payload.clone()));
        self.mutations.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn update_config(&self, id: &str, payload: &ConfigPayload) -> Result<(), ApiError> {
        self.record(Call::UpdateConfig(id.to_string(), payload.clone()));
        self.mutations.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn delete_config(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteConfig(id.to_string()));
        self.mutations.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn test_config(&self, probe: &ConnectionProbe) -> Result<TestOutcome, ApiError> {
        self.record(Call::TestConfig(probe.clone()));
        self.tests
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| unscripted("test_config"))
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        self.record(Call::ListConversations);
        self.summaries.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        self.record(Call::GetConversation(id.to_string()));
        let gate = self.conversation_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.conversations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| unscripted("get_conversation"))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.record(Call::Chat(request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| unscripted("chat"))
    }
}

/// Canned answer for [`spawn_http_stub`].
pub struct StubResponse {
    status: u16,
    body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

pub type CapturedRequests = Arc<tokio::sync::Mutex<Vec<CapturedRequest>>>;

/// Serves each response on its own connection, in order, and records what
/// the client sent.
pub async fn spawn_http_stub(responses: Vec<StubResponse>) -> (SocketAddr, CapturedRequests) {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured: CapturedRequests = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let captured_for_server = Arc::clone(&captured);

    tokio::spawn(async move {
        for response in responses {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            let request = read_http_request(&mut stream).await?;
            captured_for_server.lock().await.push(request);

            let raw = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{}",
                response.status,
                reason_phrase(response.status),
                response.body.len(),
                response.body
            );
            stream
                .write_all(raw.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            stream.shutdown().await.map_err(|err| err.to_string())?;
        }
        Ok::<(), String>(())
    });

    (addr, captured)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

async fn read_http_request(stream: &mut tokio::net::TcpStream) -> Result<CapturedRequest, String> {
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.ok_or_else(|| "header end should exist".to_string())?;
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}
