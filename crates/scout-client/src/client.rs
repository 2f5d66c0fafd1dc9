use reqwest::Response;
use scout_llm::Message;
use scout_types::{
    CreateThreadRequest, MessagesResponse, RunInput, RunRequest, SaveStateResponse, StreamMode,
    Thread, ThreadMetadata, ThreadSnapshot, ThreadState,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::decoder::{decode_stream, EventStream};
use crate::error::{ClientError, Result};
use crate::framer::frame_stream;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:2024";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub assistant_id: String,
    /// Thread creation can wait on a cold server
    pub create_timeout: Duration,
    pub request_timeout: Duration,
    /// Maximum silence between two reads of a run stream
    pub stream_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            assistant_id: scout_types::DEFAULT_ASSISTANT_ID.to_string(),
            create_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(30),
            stream_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

/// HTTP client for a Scout server
pub struct ScoutClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ScoutClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .read_timeout(config.stream_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Create (or reuse) a thread with a fresh id, tagged with the user
    pub async fn create_thread(&self, user_id: &str) -> Result<Thread> {
        let request = CreateThreadRequest::new(uuid::Uuid::new_v4().to_string())
            .with_metadata(ThreadMetadata::for_user(user_id));
        self.create_thread_with(request).await
    }

    pub async fn create_thread_with(&self, request: CreateThreadRequest) -> Result<Thread> {
        let response = self
            .http
            .post(self.url("/threads"))
            .timeout(self.config.create_timeout)
            .json(&request)
            .send()
            .await?;
        decode_json("thread", check_status(response).await?).await
    }

    pub async fn get_thread_state(&self, thread_id: &str) -> Result<ThreadSnapshot> {
        let response = self
            .http
            .get(self.url(&format!("/threads/{}/state", thread_id)))
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        decode_json("state", check_status(response).await?).await
    }

    pub async fn get_thread_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let response = self
            .http
            .get(self.url(&format!("/threads/{}/messages", thread_id)))
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let body: MessagesResponse = decode_json("messages", check_status(response).await?).await?;
        Ok(body.messages)
    }

    pub async fn save_thread_state(&self, thread_id: &str, state: &ThreadState) -> Result<SaveStateResponse> {
        let response = self
            .http
            .post(self.url(&format!("/threads/{}/save", thread_id)))
            .timeout(self.config.request_timeout)
            .json(state)
            .send()
            .await?;
        decode_json("save", check_status(response).await?).await
    }

    /// Start a run with one human message and decode its event stream
    pub async fn stream_run(&self, thread_id: &str, content: &str) -> Result<EventStream> {
        let request = RunRequest {
            assistant_id: self.config.assistant_id.clone(),
            input: RunInput {
                messages: vec![Message::human(content)],
            },
            stream_mode: StreamMode::MessagesTuple,
        };

        let response = self
            .http
            .post(self.url(&format!("/threads/{}/runs/stream", thread_id)))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        tracing::debug!(thread_id = %thread_id, "Run stream opened");
        Ok(decode_stream(frame_stream(response.bytes_stream())))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(kind: &str, response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| ClientError::decode(kind, body.as_str(), source))
}
