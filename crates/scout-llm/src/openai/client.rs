// OpenAI-compatible client (Groq, OpenAI, local gateways)

use crate::config::OpenAIConfig;
use crate::streaming::parse_chat_sse_stream;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
use crate::types::{Message, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Chat Completions client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
        })
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let mut request = Map::new();
        request.insert("model".to_string(), json!(model));
        request.insert(
            "messages".to_string(),
            Value::Array(messages.iter().map(Self::convert_message).collect()),
        );
        request.insert("stream".to_string(), json!(stream));

        if let Some(temp) = options.temperature {
            request.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            request.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if let Some(tools) = options.tools.as_ref().filter(|t| !t.is_empty()) {
            request.insert("tools".to_string(), serde_json::to_value(tools)?);
            if let Some(tool_choice) = &options.tool_choice {
                request.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
            }
        }

        Ok(Value::Object(request))
    }

    /// Convert our Message type to the Chat Completions format
    fn convert_message(message: &Message) -> Value {
        match message {
            Message::System { content } => json!({ "role": "system", "content": content }),
            Message::Human { content } => json!({ "role": "user", "content": content }),
            Message::AI { content, tool_calls } => {
                let mut obj = Map::new();
                obj.insert("role".to_string(), json!("assistant"));
                obj.insert("content".to_string(), json!(content));
                if !tool_calls.is_empty() {
                    obj.insert("tool_calls".to_string(), json!(tool_calls));
                }
                Value::Object(obj)
            }
            Message::Tool { tool_call_id, content, .. } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": content,
            }),
        }
    }

    async fn post_chat(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload =
            self.build_chat_request(&request.model, &request.messages, &request.options, false)?;
        let response = self.post_chat(&payload).await?;

        let raw: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let (content, tool_calls) = match choice {
            Some(c) => (c.message.content, c.message.tool_calls.unwrap_or_default()),
            None => (None, Vec::new()),
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            usage: raw.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload =
            self.build_chat_request(&request.model, &request.messages, &request.options, true)?;
        let response = self.post_chat(&payload).await?;
        Ok(parse_chat_sse_stream(response))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
