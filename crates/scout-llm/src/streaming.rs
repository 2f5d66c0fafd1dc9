use anyhow::{Context, Result};
use futures::Stream;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::buffer_utils::{parse_sse_stream, SseLineParser};

/// Incremental output of one model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },

    /// Fragment of one tool call; fragments sharing `index` belong together
    ToolCall {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

// Chat Completions streaming wire format

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl ChatStreamChunk {
    pub fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        let Some(choice) = self.choices.first() else {
            return events;
        };

        if let Some(content) = &choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::Message {
                    content: content.clone(),
                });
            }
        }

        for tc in choice.delta.tool_calls.iter().flatten() {
            events.push(StreamEvent::ToolCall {
                index: tc.index,
                id: tc.id.clone(),
                name: tc.function.as_ref().and_then(|f| f.name.clone()),
                arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
            });
        }

        if let Some(finish_reason) = &choice.finish_reason {
            events.push(StreamEvent::Done {
                finish_reason: Some(finish_reason.clone()),
            });
        }

        events
    }
}

/// Parses `data:` payloads of a Chat Completions stream
pub struct ChatChunkParser;

impl SseLineParser for ChatChunkParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>> {
        let chunk: ChatStreamChunk =
            serde_json::from_str(data).context("Failed to parse chat chunk")?;
        Ok(chunk.to_stream_events())
    }
}

pub fn parse_chat_sse_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
    parse_sse_stream(response, ChatChunkParser)
}
