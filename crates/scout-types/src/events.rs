use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const AI_MESSAGE_CHUNK: &str = "AIMessageChunk";
pub const TOOL_MESSAGE: &str = "ToolMessage";

/// Finish reason signalling the model stopped to request tools
pub const FINISH_TOOL_CALLS: &str = "tool_calls";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial message fragment carried by a `messages` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    #[serde(rename = "type")]
    pub chunk_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_call_chunks: Vec<ToolCallChunk>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub response_metadata: ResponseMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Set on tool-result chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl MessageChunk {
    fn ai() -> Self {
        Self {
            chunk_type: AI_MESSAGE_CHUNK.to_string(),
            content: String::new(),
            tool_call_chunks: Vec::new(),
            response_metadata: ResponseMetadata::default(),
            id: None,
            tool_call_id: None,
        }
    }

    pub fn ai_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::ai()
        }
    }

    pub fn ai_tool_call(fragment: ToolCallChunk) -> Self {
        Self {
            tool_call_chunks: vec![fragment],
            ..Self::ai()
        }
    }

    /// Final chunk of a model turn
    pub fn ai_finish(finish_reason: impl Into<String>) -> Self {
        Self {
            response_metadata: ResponseMetadata {
                finish_reason: Some(finish_reason.into()),
                extra: Map::new(),
            },
            ..Self::ai()
        }
    }

    pub fn tool_message(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            chunk_type: TOOL_MESSAGE.to_string(),
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            ..Self::ai()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this fragment belongs to an assistant message
    pub fn is_ai(&self) -> bool {
        matches!(self.chunk_type.as_str(), AI_MESSAGE_CHUNK | "AIMessage" | "ai")
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.response_metadata.finish_reason.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Provider fields passed through untouched (model name, usage, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial piece of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    #[serde(default)]
    pub index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub args: String,
}

impl ToolCallChunk {
    pub fn new(index: u32) -> Self {
        Self {
            index: Some(index),
            id: None,
            name: None,
            args: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    /// Name, ignoring empty strings some providers send on continuation chunks
    pub fn tool_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Second element of a `messages` payload, produced by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub run_id: String,
    pub thread_id: String,
    /// Graph node that produced the chunk (`chatbot` or `tools`)
    pub node: String,
    pub step: u32,
}

/// Discriminant of a wire event (`event:` line)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Messages,
    Metadata,
    /// Forward-compatible kinds (`values`, `end`, `error`, ...)
    Other(String),
}

impl EventKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "messages" => Self::Messages,
            "metadata" => Self::Metadata,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Messages => "messages",
            Self::Metadata => "metadata",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded wire event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `[MessageChunk, Metadata]`; metadata is opaque
    Messages {
        chunk: MessageChunk,
        metadata: Value,
    },
    Metadata(Value),
    Other {
        kind: String,
        data: String,
    },
}

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Messages { .. } => EventKind::Messages,
            Self::Metadata(_) => EventKind::Metadata,
            Self::Other { kind, .. } => EventKind::Other(kind.clone()),
        }
    }

    pub fn chunk(&self) -> Option<&MessageChunk> {
        match self {
            Self::Messages { chunk, .. } => Some(chunk),
            _ => None,
        }
    }

    pub fn into_chunk(self) -> Option<MessageChunk> {
        match self {
            Self::Messages { chunk, .. } => Some(chunk),
            _ => None,
        }
    }

    /// Payload of the `data:` line
    pub fn data(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Messages { chunk, metadata } => serde_json::to_string(&(chunk, metadata)),
            Self::Metadata(value) => serde_json::to_string(value),
            Self::Other { data, .. } => Ok(data.clone()),
        }
    }

    /// Full text/event-stream frame, terminated by a blank line
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        Ok(format!("event: {}\ndata: {}\n\n", self.kind(), self.data()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_defaults_for_missing_and_null_fields() {
        let chunk: MessageChunk = serde_json::from_value(json!({
            "type": "AIMessageChunk",
            "content": null,
            "tool_call_chunks": [{"index": 0, "name": "query_db", "args": null}],
        }))
        .unwrap();

        assert_eq!(chunk.content, "");
        assert_eq!(chunk.tool_call_chunks[0].args, "");
        assert_eq!(chunk.finish_reason(), None);
        assert!(chunk.is_ai());
    }

    #[test]
    fn test_chunk_requires_type() {
        let result = serde_json::from_value::<MessageChunk>(json!({"content": "Hi"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_metadata_passes_extra_fields() {
        let chunk: MessageChunk = serde_json::from_value(json!({
            "type": "AIMessageChunk",
            "response_metadata": {"finish_reason": "stop", "model_name": "llama"},
        }))
        .unwrap();

        assert_eq!(chunk.finish_reason(), Some("stop"));
        assert_eq!(chunk.response_metadata.extra["model_name"], "llama");
    }

    #[test]
    fn test_tool_message_is_not_ai() {
        assert!(!MessageChunk::tool_message("call_1", "42").is_ai());
    }

    #[test]
    fn test_empty_tool_name_ignored() {
        let fragment = ToolCallChunk::new(0).with_name("");
        assert_eq!(fragment.tool_name(), None);
    }

    #[test]
    fn test_frame_encoding() {
        let event = StreamEvent::Messages {
            chunk: MessageChunk::ai_text("Hi"),
            metadata: json!({}),
        };
        let frame = event.to_frame().unwrap();
        assert!(frame.starts_with("event: messages\ndata: [{"));
        assert!(frame.ends_with("},{}]\n\n"));
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!(EventKind::parse("messages"), EventKind::Messages);
        assert_eq!(EventKind::parse("metadata"), EventKind::Metadata);
        assert_eq!(EventKind::parse("values"), EventKind::Other("values".into()));
        assert_eq!(EventKind::Other("end".into()).to_string(), "end");
    }
}
