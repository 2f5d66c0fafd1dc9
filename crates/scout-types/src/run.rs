use scout_llm::Message;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSISTANT_ID: &str = "scout";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamMode {
    /// `[chunk, metadata]` pairs on `messages` events
    #[default]
    #[serde(rename = "messages-tuple")]
    MessagesTuple,
    /// Full state snapshot on `values` events only
    #[serde(rename = "values")]
    Values,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `POST /threads/{id}/runs/stream` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default = "default_assistant_id")]
    pub assistant_id: String,
    pub input: RunInput,
    #[serde(default)]
    pub stream_mode: StreamMode,
}

fn default_assistant_id() -> String {
    DEFAULT_ASSISTANT_ID.to_string()
}

impl RunRequest {
    /// Single human turn, the usual CLI request
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            assistant_id: default_assistant_id(),
            input: RunInput {
                messages: vec![Message::human(content)],
            },
            stream_mode: StreamMode::default(),
        }
    }
}
