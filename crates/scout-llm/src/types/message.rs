use serde::{Deserialize, Serialize};
use super::tool::ToolCall;

/// Conversation message (provider-agnostic)
///
/// `System` only exists while a request is being built; thread history holds
/// human, assistant and tool turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System {
        content: String,
    },

    /// User/Human message
    #[serde(alias = "user")]
    Human {
        content: String,
    },

    /// Assistant/AI message, optionally requesting tools
    #[serde(rename = "assistant", alias = "ai")]
    AI {
        #[serde(default)]
        content: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },

    /// Tool result message
    Tool {
        tool_call_id: String,
        content: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,

        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create AI message with tool calls (content may be empty)
    pub fn ai_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            name: None,
            is_error: false,
        }
    }

    /// Tool result carrying an error payload, so the model can recover
    pub fn tool_error(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: error.into(),
            name: None,
            is_error: true,
        }
    }

    /// Attach the tool name to a tool result (no-op for other roles)
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        if let Self::Tool { name, .. } = &mut self {
            *name = Some(tool_name.into());
        }
        self
    }

    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "human",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::Human { content }
            | Self::AI { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }

    /// Tool calls requested by this message (empty unless assistant)
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::AI { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}
