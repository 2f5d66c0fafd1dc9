use chrono::{DateTime, Utc};
use scout_llm::{Message, ToolCall};
use serde::{Deserialize, Serialize};

/// Working memory of a thread
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Serialized chart produced by a tool; empty when none
    #[serde(default)]
    pub chart_json: String,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            chart_json: String::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        self.last_message().is_some_and(Message::has_tool_calls)
    }

    /// Tool calls requested by the last message, if it is an assistant turn
    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        self.last_message()
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default()
    }

    /// Replace the chart artifact. Only non-empty, valid JSON is accepted.
    pub fn set_chart_json(&mut self, chart_json: String) -> Result<(), serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(&chart_json)?;
        self.chart_json = chart_json;
        Ok(())
    }

    pub fn has_chart(&self) -> bool {
        !self.chart_json.is_empty()
    }
}

/// `GET /threads/{id}/state` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub thread_id: String,
    pub values: ThreadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_tool_calls() {
        let mut state = ThreadState::with_messages(vec![Message::human("hi")]);
        assert!(!state.has_pending_tool_calls());

        state.add_message(Message::ai_with_tools("", vec![ToolCall::new("c1", "query_db", "{}")]));
        assert!(state.has_pending_tool_calls());
        assert_eq!(state.pending_tool_calls()[0].id, "c1");

        state.add_message(Message::tool_result("c1", "[]"));
        assert!(!state.has_pending_tool_calls());
    }

    #[test]
    fn test_empty_tool_call_list_is_not_pending() {
        let state = ThreadState::with_messages(vec![Message::ai_with_tools("done", vec![])]);
        assert!(!state.has_pending_tool_calls());
    }

    #[test]
    fn test_set_chart_json_rejects_invalid() {
        let mut state = ThreadState::new();
        assert!(state.set_chart_json("{not json".into()).is_err());
        assert!(!state.has_chart());

        state.set_chart_json(r#"{"data":[]}"#.into()).unwrap();
        assert!(state.has_chart());
    }

    #[test]
    fn test_state_deserializes_without_chart() {
        let state: ThreadState =
            serde_json::from_str(r#"{"messages":[{"role":"human","content":"hi"}]}"#).unwrap();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.chart_json, "");
    }
}
