use serde::{Deserialize, Serialize};
use scout_types::{MessageChunk, FINISH_TOOL_CALLS};
use std::collections::BTreeMap;

/// How successive argument fragments of one tool call combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentMode {
    /// Concatenate fragments in arrival order
    #[default]
    Accumulate,
    /// Keep only the latest fragment
    LastFragmentWins,
}

pub fn tool_call_header(name: &str) -> String {
    format!("\n\n< TOOL CALL: {} >\n\n", name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallTranscript {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: String,
}

/// Everything emitted for a run plus the reassembled tool calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub tool_calls: Vec<ToolCallTranscript>,
}

/// Folds message chunks into display text.
///
/// Each chunk contributes, in priority order: a paragraph break for a
/// `tool_calls` finish, else its tool-call fragments (header on name, raw
/// arguments), else its content.
#[derive(Debug, Default)]
pub struct ChunkAggregator {
    mode: ArgumentMode,
    text: String,
    calls: BTreeMap<u32, ToolCallTranscript>,
    last_index: Option<u32>,
    in_tool_call: bool,
}

impl ChunkAggregator {
    pub fn new(mode: ArgumentMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether the most recent visible output belonged to a tool call
    pub fn in_tool_call(&self) -> bool {
        self.in_tool_call
    }

    /// Text emitted so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fold one chunk and return the text it emits (possibly empty)
    pub fn push(&mut self, chunk: &MessageChunk) -> String {
        if !chunk.is_ai() {
            return String::new();
        }

        let emitted = if chunk.finish_reason() == Some(FINISH_TOOL_CALLS) {
            "\n\n".to_string()
        } else if !chunk.tool_call_chunks.is_empty() {
            self.in_tool_call = true;
            let mut out = String::new();
            for fragment in &chunk.tool_call_chunks {
                let index = fragment
                    .index
                    .or(self.last_index)
                    .unwrap_or_default();
                self.last_index = Some(index);

                let call = self.calls.entry(index).or_insert_with(|| ToolCallTranscript {
                    index,
                    ..Default::default()
                });
                if fragment.id.is_some() {
                    call.id.clone_from(&fragment.id);
                }
                if let Some(name) = fragment.tool_name() {
                    call.name = Some(name.to_string());
                    out.push_str(&tool_call_header(name));
                }
                if !fragment.args.is_empty() {
                    match self.mode {
                        ArgumentMode::Accumulate => call.arguments.push_str(&fragment.args),
                        ArgumentMode::LastFragmentWins => call.arguments.clone_from(&fragment.args),
                    }
                    out.push_str(&fragment.args);
                }
            }
            out
        } else {
            if !chunk.content.is_empty() {
                self.in_tool_call = false;
            }
            chunk.content.clone()
        };

        self.text.push_str(&emitted);
        emitted
    }

    pub fn finish(self) -> Transcript {
        Transcript {
            text: self.text,
            tool_calls: self.calls.into_values().collect(),
        }
    }
}

/// Aggregate a complete chunk sequence
pub fn aggregate<'a>(chunks: impl IntoIterator<Item = &'a MessageChunk>, mode: ArgumentMode) -> Transcript {
    let mut aggregator = ChunkAggregator::new(mode);
    for chunk in chunks {
        aggregator.push(chunk);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_types::ToolCallChunk;

    #[test]
    fn test_plain_content() {
        let transcript = aggregate(&[MessageChunk::ai_text("Hi")], ArgumentMode::Accumulate);
        assert_eq!(transcript.text, "Hi");
        assert!(transcript.tool_calls.is_empty());
    }

    #[test]
    fn test_tool_call_header_then_args() {
        let chunks = [
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_name("query_db")),
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_args(r#"{"q":1}"#)),
        ];
        let transcript = aggregate(&chunks, ArgumentMode::Accumulate);
        assert_eq!(transcript.text, "\n\n< TOOL CALL: query_db >\n\n{\"q\":1}");
        assert_eq!(transcript.tool_calls[0].arguments, r#"{"q":1}"#);
    }

    #[test]
    fn test_finish_marker_emits_one_break() {
        let mut aggregator = ChunkAggregator::default();
        let mut chunk = MessageChunk::ai_finish(FINISH_TOOL_CALLS);
        chunk.content = "ignored".to_string();
        assert_eq!(aggregator.push(&chunk), "\n\n");
        assert_eq!(aggregator.push(&MessageChunk::ai_finish("stop")), "");
        assert_eq!(aggregator.text(), "\n\n");
    }

    #[test]
    fn test_arguments_accumulate_in_order() {
        let chunks = [
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_id("c1").with_name("search")),
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_args(r#"{"q":"#)),
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_args(r#""rust"}"#)),
        ];
        let accumulated = aggregate(&chunks, ArgumentMode::Accumulate);
        assert_eq!(accumulated.tool_calls[0].arguments, r#"{"q":"rust"}"#);
        assert_eq!(accumulated.tool_calls[0].id.as_deref(), Some("c1"));

        let last_wins = aggregate(&chunks, ArgumentMode::LastFragmentWins);
        assert_eq!(last_wins.tool_calls[0].arguments, r#""rust"}"#);
        // Display text is identical in both modes
        assert_eq!(accumulated.text, last_wins.text);
    }

    #[test]
    fn test_multiple_calls_keyed_by_index() {
        let chunks = [MessageChunk {
            tool_call_chunks: vec![
                ToolCallChunk::new(0).with_name("a").with_args("{}"),
                ToolCallChunk::new(1).with_name("b"),
            ],
            ..MessageChunk::ai_text("")
        }];
        let transcript = aggregate(&chunks, ArgumentMode::Accumulate);

        assert_eq!(transcript.text, format!("{}{{}}{}", tool_call_header("a"), tool_call_header("b")));
        let names: Vec<_> = transcript.tool_calls.iter().map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_missing_index_continues_last_call() {
        let mut fragment = ToolCallChunk::new(0).with_args("}");
        fragment.index = None;
        let chunks = [
            MessageChunk::ai_tool_call(ToolCallChunk::new(3).with_name("x").with_args("{")),
            MessageChunk::ai_tool_call(fragment),
        ];
        let transcript = aggregate(&chunks, ArgumentMode::Accumulate);
        assert_eq!(transcript.tool_calls.len(), 1);
        assert_eq!(transcript.tool_calls[0].arguments, "{}");
    }

    #[test]
    fn test_non_ai_chunks_ignored() {
        let mut aggregator = ChunkAggregator::default();
        assert_eq!(aggregator.push(&MessageChunk::tool_message("c1", "result")), "");
        assert!(aggregator.finish().text.is_empty());
    }

    #[test]
    fn test_in_tool_call_flag() {
        let mut aggregator = ChunkAggregator::default();
        aggregator.push(&MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_name("t")));
        assert!(aggregator.in_tool_call());
        aggregator.push(&MessageChunk::ai_text("answer"));
        assert!(!aggregator.in_tool_call());
    }

    #[test]
    fn test_deterministic() {
        let chunks = [
            MessageChunk::ai_text("Let me check"),
            MessageChunk::ai_tool_call(ToolCallChunk::new(0).with_name("query_db").with_args("{}")),
            MessageChunk::ai_finish(FINISH_TOOL_CALLS),
            MessageChunk::ai_text("Done"),
        ];
        assert_eq!(
            aggregate(&chunks, ArgumentMode::Accumulate),
            aggregate(&chunks, ArgumentMode::Accumulate)
        );
    }
}
