use scout_llm::Message;
use scout_types::{ChunkMetadata, ThreadState};

use crate::node::NodeType;

/// Mutable context of one run: ids, step counter and the thread state
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub thread_id: String,
    pub step: u32,
    pub state: ThreadState,
}

impl RunState {
    pub fn new(run_id: impl Into<String>, thread_id: impl Into<String>, state: ThreadState) -> Self {
        Self {
            run_id: run_id.into(),
            thread_id: thread_id.into(),
            step: 0,
            state,
        }
    }

    pub fn metadata(&self, node: NodeType) -> ChunkMetadata {
        ChunkMetadata {
            run_id: self.run_id.clone(),
            thread_id: self.thread_id.clone(),
            node: node.as_str().to_string(),
            step: self.step,
        }
    }

    /// Answer tool calls left open by the last assistant message, so the
    /// next model call sees a result for each of them
    pub fn close_pending_tool_calls(&mut self, reason: &str) -> usize {
        let pending = self.state.pending_tool_calls();
        for call in &pending {
            self.state
                .add_message(Message::tool_error(&call.id, reason).with_tool_name(call.name()));
        }
        pending.len()
    }
}
