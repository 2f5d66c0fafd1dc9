use scout_types::{ChunkMetadata, MessageChunk, StreamEvent, ThreadState};
use serde_json::json;

/// Event emitted by a running graph
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Always first
    Metadata { run_id: String, thread_id: String },
    Message {
        chunk: MessageChunk,
        metadata: ChunkMetadata,
    },
    /// State after a checkpointed transition
    Values(ThreadState),
    Error { message: String },
    /// Always last
    End,
}

impl RunEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Metadata { .. } => "metadata",
            Self::Message { .. } => "messages",
            Self::Values(_) => "values",
            Self::Error { .. } => "error",
            Self::End => "end",
        }
    }

    /// Wire representation
    pub fn to_stream_event(&self) -> Result<StreamEvent, serde_json::Error> {
        Ok(match self {
            Self::Metadata { run_id, thread_id } => {
                StreamEvent::Metadata(json!({ "run_id": run_id, "thread_id": thread_id }))
            }
            Self::Message { chunk, metadata } => StreamEvent::Messages {
                chunk: chunk.clone(),
                metadata: serde_json::to_value(metadata)?,
            },
            Self::Values(state) => StreamEvent::Other {
                kind: self.name().to_string(),
                data: serde_json::to_string(state)?,
            },
            Self::Error { message } => StreamEvent::Other {
                kind: self.name().to_string(),
                data: json!({ "message": message }).to_string(),
            },
            Self::End => StreamEvent::Other {
                kind: self.name().to_string(),
                data: "null".to_string(),
            },
        })
    }
}
