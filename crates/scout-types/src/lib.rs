pub mod events;
pub mod run;
pub mod state;
pub mod thread;

pub use events::{
    ChunkMetadata, EventKind, MessageChunk, ResponseMetadata, StreamEvent, ToolCallChunk,
    AI_MESSAGE_CHUNK, FINISH_TOOL_CALLS, TOOL_MESSAGE,
};
pub use run::{RunInput, RunRequest, StreamMode, DEFAULT_ASSISTANT_ID};
pub use state::{ThreadSnapshot, ThreadState};
pub use thread::{
    CreateThreadRequest, IfExists, MessagesResponse, SaveStateResponse, Thread, ThreadMetadata,
};

pub use scout_llm::{Message, ToolCall};
