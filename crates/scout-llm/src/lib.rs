pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod config;
pub mod openai;
pub mod testing;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};

pub use streaming::StreamEvent;
pub use buffer_utils::{strip_field, CircularLineBuffer, LineBufferError, DEFAULT_MAX_LINE_BYTES};
pub use config::OpenAIConfig;
pub use openai::OpenAIClient;
pub use types::{FunctionCall, Message, Tool, ToolCall, ToolChoice};
