//! Client side of a Scout run stream
//!
//! [`ScoutClient::stream_run`] yields typed events decoded from the SSE body;
//! [`ChunkAggregator`] folds their message chunks into display text.

pub mod aggregator;
pub mod client;
pub mod decoder;
pub mod error;
pub mod framer;

pub use aggregator::{
    aggregate, tool_call_header, ArgumentMode, ChunkAggregator, ToolCallTranscript, Transcript,
};
pub use client::{ClientConfig, ScoutClient, DEFAULT_SERVER_URL};
pub use decoder::{decode_stream, EventDecoder, EventStream};
pub use error::{ClientError, Result};
pub use framer::{frame_stream, FrameStream, FramedLine, LineFramer};
