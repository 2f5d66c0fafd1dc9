mod buffering;
mod sse_parser;

pub use buffering::{CircularLineBuffer, LineBufferError, DEFAULT_MAX_LINE_BYTES};
pub use sse_parser::{parse_sse_bytes, parse_sse_stream, strip_field, SseLineParser};
