use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::CircularLineBuffer;
use crate::StreamEvent;

/// Strategy for turning provider `data:` payloads into stream events
pub trait SseLineParser: Send {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    /// Check if this payload signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Strip an SSE field name (`data`, `event`, ...) and the single optional
/// space that follows the colon.
pub fn strip_field<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Parse a provider SSE response into stream events
pub fn parse_sse_stream<P: SseLineParser + 'static>(
    response: Response,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
    parse_sse_bytes(response.bytes_stream(), parser)
}

/// Same as [`parse_sse_stream`], over any byte stream
pub fn parse_sse_bytes<S, B, E, P>(
    stream: S,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = CircularLineBuffer::with_capacity(4096);

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        let line = match line_result {
                            Ok(line) => line,
                            Err(e) => {
                                yield Err(anyhow::Error::from(e));
                                continue;
                            }
                        };

                        let Some(data) = strip_field(&line, "data") else {
                            continue;
                        };

                        if parser.is_done_marker(data) {
                            yield Ok(StreamEvent::Done { finish_reason: None });
                            break 'outer;
                        }

                        match parser.parse_data_line(data) {
                            Ok(events) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_field() {
        assert_eq!(strip_field("data: {}", "data"), Some("{}"));
        assert_eq!(strip_field("data:{}", "data"), Some("{}"));
        assert_eq!(strip_field("data:  x", "data"), Some(" x"));
        assert_eq!(strip_field("event: messages", "data"), None);
        assert_eq!(strip_field("database: x", "data"), None);
    }
}
