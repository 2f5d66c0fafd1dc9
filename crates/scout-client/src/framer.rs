//! Line framing for `text/event-stream` bodies
//!
//! Splits raw bytes into lines and tags each one. Only the current pending
//! line is buffered, bounded by the configured maximum line length.

use futures::{Stream, StreamExt};
use scout_llm::{strip_field, CircularLineBuffer, DEFAULT_MAX_LINE_BYTES};
use std::pin::Pin;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramedLine {
    /// `event:` marker, payload trimmed
    Event(String),
    /// `data:` payload, one leading space stripped
    Data(String),
    /// Anything else (comments, `id:`, `retry:`); ignored downstream
    Other,
}

impl FramedLine {
    /// Classify one line. Blank lines are separators and yield `None`.
    pub fn classify(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        if let Some(kind) = line.strip_prefix("event:") {
            return Some(Self::Event(kind.trim().to_string()));
        }
        if let Some(data) = strip_field(line, "data") {
            return Some(Self::Data(data.to_string()));
        }
        Some(Self::Other)
    }
}

/// Push-based framer over a byte stream
pub struct LineFramer {
    buffer: CircularLineBuffer,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: CircularLineBuffer::with_capacity(4096).with_max_line_bytes(max_line_bytes),
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Next complete non-blank line, if one is buffered
    pub fn next_frame(&mut self) -> Option<Result<FramedLine>> {
        while let Some(line) = self.buffer.next_line() {
            match line {
                Ok(line) => {
                    if let Some(frame) = FramedLine::classify(&line) {
                        return Some(Ok(frame));
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }

    /// Flush an unterminated final line once the input has ended
    pub fn finish(&mut self) -> Option<Result<FramedLine>> {
        match self.buffer.finish()? {
            Ok(line) => FramedLine::classify(&line).map(Ok),
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

pub type FrameStream = Pin<Box<dyn Stream<Item = Result<FramedLine>> + Send>>;

/// Frame a byte stream. The stream ends after the first error.
pub fn frame_stream<S, B, E>(bytes: S) -> FrameStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    Box::pin(async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut framer = LineFramer::new();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    framer.push(chunk.as_ref());
                    while let Some(frame) = framer.next_frame() {
                        let failed = frame.is_err();
                        yield frame;
                        if failed {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let err: ClientError = e.into();
                    yield Err(err);
                    return;
                }
            }
        }

        if let Some(frame) = framer.finish() {
            yield frame;
        }
    })
}
