use std::collections::VecDeque;
use thiserror::Error;

/// Upper bound for a single pending line (1 MiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineBufferError {
    #[error("invalid UTF-8 in stream line: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("stream line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Circular buffer for line-based parsing of streamed bytes
///
/// Holds at most one pending (incomplete) line. Bytes up to and including a
/// `\n` are drained as soon as the line is complete.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
    // bytes already searched for '\n'
    scanned: usize,
    max_line_bytes: usize,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line, without its `\n` / `\r\n` terminator.
    /// Returns None if no complete line is available yet.
    pub fn next_line(&mut self) -> Option<Result<String, LineBufferError>> {
        let found = self
            .buffer
            .iter()
            .skip(self.scanned)
            .position(|&b| b == b'\n')
            .map(|offset| self.scanned + offset);

        match found {
            Some(newline_pos) => {
                self.scanned = 0;
                let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
                if newline_pos > self.max_line_bytes {
                    return Some(Err(LineBufferError::LineTooLong {
                        limit: self.max_line_bytes,
                    }));
                }
                Some(Self::decode(&line_bytes[..newline_pos]))
            }
            None => {
                if self.buffer.len() > self.max_line_bytes {
                    self.buffer.clear();
                    self.scanned = 0;
                    return Some(Err(LineBufferError::LineTooLong {
                        limit: self.max_line_bytes,
                    }));
                }
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Flush a trailing line that was never terminated (end of stream)
    pub fn finish(&mut self) -> Option<Result<String, LineBufferError>> {
        if self.buffer.is_empty() {
            return None;
        }
        self.scanned = 0;
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        Some(Self::decode(&rest))
    }

    fn decode(bytes: &[u8]) -> Result<String, LineBufferError> {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        Ok(std::str::from_utf8(bytes)?.to_string())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
