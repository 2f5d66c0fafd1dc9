use futures::{Stream, StreamExt};
use scout_types::{EventKind, MessageChunk, StreamEvent};
use serde_json::Value;
use std::pin::Pin;

use crate::error::{ClientError, Result};
use crate::framer::{FrameStream, FramedLine};

/// Turns framed lines into typed events.
///
/// The only state is the kind named by the most recent `event:` marker.
#[derive(Debug, Default)]
pub struct EventDecoder {
    current_kind: Option<EventKind>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_kind(&self) -> Option<&EventKind> {
        self.current_kind.as_ref()
    }

    /// Decode one line; markers and ignored lines produce `None`
    pub fn decode(&mut self, line: FramedLine) -> Result<Option<StreamEvent>> {
        let payload = match line {
            FramedLine::Event(kind) => {
                self.current_kind = Some(EventKind::parse(&kind));
                return Ok(None);
            }
            FramedLine::Other => return Ok(None),
            FramedLine::Data(payload) => payload,
        };

        let Some(kind) = &self.current_kind else {
            return Err(ClientError::MalformedStream(format!(
                "data line before any event marker: {}",
                payload
            )));
        };

        let event = match kind {
            EventKind::Messages => {
                let (chunk, metadata) = serde_json::from_str::<(MessageChunk, Value)>(&payload)
                    .map_err(|source| ClientError::decode(kind.as_str(), payload.as_str(), source))?;
                StreamEvent::Messages { chunk, metadata }
            }
            // Opaque; kept as a raw string when it is not JSON
            EventKind::Metadata => {
                StreamEvent::Metadata(serde_json::from_str(&payload).unwrap_or(Value::String(payload)))
            }
            EventKind::Other(kind) => StreamEvent::Other {
                kind: kind.clone(),
                data: payload,
            },
        };
        Ok(Some(event))
    }

    /// Decode only message chunks, dropping every other event
    pub fn decode_chunk(&mut self, line: FramedLine) -> Result<Option<MessageChunk>> {
        Ok(self.decode(line)?.and_then(StreamEvent::into_chunk))
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Lazily decode a framed stream with a fresh decoder. Ends after the first error.
pub fn decode_stream(mut frames: FrameStream) -> EventStream {
    Box::pin(async_stream::stream! {
        let mut decoder = EventDecoder::new();

        while let Some(frame) = frames.next().await {
            match frame.and_then(|line| decoder.decode(line)) {
                Ok(Some(event)) => yield Ok(event),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Stopping stream decode");
                    yield Err(e);
                    return;
                }
            }
        }
    })
}
