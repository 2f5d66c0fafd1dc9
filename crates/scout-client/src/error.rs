use scout_llm::LineBufferError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode {kind} payload: {source} (payload: {payload})")]
    Decode {
        kind: String,
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    #[error("Undecodable stream line: {0}")]
    Line(#[from] LineBufferError),
}

impl ClientError {
    pub(crate) fn decode(kind: impl Into<String>, payload: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            kind: kind.into(),
            payload: payload.into(),
            source,
        }
    }

    /// 404 from the server
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// The stream arrived but its content could not be decoded
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::MalformedStream(_) | Self::Line(_)
        )
    }

    /// Raw payload and event kind, when the error came from decoding
    pub fn diagnostics(&self) -> Option<(&str, &str)> {
        match self {
            Self::Decode { kind, payload, .. } => Some((kind, payload)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
