use std::fmt;

use bytes::Bytes;
use orbit_core::{RunId, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Raw response bytes, in the order the transport delivered them.
    Chunk { run_id: RunId, bytes: Bytes },
    /// The request for `run_id` is over.
    Finished {
        run_id: RunId,
        result: Result<(), GenerateError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerateError {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerateError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "request aborted")
    }

    /// Maps the failure onto the core's transport outcome.
    pub fn to_transport_error(&self) -> TransportError {
        match self.kind {
            FailureKind::Cancelled => TransportError::Cancelled,
            _ => TransportError::Failed(self.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
