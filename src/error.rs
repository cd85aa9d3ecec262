use serde::Serialize;
use thiserror::Error;

use crate::models::Coordinate;

/// Failure of a single outbound call or of reading its payload.
///
/// Returned by the gateway and the field helpers; handlers match on it and
/// turn it into an [`ErrorEnvelope`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx response.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// Payload missing a required field or shaped unexpectedly.
    #[error("{detail}")]
    Parse { detail: String },

    /// Connection, DNS or other I/O failure.
    #[error("{detail}")]
    Transport { detail: String },
}

impl FetchError {
    pub fn parse<S: Into<String>>(detail: S) -> Self {
        Self::Parse {
            detail: detail.into(),
        }
    }

    pub fn transport<S: Into<String>>(detail: S) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn missing_field(path: &str) -> Self {
        Self::parse(format!("missing field '{path}'"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout => ErrorKind::Timeout,
            FetchError::HttpStatus { .. } => ErrorKind::HttpStatus,
            FetchError::Parse { .. } => ErrorKind::Parse,
            FetchError::Transport { .. } => ErrorKind::Transport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    HttpStatus,
    Parse,
    Transport,
}

/// The request fields echoed back alongside an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestEcho {
    State(String),
    Location(Coordinate),
}

/// Structured failure returned by a tool in place of its success payload.
///
/// Serializes as `{"error": ..., "kind": ..., "state": ...}` or
/// `{"error": ..., "kind": ..., "location": {...}}`.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{error}")]
pub struct ErrorEnvelope {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(flatten)]
    pub request: RequestEcho,
}

impl ErrorEnvelope {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, request: RequestEcho) -> Self {
        Self {
            error: message.into(),
            kind,
            request,
        }
    }
}
