//! Client-side error types.
//!
//! This module provides [`ClientError`], the error type for every stage of the
//! message pipeline.

use http::StatusCode;
use restwire_core::{HeaderError, ParameterError};

/// Errors raised while building, sending or decoding a message.
///
/// Each variant is a distinct failure category. A caller always gets either a
/// status code or exactly one of these.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// A header failed strict validation while being applied to the wire request.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// A value could not be converted into header or query parameters.
    #[error("parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The endpoint or base URI could not be resolved into a request URI.
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    /// The message is not in a state that allows the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Request content could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Response content matched a decoder but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The server answered with a non-success status code.
    ///
    /// The response content has already been consumed when this is raised.
    #[error("response status code does not indicate success: {status}")]
    Status { status: StatusCode },

    /// Transport-level error (connection failed, body read failed, etc.).
    #[error("transport error: {0}")]
    Transport(String),

    /// Writing response content into a caller stream failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// The cancellation token was signaled.
    #[error("operation canceled")]
    Canceled,
}

impl ClientError {
    /// Create a status error.
    pub fn status_error(status: StatusCode) -> Self {
        ClientError::Status { status }
    }

    /// The status code of a [`Status`](ClientError::Status) error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// The canonical reason phrase of a [`Status`](ClientError::Status) error, if known.
    pub fn reason(&self) -> Option<&'static str> {
        self.status().and_then(|status| status.canonical_reason())
    }

    /// Returns true for non-success status errors.
    pub fn is_status(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }

    /// Returns true if the operation was canceled.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ClientError::Canceled)
    }

    /// Returns true for content decoding failures.
    pub fn is_decode(&self) -> bool {
        matches!(self, ClientError::Decode(_))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}
