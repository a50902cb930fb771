//! Error types for the Aktiva client.
//!
//! Failures fall into four classes, reported by [`ClientError::kind`]:
//!
//! - **Construction**: the request could not be built (bad template, body
//!   serialization, header values). Nothing was sent.
//! - **Transport**: the exchange itself failed (connect, cancellation,
//!   deadline). Returned as-is; no retry happens here.
//! - **Protocol**: the server answered with a non-2xx status.
//! - **Decode**: the server answered 2xx but the body did not decode.
//!
//! Protocol and decode failures both carry an [`ErrorResponse`] with the
//! original response attached.

use crate::response::ErrorResponse;

/// Classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be constructed.
    Construction,
    /// The network exchange failed.
    Transport,
    /// The server returned a non-2xx response.
    Protocol,
    /// A 2xx response body could not be decoded.
    Decode,
}

/// Errors raised while resolving an endpoint template.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The template references a parameter that was not supplied.
    #[error("missing path parameter: {0}")]
    MissingParam(String),

    /// The template could not be parsed.
    #[error("malformed endpoint template {template:?}: {reason}")]
    MalformedTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The expanded endpoint is not a valid URI.
    #[error("invalid endpoint URI {uri:?}: {source}")]
    InvalidUri {
        /// The expanded URI string.
        uri: String,
        /// The parse failure.
        source: http::uri::InvalidUri,
    },
}

/// Errors raised by a [`Transport`](crate::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The request's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,

    /// The request's deadline passed before a response arrived.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Failure reported by a custom transport.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Top-level error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The endpoint template could not be resolved.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// The request body could not be serialized.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A configured header value is not a valid HTTP header value.
    #[error("invalid value for header {name}: {source}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// The rejection.
        source: http::header::InvalidHeaderValue,
    },

    /// The HTTP request could not be assembled.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// The client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),

    /// The exchange failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered, but with an error or an undecodable body.
    #[error(transparent)]
    Response(#[from] ErrorResponse),
}

impl ClientError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Endpoint(_)
            | Self::Serialize(_)
            | Self::InvalidHeader { .. }
            | Self::InvalidRequest(_)
            | Self::Config(_) => ErrorKind::Construction,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Response(response) => response.kind(),
        }
    }

    /// The error response, for protocol and decode failures.
    #[must_use]
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// Convenience result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
