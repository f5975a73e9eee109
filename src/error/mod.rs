//! Error Handling Module
//!
//! Defines the single error type returned by every fallible operation in this
//! crate: chain execution, transport I/O, cache storage, auth refresh, and
//! WebSocket transport.

mod conversions;

use std::time::Duration;

/// Sub-kinds for WebSocket-specific failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WebSocketErrorKind {
    #[error("failed to establish the WebSocket connection")]
    ConnectionFailed,
    #[error("connection closed (code {code}): {reason}")]
    ConnectionClosed { code: u16, reason: String },
    #[error("connection already closed")]
    AlreadyClosed,
    #[error("operation cancelled")]
    Cancelled,
    #[error("failed to send message")]
    SendFailed,
    #[error("failed to receive message")]
    ReceiveFailed,
    #[error("received an invalid message")]
    InvalidMessage,
    #[error("transport error: {0}")]
    TransportError(String),
}

/// Sub-kinds for authentication failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthErrorKind {
    #[error("auth refresh cancelled")]
    Cancelled,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no auth provider configured")]
    ProviderNotConfigured,
    #[error("unsupported platform")]
    UnsupportedPlatform,
    #[error("authentication failed: {underlying:?}")]
    AuthenticationFailed { underlying: Option<String> },
}

impl PartialEq for AuthErrorKind {
    /// Equality on `AuthenticationFailed` ignores the underlying cause, per spec.
    fn eq(&self, other: &Self) -> bool {
        use AuthErrorKind::*;
        match (self, other) {
            (Cancelled, Cancelled) => true,
            (InvalidCredentials, InvalidCredentials) => true,
            (ProviderNotConfigured, ProviderNotConfigured) => true,
            (UnsupportedPlatform, UnsupportedPlatform) => true,
            (AuthenticationFailed { .. }, AuthenticationFailed { .. }) => true,
            _ => false,
        }
    }
}

/// The crate-wide error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The transport returned something that is not HTTP-conformant.
    #[error("invalid response from transport")]
    InvalidResponse,

    /// Decoding was attempted but the response body was empty.
    #[error("no data to decode")]
    NoData,

    /// A non-2xx response surfaced to a decoding helper.
    #[error("http error {status}")]
    HttpError { status: u16, body: Vec<u8> },

    /// Serialization boundary failure while decoding a response.
    #[error("decoding error: {underlying}")]
    DecodingError { underlying: String },

    /// Serialization boundary failure while encoding a request body.
    #[error("encoding error: {underlying}")]
    EncodingError { underlying: String },

    /// The platform I/O layer failed. Retryable.
    #[error("transport error: {underlying}")]
    TransportError { underlying: String },

    /// A timeout elapsed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The call was cancelled.
    #[error("call was cancelled")]
    Cancelled,

    /// A `Call` was executed more than once.
    #[error("call was already executed")]
    AlreadyExecuted,

    /// WebSocket-specific failure.
    #[error("websocket error: {0}")]
    WebSocketError(WebSocketErrorKind),

    /// Auth-specific failure.
    #[error("auth error: {0}")]
    AuthError(AuthErrorKind),

    /// An interceptor violated the chain contract (e.g. `proceed` called twice).
    #[error("interceptor contract violation: {0}")]
    InterceptorContractViolation(String),
}

impl ClientError {
    /// Whether this error is safe to retry at the transport level.
    ///
    /// Mirrors the retry interceptor's classification: only transport-level
    /// I/O failures are retryable; cancellation and HTTP status errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::TransportError { .. })
    }

    pub fn http_error(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::HttpError {
            status,
            body: body.into(),
        }
    }

    pub fn decoding(underlying: impl std::fmt::Display) -> Self {
        Self::DecodingError {
            underlying: underlying.to_string(),
        }
    }

    pub fn encoding(underlying: impl std::fmt::Display) -> Self {
        Self::EncodingError {
            underlying: underlying.to_string(),
        }
    }

    pub fn transport(underlying: impl std::fmt::Display) -> Self {
        Self::TransportError {
            underlying: underlying.to_string(),
        }
    }
}
