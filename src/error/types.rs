//! Core error types

use thiserror::Error;

/// Errors produced while sending a chat request and consuming its streamed reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The response carried no readable body.
    #[error("Response body is null")]
    NoResponseBody,

    /// The abort handle fired before the generation finished.
    #[error("Request aborted")]
    Aborted,

    /// DNS, connect, TLS or mid-stream read failure.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Non-success HTTP status with the server-provided message.
    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    /// A chunk could not be decoded. Recovered locally by the decoder.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Request serialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Empty input or a transcript without the shape the operation needs.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification used for logging and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Cancelled,
    Network,
    Client,
    Server,
    Parsing,
    Configuration,
}

impl ChatError {
    /// Build an `HttpError` from a status code and message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, when the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Aborted => ErrorCategory::Cancelled,
            Self::NoResponseBody | Self::TransportError(_) => ErrorCategory::Network,
            Self::HttpError { status, .. } if *status >= 500 => ErrorCategory::Server,
            Self::HttpError { .. } => ErrorCategory::Client,
            Self::DecodeError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) | Self::InvalidRequest(_) => {
                ErrorCategory::Configuration
            }
        }
    }
}

/// Result type for chatwire operations
pub type Result<T> = std::result::Result<T, ChatError>;
