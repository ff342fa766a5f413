//! User-facing error text.
//!
//! The notification sink receives one line per failed generation. Server
//! messages are passed through verbatim; everything else falls back to the
//! error's display form.

use super::types::ChatError;

impl ChatError {
    /// Text shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpError { message, status } if message.trim().is_empty() => {
                format!("Request failed with status {status}")
            }
            Self::HttpError { message, .. } => message.clone(),
            Self::TransportError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Pick the notification text for `err`, preferring a provider-specific hint.
pub fn notification_text(err: &ChatError, hint: Option<String>) -> String {
    hint.unwrap_or_else(|| err.user_message())
}
