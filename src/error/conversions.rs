//! Type Conversions for ChatError
//!
//! This module contains From trait implementations for converting
//! common error types into ChatError.

use super::types::ChatError;

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let chat_err: ChatError = json_err.into();
        assert!(matches!(chat_err, ChatError::JsonError(_)));
    }
}
