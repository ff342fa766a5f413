//! Provider adapters
//!
//! One adapter is selected per generation from the model's provider. It owns
//! everything that differs between backends: the route, the request body,
//! how the response body is framed and decoded, and the diagnostic shown
//! when a request fails.

use std::sync::Arc;

use serde_json::json;

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::prompt::FormattedMessage;
use crate::streaming::{DecodeMode, Framing, decode_chunk};
use crate::types::{ChatSettings, ModelProvider};

pub mod hosted;
pub mod ollama;

pub use hosted::HostedAdapter;
pub use ollama::OllamaAdapter;

/// Backend-specific behavior of the chat pipeline.
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ModelProvider;

    /// Provider identifier (e.g., "ollama", "openai")
    fn id(&self) -> &'static str {
        self.provider().id()
    }

    fn is_hosted(&self) -> bool;

    /// Chat route for this backend.
    fn chat_url(&self, config: &ChatConfig) -> String;

    /// JSON request body.
    fn build_request(
        &self,
        settings: &ChatSettings,
        messages: &[FormattedMessage],
    ) -> Result<serde_json::Value, ChatError> {
        chat_request_body(settings, messages)
    }

    fn decode_mode(&self) -> DecodeMode {
        DecodeMode::for_hosted(self.is_hosted())
    }

    fn framing(&self) -> Framing {
        match self.decode_mode() {
            DecodeMode::PlainText => Framing::Passthrough,
            DecodeMode::JsonLines => Framing::Lines,
        }
    }

    fn decode_chunk(&self, chunk: &str) -> String {
        decode_chunk(chunk, self.decode_mode())
    }

    /// Notification text replacing the generic one for `err`, if any.
    fn error_hint(&self, _err: &ChatError) -> Option<String> {
        None
    }
}

/// `{model, messages: [{role, content}], options: {temperature}}`
pub fn chat_request_body(
    settings: &ChatSettings,
    messages: &[FormattedMessage],
) -> Result<serde_json::Value, ChatError> {
    if settings.model.trim().is_empty() {
        return Err(ChatError::InvalidRequest(
            "Model must be specified".to_string(),
        ));
    }
    Ok(json!({
        "model": settings.model,
        "messages": serde_json::to_value(messages)?,
        "options": {
            "temperature": settings.temperature,
        },
    }))
}

/// Adapter serving `provider`.
pub fn adapter_for(provider: ModelProvider) -> Arc<dyn ProviderAdapter> {
    if provider.is_self_hosted() {
        Arc::new(OllamaAdapter)
    } else {
        Arc::new(HostedAdapter::new(provider))
    }
}
