//! Ollama (self-hosted) adapter
//!
//! `POST <base>/api/chat`, response streamed as newline-delimited JSON.

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::types::ModelProvider;
use crate::utils::join_url;

pub const MODEL_NOT_FOUND_HINT: &str =
    "Model not found. Make sure you have it downloaded via Ollama.";
pub const CONNECTION_HINT: &str = "An error occurred while connecting to the Ollama server. Please make sure the server is running and accessible.";

#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaAdapter;

impl super::ProviderAdapter for OllamaAdapter {
    fn provider(&self) -> ModelProvider {
        ModelProvider::Ollama
    }

    fn is_hosted(&self) -> bool {
        false
    }

    fn chat_url(&self, config: &ChatConfig) -> String {
        join_url(&config.ollama_base_url, "api/chat")
    }

    fn error_hint(&self, err: &ChatError) -> Option<String> {
        match err {
            ChatError::HttpError { status: 404, .. } => Some(MODEL_NOT_FOUND_HINT.to_string()),
            ChatError::TransportError(_) => Some(CONNECTION_HINT.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderAdapter;
    use crate::streaming::Framing;

    #[test]
    fn routes_to_api_chat() {
        let config = ChatConfig::builder()
            .ollama_base_url("http://gpu-box:11434/")
            .hosted_base_url("http://localhost:3000")
            .build()
            .unwrap();
        assert_eq!(
            OllamaAdapter.chat_url(&config),
            "http://gpu-box:11434/api/chat"
        );
        assert_eq!(OllamaAdapter.framing(), Framing::Lines);
    }

    #[test]
    fn hints_cover_missing_models_and_dead_servers() {
        assert_eq!(
            OllamaAdapter.error_hint(&ChatError::http(404, "model 'x' not found")),
            Some(MODEL_NOT_FOUND_HINT.to_string())
        );
        assert_eq!(
            OllamaAdapter.error_hint(&ChatError::TransportError("refused".into())),
            Some(CONNECTION_HINT.to_string())
        );
        assert_eq!(OllamaAdapter.error_hint(&ChatError::http(500, "oom")), None);
        assert_eq!(OllamaAdapter.error_hint(&ChatError::Aborted), None);
    }

    #[test]
    fn decodes_json_lines() {
        let chunk = "{\"message\":{\"content\":\"A\"}}\n{\"message\":{\"content\":\"B\"}}\n";
        assert_eq!(OllamaAdapter.decode_chunk(chunk), "AB");
    }
}
