//! Hosted adapter
//!
//! Hosted models are reached through the chat backend's per-provider route
//! `<hosted-base>/api/chat/<provider>`, which streams plain text.

use crate::config::ChatConfig;
use crate::types::ModelProvider;
use crate::utils::join_url;

#[derive(Debug, Clone, Copy)]
pub struct HostedAdapter {
    provider: ModelProvider,
}

impl HostedAdapter {
    pub fn new(provider: ModelProvider) -> Self {
        Self { provider }
    }
}

impl super::ProviderAdapter for HostedAdapter {
    fn provider(&self) -> ModelProvider {
        self.provider
    }

    fn is_hosted(&self) -> bool {
        true
    }

    fn chat_url(&self, config: &ChatConfig) -> String {
        join_url(
            &config.hosted_base_url,
            &format!("api/chat/{}", self.provider.id()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::providers::ProviderAdapter;

    #[test]
    fn routes_per_provider() {
        let config = ChatConfig::default();
        assert_eq!(
            HostedAdapter::new(ModelProvider::OpenAi).chat_url(&config),
            "http://localhost:3000/api/chat/openai"
        );
        assert_eq!(
            HostedAdapter::new(ModelProvider::Groq).chat_url(&config),
            "http://localhost:3000/api/chat/groq"
        );
    }

    #[test]
    fn passes_server_messages_through() {
        let adapter = HostedAdapter::new(ModelProvider::Mistral);
        assert_eq!(adapter.error_hint(&ChatError::http(404, "nope")), None);
        assert_eq!(adapter.decode_chunk("{not json"), "{not json");
    }
}
