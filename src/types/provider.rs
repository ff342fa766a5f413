//! Provider identifiers and the model → provider lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

/// Backend family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Azure,
    Anthropic,
    Google,
    Mistral,
    Groq,
    Perplexity,
    OpenRouter,
    Ollama,
    Custom,
}

impl ModelProvider {
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Mistral => "mistral",
            Self::Groq => "groq",
            Self::Perplexity => "perplexity",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::Custom => "custom",
        }
    }

    /// Whether the provider is a locally run model server.
    pub fn is_self_hosted(&self) -> bool {
        matches!(self, Self::Ollama)
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelProvider {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "azure" => Ok(Self::Azure),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            "mistral" => Ok(Self::Mistral),
            "groq" => Ok(Self::Groq),
            "perplexity" => Ok(Self::Perplexity),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            "custom" => Ok(Self::Custom),
            other => Err(ChatError::ConfigurationError(format!(
                "Unknown model provider: {other}"
            ))),
        }
    }
}

/// Indicator shown while the model is working before the first token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolInUse {
    #[default]
    None,
    Retrieval,
    Named(String),
}

impl fmt::Display for ToolInUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Retrieval => f.write_str("retrieval"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Resolves which provider serves a model id.
///
/// Explicit registrations win; otherwise well-known hosted prefixes are
/// matched, and anything else is treated as a local model tag.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    overrides: HashMap<String, ModelProvider>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<String, ModelProvider>) -> Self {
        Self { overrides }
    }

    pub fn register(&mut self, model: impl Into<String>, provider: ModelProvider) {
        self.overrides.insert(model.into(), provider);
    }

    pub fn provider_for(&self, model: &str) -> ModelProvider {
        if let Some(provider) = self.overrides.get(model) {
            return *provider;
        }

        let m = model.to_ascii_lowercase();
        // Local tags carry a colon (`llama3:8b`, `mistral:latest`).
        if m.contains(':') {
            return ModelProvider::Ollama;
        }
        if m.contains('/') {
            return ModelProvider::OpenRouter;
        }
        if m.starts_with("gpt-")
            || m.starts_with("chatgpt-")
            || m.starts_with("o1")
            || m.starts_with("o3")
            || m.starts_with("o4")
        {
            return ModelProvider::OpenAi;
        }
        if m.starts_with("claude-") {
            return ModelProvider::Anthropic;
        }
        if m.starts_with("gemini-") {
            return ModelProvider::Google;
        }
        if m.starts_with("mistral-") || m.starts_with("open-mistral") || m.starts_with("codestral")
        {
            return ModelProvider::Mistral;
        }
        if m.starts_with("sonar") || m.starts_with("pplx-") {
            return ModelProvider::Perplexity;
        }
        ModelProvider::Ollama
    }
}
