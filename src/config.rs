//! Client configuration
//!
//! `ChatConfig` carries the endpoints and HTTP settings the orchestrator
//! needs. Values resolve as: explicit builder call > environment variable >
//! built-in default.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ChatError;
use crate::types::{ModelProvider, ModelRegistry};

/// Default self-hosted endpoint (Ollama's standard port).
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
/// Default base URL of the hosted chat routes.
pub const DEFAULT_HOSTED_BASE_URL: &str = "http://localhost:3000";

pub const OLLAMA_URL_ENV: &str = "CHATWIRE_OLLAMA_URL";
/// Checked in order after `OLLAMA_URL_ENV`.
pub const OLLAMA_URL_ENV_FALLBACKS: &[&str] = &["NEXT_PUBLIC_OLLAMA_URL", "OLLAMA_HOST"];
pub const HOSTED_URL_ENV: &str = "CHATWIRE_HOSTED_URL";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint and HTTP settings for one chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub ollama_base_url: String,
    pub hosted_base_url: String,
    pub connect_timeout: Duration,
    /// Overall request deadline. `None` lets long generations stream freely.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub models: HashMap<String, ModelProvider>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            hosted_base_url: DEFAULT_HOSTED_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
            user_agent: default_user_agent(),
            headers: HashMap::new(),
            models: HashMap::new(),
        }
    }
}

impl ChatConfig {
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    /// Build a configuration from environment variables only.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::builder().build()
    }

    pub fn model_registry(&self) -> ModelRegistry {
        ModelRegistry::with_overrides(self.models.clone())
    }
}

fn default_user_agent() -> String {
    format!("chatwire/{}", env!("CARGO_PKG_VERSION"))
}

/// Read the first non-empty variable among `keys`.
fn env_with_fallbacks<E>(env: &E, keys: &[&str]) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| env(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// `OLLAMA_HOST` is often a bare `host:port`.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn validate_url(name: &str, url: &str) -> Result<(), ChatError> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ChatError::ConfigurationError(format!("Invalid {name} '{url}': {e}")))
}

/// Builder for [`ChatConfig`].
#[derive(Debug, Default)]
pub struct ChatConfigBuilder {
    ollama_base_url: Option<String>,
    hosted_base_url: Option<String>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
    headers: HashMap<String, String>,
    models: HashMap<String, ModelProvider>,
}

impl ChatConfigBuilder {
    pub fn ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = Some(url.into());
        self
    }

    pub fn hosted_base_url(mut self, url: impl Into<String>) -> Self {
        self.hosted_base_url = Some(url.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Route `model` to `provider` regardless of its id.
    pub fn model(mut self, model: impl Into<String>, provider: ModelProvider) -> Self {
        self.models.insert(model.into(), provider);
        self
    }

    pub fn build(self) -> Result<ChatConfig, ChatError> {
        self.build_with_env(|key| std::env::var(key).ok())
    }

    /// `build` reading variables through `env` instead of the process
    /// environment.
    pub fn build_with_env<E>(self, env: E) -> Result<ChatConfig, ChatError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let ollama_keys: Vec<&str> = std::iter::once(OLLAMA_URL_ENV)
            .chain(OLLAMA_URL_ENV_FALLBACKS.iter().copied())
            .collect();
        let ollama_base_url = self
            .ollama_base_url
            .or_else(|| env_with_fallbacks(&env, &ollama_keys))
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
        let hosted_base_url = self
            .hosted_base_url
            .or_else(|| env_with_fallbacks(&env, &[HOSTED_URL_ENV]))
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_HOSTED_BASE_URL.to_string());

        validate_url("ollama base URL", &ollama_base_url)?;
        validate_url("hosted base URL", &hosted_base_url)?;

        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        if connect_timeout.is_zero() {
            return Err(ChatError::ConfigurationError(
                "connect timeout must be greater than zero".to_string(),
            ));
        }

        Ok(ChatConfig {
            ollama_base_url,
            hosted_base_url,
            connect_timeout,
            request_timeout: self.request_timeout,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            headers: self.headers,
            models: self.models,
        })
    }
}
