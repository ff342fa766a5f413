//! # chatwire
//!
//! Streaming chat-response core for LLM chat clients.
//!
//! A generation goes through four stages:
//! - the prompt builder turns the chat payload into `{role, content}` messages
//! - the provider adapter picks the route and request body for the model
//! - the fetcher issues the request and applies the failure policy
//! - the stream consumer and chunk decoder republish the growing reply into
//!   the transcript through a [`ChatContext`](state::ChatContext)
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chatwire::prelude::*;
//!
//! let orchestrator = ChatOrchestrator::new(ChatConfig::from_env()?)?;
//! let session = ChatSession::default();
//! let abort = AbortHandle::new();
//!
//! let reply = orchestrator
//!     .send_message(
//!         &session,
//!         SendMessage::new("Why is the sky blue?", ChatSettings::default().with_model("llama3:8b")),
//!         &abort,
//!     )
//!     .await?;
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod execution;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod state;
pub mod streaming;
pub mod telemetry;
pub mod transcript;
pub mod types;
pub mod utils;

pub use error::{ChatError, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::config::ChatConfig;
    pub use crate::error::{ChatError, ErrorCategory};
    pub use crate::execution::{HttpTransport, ReqwestTransport};
    pub use crate::orchestrator::{ChatOrchestrator, SendMessage};
    pub use crate::prompt::{DefaultPromptBuilder, FormattedMessage, PromptBuilder};
    pub use crate::providers::{ProviderAdapter, adapter_for};
    pub use crate::state::{ChatContext, ChatSession};
    pub use crate::transcript::TranscriptAction;
    pub use crate::types::{
        Assistant, ChatMessage, ChatPayload, ChatSettings, FileItem, Message, MessageRole,
        MessageStatus, ModelProvider, Profile, ToolInUse,
    };
    pub use crate::utils::AbortHandle;
}
