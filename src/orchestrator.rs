//! Chat orchestrator
//!
//! Drives one generation end to end: prompt assembly, provider selection,
//! fetch, then the stream loop that republishes the growing reply into the
//! transcript entry being generated.
//!
//! ## Failure policy
//!
//! Every failed generation produces exactly one notification and leaves the
//! session idle. Hard failures also roll back the user entry and its
//! assistant placeholder. A user abort during streaming keeps whatever text
//! already arrived and marks the entry as errored instead.

use std::sync::Arc;

use static_assertions::assert_impl_all;
use tracing::Instrument;

use crate::config::ChatConfig;
use crate::error::{ChatError, notification_text};
use crate::execution::{
    HttpHeaderBuilder, HttpTransport, HttpTransportResponse, ReqwestTransport, ResponseFetcher,
    recover_from_failure,
};
use crate::prompt::{DefaultPromptBuilder, PromptBuilder};
use crate::providers::{ProviderAdapter, adapter_for};
use crate::state::ChatContext;
use crate::streaming::consume_stream;
use crate::transcript::{TranscriptAction, prepare_turn};
use crate::types::{
    Assistant, ChatPayload, ChatSettings, FileItem, MessageStatus, ModelRegistry, Profile,
    ToolInUse,
};
use crate::utils::AbortHandle;

/// Everything needed to send one message (or regenerate the last reply).
#[derive(Debug, Clone, Default)]
pub struct SendMessage {
    pub content: String,
    pub chat_settings: ChatSettings,
    pub profile: Profile,
    pub workspace_instructions: String,
    pub assistant: Option<Assistant>,
    pub message_file_items: Vec<FileItem>,
    pub chat_file_items: Vec<FileItem>,
    pub is_regeneration: bool,
    /// Edit-and-resend: drop every entry from this sequence number first.
    pub edit_sequence_number: Option<i64>,
}

impl SendMessage {
    pub fn new(content: impl Into<String>, chat_settings: ChatSettings) -> Self {
        Self {
            content: content.into(),
            chat_settings,
            ..Default::default()
        }
    }

    /// Regenerate the last assistant reply.
    pub fn regenerate(chat_settings: ChatSettings) -> Self {
        Self {
            chat_settings,
            is_regeneration: true,
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_workspace_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.workspace_instructions = instructions.into();
        self
    }

    pub fn with_assistant(mut self, assistant: Assistant) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_message_file_items(mut self, items: Vec<FileItem>) -> Self {
        self.message_file_items = items;
        self
    }

    pub fn with_chat_file_items(mut self, items: Vec<FileItem>) -> Self {
        self.chat_file_items = items;
        self
    }

    pub fn editing_from(mut self, sequence_number: i64) -> Self {
        self.edit_sequence_number = Some(sequence_number);
        self
    }
}

/// Runs chat generations against self-hosted and hosted backends.
#[derive(Clone)]
pub struct ChatOrchestrator {
    config: ChatConfig,
    registry: ModelRegistry,
    fetcher: ResponseFetcher,
    prompt_builder: Arc<dyn PromptBuilder>,
}

assert_impl_all!(ChatOrchestrator: Send, Sync);

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ChatOrchestrator {
    /// Orchestrator with the `reqwest` transport and the default prompt builder.
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Adapter serving `model`.
    pub fn adapter_for_model(&self, model: &str) -> Arc<dyn ProviderAdapter> {
        adapter_for(self.registry.provider_for(model))
    }

    /// Run one generation for `payload`, whose last entry is the slot the
    /// reply streams into.
    ///
    /// Returns the decoded reply. On success the generating flag is left to
    /// the caller; on failure the session has already been notified and
    /// reset and the error is returned as is.
    pub async fn run(
        &self,
        payload: &ChatPayload,
        profile: &Profile,
        is_regeneration: bool,
        abort: &AbortHandle,
        ctx: &dyn ChatContext,
    ) -> Result<String, ChatError> {
        let Some(target) = payload.target_message() else {
            let err = ChatError::InvalidRequest("transcript is empty".to_string());
            recover_from_failure(ctx, &err.user_message(), false);
            return Err(err);
        };
        let target_id = target.id().to_string();
        let model = payload.chat_settings.model.clone();
        let adapter = self.adapter_for_model(&model);

        let span = tracing::info_span!(
            "chat_generation",
            provider = adapter.id(),
            model = %model,
            message_id = %target_id,
            regeneration = is_regeneration,
        );
        self.run_with_adapter(payload, profile, &target_id, adapter, abort, ctx)
            .instrument(span)
            .await
    }

    async fn run_with_adapter(
        &self,
        payload: &ChatPayload,
        profile: &Profile,
        target_id: &str,
        adapter: Arc<dyn ProviderAdapter>,
        abort: &AbortHandle,
        ctx: &dyn ChatContext,
    ) -> Result<String, ChatError> {
        let body = match self.build_body(payload, profile, adapter.as_ref()).await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "failed to build chat request");
                recover_from_failure(ctx, &notification_text(&err, None), true);
                return Err(err);
            }
        };

        let url = adapter.chat_url(&self.config);
        let response = self
            .fetcher
            .fetch(&url, body, adapter.as_ref(), abort, ctx)
            .await?;

        self.process_response(response, target_id, adapter.as_ref(), abort, ctx)
            .await
    }

    async fn build_body(
        &self,
        payload: &ChatPayload,
        profile: &Profile,
        adapter: &dyn ProviderAdapter,
    ) -> Result<serde_json::Value, ChatError> {
        let messages = self
            .prompt_builder
            .build_final_messages(payload, profile)
            .await?;
        adapter.build_request(&payload.chat_settings, &messages)
    }

    /// Stream the body into the target entry.
    pub async fn process_response(
        &self,
        response: HttpTransportResponse,
        target_id: &str,
        adapter: &dyn ProviderAdapter,
        abort: &AbortHandle,
        ctx: &dyn ChatContext,
    ) -> Result<String, ChatError> {
        let mut reply = String::new();
        let mut delivered = false;

        let result = consume_stream(response.body, abort, adapter.framing(), |chunk| {
            ctx.set_first_token_received(true);
            ctx.set_tool_in_use(ToolInUse::None);
            if !delivered {
                ctx.update_chat_messages(TranscriptAction::SetStatus {
                    message_id: target_id.to_string(),
                    status: MessageStatus::Delivered,
                    error: None,
                });
                delivered = true;
            }
            reply.push_str(&adapter.decode_chunk(chunk));
            ctx.update_chat_messages(TranscriptAction::ReplaceContent {
                message_id: target_id.to_string(),
                content: reply.clone(),
            });
        })
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(chars = reply.len(), "generation finished");
                Ok(reply)
            }
            Err(err) if err.is_aborted() => {
                tracing::info!(kept = reply.len(), "generation aborted by user");
                ctx.update_chat_messages(TranscriptAction::SetStatus {
                    message_id: target_id.to_string(),
                    status: MessageStatus::Error,
                    error: Some(err.user_message()),
                });
                recover_from_failure(ctx, &err.user_message(), false);
                Err(err)
            }
            Err(err) => {
                tracing::error!(error = %err, "response stream failed");
                recover_from_failure(ctx, &notification_text(&err, adapter.error_hint(&err)), true);
                Err(err)
            }
        }
    }

    /// Full send flow: open the turn in the transcript, run the generation
    /// and finalize the reply's status.
    pub async fn send_message(
        &self,
        ctx: &dyn ChatContext,
        request: SendMessage,
        abort: &AbortHandle,
    ) -> Result<String, ChatError> {
        // Validate against the edited view; nothing is dispatched until the
        // turn is known to be valid.
        let current = ctx.chat_messages();
        let (truncate, transcript) = match request.edit_sequence_number {
            Some(sequence_number) => {
                let action = TranscriptAction::TruncateFrom { sequence_number };
                let view = action.apply(&current);
                (Some(action), view)
            }
            None => (None, current),
        };

        if !request.is_regeneration && request.content.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "message content is empty".to_string(),
            ));
        }

        let turn = prepare_turn(
            &transcript,
            &request.content,
            &request.chat_settings,
            &request.profile,
            request.assistant.as_ref(),
            request.is_regeneration,
        )?;

        if let Some(action) = truncate {
            ctx.update_chat_messages(action);
        }
        ctx.set_is_generating(true);
        ctx.set_first_token_received(false);
        ctx.set_tool_in_use(if request.message_file_items.is_empty() {
            ToolInUse::None
        } else {
            ToolInUse::Retrieval
        });
        for action in turn.actions {
            ctx.update_chat_messages(action);
        }

        let payload = ChatPayload {
            chat_settings: request.chat_settings,
            workspace_instructions: request.workspace_instructions,
            chat_messages: turn.chat_messages,
            assistant: request.assistant,
            message_file_items: request.message_file_items,
            chat_file_items: request.chat_file_items,
        };

        let reply = self
            .run(&payload, &request.profile, request.is_regeneration, abort, ctx)
            .await?;

        ctx.update_chat_messages(TranscriptAction::SetStatus {
            message_id: turn.target_id,
            status: MessageStatus::Sent,
            error: None,
        });
        ctx.set_is_generating(false);
        ctx.set_first_token_received(false);
        Ok(reply)
    }
}

/// Builder for [`ChatOrchestrator`].
#[derive(Default)]
pub struct ChatOrchestratorBuilder {
    config: Option<ChatConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    prompt_builder: Option<Arc<dyn PromptBuilder>>,
}

impl ChatOrchestratorBuilder {
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn prompt_builder(mut self, prompt_builder: Arc<dyn PromptBuilder>) -> Self {
        self.prompt_builder = Some(prompt_builder);
        self
    }

    pub fn build(self) -> Result<ChatOrchestrator, ChatError> {
        let config = match self.config {
            Some(config) => config,
            None => ChatConfig::from_env()?,
        };
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&config)?),
        };
        let headers = HttpHeaderBuilder::new()
            .with_json_content_type()
            .with_user_agent(&config.user_agent)?
            .with_custom_headers(&config.headers)?
            .build();

        Ok(ChatOrchestrator {
            registry: config.model_registry(),
            fetcher: ResponseFetcher::new(transport, headers),
            prompt_builder: self
                .prompt_builder
                .unwrap_or_else(|| Arc::new(DefaultPromptBuilder::new())),
            config,
        })
    }
}
