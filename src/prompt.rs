//! Prompt assembly
//!
//! Turns a `ChatPayload` into the ordered message list sent to the model:
//! one system message, then as much recent history as fits the context
//! window.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::types::{ChatMessage, ChatPayload, FileItem, MessageRole, Profile};

/// One `{role, content}` entry of the outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    pub role: MessageRole,
    pub content: String,
}

impl FormattedMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Yields the finalized message list for a payload.
#[async_trait]
pub trait PromptBuilder: Send + Sync {
    async fn build_final_messages(
        &self,
        payload: &ChatPayload,
        profile: &Profile,
    ) -> Result<Vec<FormattedMessage>, ChatError>;
}

const RETRIEVAL_PREAMBLE: &str = "You may use the following sources if needed to answer the user's question. If you don't know the answer, say \"I don't know.\"";

/// Rough token count: four characters per token, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Retrieval block appended to the message the items belong to.
pub fn retrieval_text(items: &[FileItem]) -> String {
    let sources = items
        .iter()
        .map(|item| format!("<BEGIN SOURCE>\n{}\n</END SOURCE>", item.content))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{RETRIEVAL_PREAMBLE}\n\n{sources}")
}

/// Default prompt layout.
#[derive(Debug, Clone, Default)]
pub struct DefaultPromptBuilder {
    today: Option<NaiveDate>,
}

impl DefaultPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date written into the system prompt.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn system_prompt(&self, payload: &ChatPayload, profile: &Profile) -> String {
        let settings = &payload.chat_settings;
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut prompt = String::new();

        if let Some(assistant) = &payload.assistant {
            prompt.push_str(&format!(
                "<INJECT ROLE>\nYou are not an AI. You are {}.\n</INJECT ROLE>\n\n",
                assistant.name
            ));
        }
        prompt.push_str(&format!("Today is {}.\n\n", today.format("%Y-%m-%d")));
        if settings.include_profile_context && !profile.profile_context.trim().is_empty() {
            prompt.push_str(&format!("User Info:\n{}\n\n", profile.profile_context));
        }
        if settings.include_workspace_instructions
            && !payload.workspace_instructions.trim().is_empty()
        {
            prompt.push_str(&format!(
                "System Instructions:\n{}\n\n",
                payload.workspace_instructions
            ));
        }
        prompt.push_str(&format!("User Instructions:\n{}", settings.prompt));
        prompt
    }

    fn message_content(entry: &ChatMessage, items: &[FileItem]) -> String {
        if items.is_empty() {
            entry.content().to_string()
        } else {
            format!("{}\n\n{}", entry.content(), retrieval_text(items))
        }
    }
}

#[async_trait]
impl PromptBuilder for DefaultPromptBuilder {
    /// The newest history entry is always sent; older ones are added
    /// newest first while they fit the remaining context budget.
    async fn build_final_messages(
        &self,
        payload: &ChatPayload,
        profile: &Profile,
    ) -> Result<Vec<FormattedMessage>, ChatError> {
        let system = self.system_prompt(payload, profile);

        // The trailing assistant slot is what is being generated.
        let history = match payload.chat_messages.split_last() {
            Some((last, rest)) if last.role() == MessageRole::Assistant => rest,
            _ => payload.chat_messages.as_slice(),
        };
        if history.is_empty() {
            return Err(ChatError::InvalidRequest(
                "no message to send".to_string(),
            ));
        }

        let newest_user = history
            .iter()
            .rposition(|entry| entry.role() == MessageRole::User);
        let mut budget = payload
            .chat_settings
            .context_length
            .saturating_sub(estimate_tokens(&system));
        let mut selected = Vec::new();

        for (idx, entry) in history.iter().enumerate().rev() {
            let items: Vec<FileItem> = if Some(idx) == newest_user {
                payload.message_file_items.clone()
            } else {
                payload
                    .chat_file_items
                    .iter()
                    .filter(|item| entry.file_items.contains(&item.id))
                    .cloned()
                    .collect()
            };
            let content = Self::message_content(entry, &items);
            let tokens = estimate_tokens(&content);
            if !selected.is_empty() && tokens > budget {
                break;
            }
            budget = budget.saturating_sub(tokens);
            selected.push(FormattedMessage::new(entry.role(), content));
        }

        tracing::debug!(
            total = history.len(),
            kept = selected.len(),
            "assembled prompt history"
        );

        let mut messages = Vec::with_capacity(selected.len() + 1);
        messages.push(FormattedMessage::new(MessageRole::System, system));
        messages.extend(selected.into_iter().rev());
        Ok(messages)
    }
}
