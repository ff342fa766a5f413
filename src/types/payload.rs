//! Chat payload types
//!
//! A `ChatPayload` is the immutable input to a single generation request.

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// Per-chat generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    /// Token budget for the prompt plus history.
    pub context_length: usize,
    pub include_profile_context: bool,
    pub include_workspace_instructions: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            prompt: "You are a friendly, helpful AI assistant.".to_string(),
            temperature: 0.5,
            context_length: 4096,
            include_profile_context: true,
            include_workspace_instructions: true,
        }
    }
}

impl ChatSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_context_length(mut self, context_length: usize) -> Self {
        self.context_length = context_length;
        self
    }
}

/// Assistant persona attached to a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub name: String,
}

/// User profile fields the prompt builder reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    /// Free-form "about me" text injected into the system prompt.
    pub profile_context: String,
}

/// A retrieved chunk of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub id: String,
    pub file_id: String,
    pub content: String,
    #[serde(default)]
    pub tokens: usize,
}

/// Input to one generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub chat_settings: ChatSettings,
    pub workspace_instructions: String,
    /// Ordered transcript; the last entry is the slot being generated.
    pub chat_messages: Vec<ChatMessage>,
    pub assistant: Option<Assistant>,
    /// Items retrieved for the message being sent.
    pub message_file_items: Vec<FileItem>,
    /// Pool of items referenced by earlier entries' `file_items`.
    pub chat_file_items: Vec<FileItem>,
}

impl ChatPayload {
    pub fn new(chat_settings: ChatSettings, chat_messages: Vec<ChatMessage>) -> Self {
        Self {
            chat_settings,
            chat_messages,
            ..Default::default()
        }
    }

    /// The entry whose content the stream overwrites.
    pub fn target_message(&self) -> Option<&ChatMessage> {
        self.chat_messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn target_is_last_entry() {
        let payload = ChatPayload::new(
            ChatSettings::default(),
            vec![
                ChatMessage::new(Message::user("q").with_id("u")),
                ChatMessage::new(Message::assistant("").with_id("a")),
            ],
        );
        assert_eq!(payload.target_message().map(|m| m.id()), Some("a"));
        assert!(ChatPayload::default().target_message().is_none());
    }

    #[test]
    fn settings_use_camel_case_keys() {
        let value = serde_json::to_value(ChatSettings::default()).unwrap();
        assert_eq!(value["contextLength"], 4096);
        assert_eq!(value["includeProfileContext"], true);
    }
}
