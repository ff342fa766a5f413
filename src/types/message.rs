//! Transcript entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Delivery state of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Error,
    Delivered,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub assistant_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub model: String,
    pub sequence_number: i64,
    #[serde(default)]
    pub image_paths: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message with a fresh id and the current timestamp.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: String::new(),
            user_id: String::new(),
            assistant_id: None,
            role,
            content: content.into(),
            model: String::new(),
            sequence_number: 0,
            image_paths: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = chat_id.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_assistant_id(mut self, assistant_id: Option<String>) -> Self {
        self.assistant_id = assistant_id;
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: i64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn with_image_paths(mut self, image_paths: Vec<String>) -> Self {
        self.image_paths = image_paths;
        self
    }
}

/// One slot of the ordered conversation. Identity is `message.id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: Message,
    /// Ids of the file items retrieved for this message.
    #[serde(rename = "fileItems", default)]
    pub file_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatMessage {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            file_items: Vec::new(),
            status: None,
            error: None,
        }
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_file_items(mut self, file_items: Vec<String>) -> Self {
        self.file_items = file_items;
        self
    }

    pub fn id(&self) -> &str {
        &self.message.id
    }

    pub fn role(&self) -> MessageRole {
        self.message.role
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }
}

impl From<Message> for ChatMessage {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_serializes_file_items_in_camel_case() {
        let entry = ChatMessage::new(Message::user("hi").with_id("m1"))
            .with_file_items(vec!["f1".into()])
            .with_status(MessageStatus::Delivered);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["fileItems"], serde_json::json!(["f1"]));
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["message"]["role"], "user");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn new_messages_get_distinct_ids() {
        let a = Message::assistant("");
        let b = Message::assistant("");
        assert_ne!(a.id, b.id);
    }
}
