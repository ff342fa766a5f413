//! Generation state
//!
//! `ChatContext` is the seam between the pipeline and the host UI: the
//! generation flags, the tool indicator, the transcript reducer sink and the
//! notification sink. `ChatSession` is an in-memory implementation.

use std::sync::{Mutex, PoisonError, RwLock};

use crate::transcript::TranscriptAction;
use crate::types::{ChatMessage, ToolInUse};

/// Host-side state the pipeline reads and updates.
///
/// The orchestrator is the only writer during a generation; hosts read
/// between callbacks.
pub trait ChatContext: Send + Sync {
    fn set_is_generating(&self, generating: bool);
    fn set_first_token_received(&self, received: bool);
    fn set_tool_in_use(&self, tool: ToolInUse);
    /// Apply a pure reducer to the transcript.
    fn update_chat_messages(&self, action: TranscriptAction);
    /// User-visible notification channel.
    fn notify_error(&self, message: &str);
    /// Current transcript snapshot.
    fn chat_messages(&self) -> Vec<ChatMessage>;
}

/// Snapshot of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub chat_messages: Vec<ChatMessage>,
    pub is_generating: bool,
    pub first_token_received: bool,
    pub tool_in_use: ToolInUse,
}

/// In-memory `ChatContext`. Notifications are logged and kept in order.
#[derive(Debug, Default)]
pub struct ChatSession {
    state: RwLock<SessionState>,
    notifications: Mutex<Vec<String>>,
}

impl ChatSession {
    pub fn new(chat_messages: Vec<ChatMessage>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                chat_messages,
                ..Default::default()
            }),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_state<F: FnOnce(&mut SessionState)>(&self, f: F) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

impl ChatContext for ChatSession {
    fn set_is_generating(&self, generating: bool) {
        self.with_state(|s| s.is_generating = generating);
    }

    fn set_first_token_received(&self, received: bool) {
        self.with_state(|s| s.first_token_received = received);
    }

    fn set_tool_in_use(&self, tool: ToolInUse) {
        self.with_state(|s| s.tool_in_use = tool);
    }

    fn update_chat_messages(&self, action: TranscriptAction) {
        self.with_state(|s| s.chat_messages = action.apply(&s.chat_messages));
    }

    fn notify_error(&self, message: &str) {
        tracing::error!(notification = message, "chat error");
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn chat_messages(&self) -> Vec<ChatMessage> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .chat_messages
            .clone()
    }
}
