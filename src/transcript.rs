//! Transcript reducers
//!
//! The transcript is owned by the host. The pipeline never mutates it
//! directly; it emits `TranscriptAction`s whose `apply` is a pure function
//! from one snapshot to the next.

use crate::error::ChatError;
use crate::types::{
    Assistant, ChatMessage, ChatSettings, Message, MessageRole, MessageStatus, Profile,
};

/// Entries removed on a hard failure: the assistant placeholder and the
/// user entry before it.
pub const ROLLBACK_ENTRY_COUNT: usize = 2;

/// A pure update over the ordered transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptAction {
    /// Overwrite `content` of the entry with `message_id`.
    ReplaceContent { message_id: String, content: String },
    SetStatus {
        message_id: String,
        status: MessageStatus,
        error: Option<String>,
    },
    Append(Vec<ChatMessage>),
    /// Drop the last `n` entries.
    RemoveLast(usize),
    /// Drop every entry at or after `sequence_number` (edit and resend).
    TruncateFrom { sequence_number: i64 },
}

impl TranscriptAction {
    pub fn apply(&self, transcript: &[ChatMessage]) -> Vec<ChatMessage> {
        match self {
            Self::ReplaceContent {
                message_id,
                content,
            } => transcript
                .iter()
                .map(|entry| {
                    if entry.message.id == *message_id {
                        let mut updated = entry.clone();
                        updated.message.content = content.clone();
                        updated
                    } else {
                        entry.clone()
                    }
                })
                .collect(),
            Self::SetStatus {
                message_id,
                status,
                error,
            } => transcript
                .iter()
                .map(|entry| {
                    if entry.message.id == *message_id {
                        let mut updated = entry.clone();
                        updated.status = Some(*status);
                        updated.error = error.clone();
                        updated
                    } else {
                        entry.clone()
                    }
                })
                .collect(),
            Self::Append(entries) => transcript.iter().chain(entries).cloned().collect(),
            Self::RemoveLast(n) => {
                let keep = transcript.len().saturating_sub(*n);
                transcript[..keep].to_vec()
            }
            Self::TruncateFrom { sequence_number } => transcript
                .iter()
                .filter(|entry| entry.message.sequence_number < *sequence_number)
                .cloned()
                .collect(),
        }
    }
}

/// Actions that open a generation turn, plus the transcript they produce.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub actions: Vec<TranscriptAction>,
    pub chat_messages: Vec<ChatMessage>,
    /// Id of the assistant entry the stream will write into.
    pub target_id: String,
}

/// Open a turn.
///
/// A fresh send appends a user entry and an empty assistant placeholder.
/// A regeneration clears and reuses the last entry, which must be an
/// assistant reply; no entry is added.
pub fn prepare_turn(
    transcript: &[ChatMessage],
    content: &str,
    settings: &ChatSettings,
    profile: &Profile,
    assistant: Option<&Assistant>,
    is_regeneration: bool,
) -> Result<PreparedTurn, ChatError> {
    if is_regeneration {
        let last = transcript
            .last()
            .filter(|entry| entry.message.role == MessageRole::Assistant)
            .ok_or_else(|| {
                ChatError::InvalidRequest(
                    "regeneration requires an assistant reply as the last entry".to_string(),
                )
            })?;
        let target_id = last.message.id.clone();
        let actions = vec![
            TranscriptAction::ReplaceContent {
                message_id: target_id.clone(),
                content: String::new(),
            },
            TranscriptAction::SetStatus {
                message_id: target_id.clone(),
                status: MessageStatus::Sending,
                error: None,
            },
        ];
        let chat_messages = apply_all(transcript, &actions);
        return Ok(PreparedTurn {
            actions,
            chat_messages,
            target_id,
        });
    }

    let chat_id = transcript
        .last()
        .map(|entry| entry.message.chat_id.clone())
        .unwrap_or_default();
    let next_sequence = transcript
        .iter()
        .map(|entry| entry.message.sequence_number + 1)
        .max()
        .unwrap_or(0);
    let assistant_id = assistant.map(|a| a.id.clone());

    let user = Message::user(content)
        .with_chat_id(chat_id.clone())
        .with_user_id(profile.user_id.clone())
        .with_model(settings.model.clone())
        .with_assistant_id(assistant_id.clone())
        .with_sequence_number(next_sequence);
    let reply = Message::assistant("")
        .with_chat_id(chat_id)
        .with_user_id(profile.user_id.clone())
        .with_model(settings.model.clone())
        .with_assistant_id(assistant_id)
        .with_sequence_number(next_sequence + 1);
    let target_id = reply.id.clone();

    let actions = vec![TranscriptAction::Append(vec![
        ChatMessage::new(user).with_status(MessageStatus::Sent),
        ChatMessage::new(reply).with_status(MessageStatus::Sending),
    ])];
    let chat_messages = apply_all(transcript, &actions);
    Ok(PreparedTurn {
        actions,
        chat_messages,
        target_id,
    })
}

fn apply_all(transcript: &[ChatMessage], actions: &[TranscriptAction]) -> Vec<ChatMessage> {
    actions
        .iter()
        .fold(transcript.to_vec(), |acc, action| action.apply(&acc))
}
