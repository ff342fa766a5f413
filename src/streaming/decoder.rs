//! Chunk decoding
//!
//! Hosted backends stream plain text, so a chunk is its own fragment.
//! Self-hosted backends stream newline-delimited JSON records shaped
//! `{"message": {"content": "..."}, ...}`; the fragment is the concatenation
//! of every record's `message.content`, in order.
//!
//! A malformed record never aborts the stream. The fragment for that whole
//! chunk is dropped (no partial credit for the valid lines beside it) and a
//! warning is logged; text accumulated from earlier chunks is untouched.

use serde::Deserialize;

use crate::error::ChatError;

/// Wire format of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    PlainText,
    JsonLines,
}

impl DecodeMode {
    pub fn for_hosted(is_hosted: bool) -> Self {
        if is_hosted {
            Self::PlainText
        } else {
            Self::JsonLines
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonLineRecord {
    message: JsonLineMessage,
}

#[derive(Debug, Deserialize)]
struct JsonLineMessage {
    content: String,
}

/// Decode one chunk into the fragment appended to the reply.
pub fn decode_chunk(chunk: &str, mode: DecodeMode) -> String {
    match mode {
        DecodeMode::PlainText => chunk.to_string(),
        DecodeMode::JsonLines => match try_decode_json_lines(chunk) {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!(error = %e, chunk_len = chunk.len(), "Error parsing JSON chunk, dropping fragment");
                String::new()
            }
        },
    }
}

/// `decode_chunk` keyed by the hosted flag.
pub fn decode(chunk: &str, is_hosted: bool) -> String {
    decode_chunk(chunk, DecodeMode::for_hosted(is_hosted))
}

/// Strict JSON-lines decoding; the first bad record fails the chunk.
pub fn try_decode_json_lines(chunk: &str) -> Result<String, ChatError> {
    let mut fragment = String::new();
    for line in chunk.trim_end().split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: JsonLineRecord = serde_json::from_str(line)
            .map_err(|e| ChatError::DecodeError(format!("invalid record: {e}")))?;
        fragment.push_str(&record.message.content);
    }
    Ok(fragment)
}
