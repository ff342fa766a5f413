//! Stream consumer
//!
//! Pulls a response body read by read, in arrival order, and hands each
//! chunk to the caller before reading the next one. Nothing is buffered
//! beyond the current read (plus an incomplete UTF-8 sequence or, in
//! line framing, an unterminated record).

use std::pin::Pin;

use futures::Stream;
use futures_util::StreamExt;

use super::framing::{ChunkFramer, Framing};
use crate::error::ChatError;
use crate::execution::ByteStream;
use crate::utils::{AbortHandle, Utf8StreamDecoder};

/// Text chunks of a response body.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Turn a byte stream into a lazy stream of text chunks.
///
/// The stream ends after yielding `Err(ChatError::Aborted)` when `abort`
/// fires, or after the first transport error.
pub fn text_chunks(mut body: ByteStream, abort: AbortHandle, framing: Framing) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut utf8 = Utf8StreamDecoder::new();
        let mut framer = ChunkFramer::new(framing);

        loop {
            let next = tokio::select! {
                biased;
                _ = abort.aborted() => Err(ChatError::Aborted),
                item = body.next() => Ok(item),
            };

            match next {
                Err(e) | Ok(Some(Err(e))) => {
                    yield Err(e);
                    return;
                }
                Ok(None) => break,
                Ok(Some(Ok(bytes))) => {
                    let text = utf8.decode(&bytes);
                    if let Some(chunk) = framer.push(&text) {
                        yield Ok(chunk);
                    }
                }
            }
        }

        let tail = utf8.finish();
        if let Some(chunk) = framer.push(&tail) {
            yield Ok(chunk);
        }
        if let Some(chunk) = framer.finish() {
            yield Ok(chunk);
        }
    })
}

/// Consume `body`, calling `on_chunk` synchronously for every chunk.
///
/// Returns the concatenation of all chunks on a clean end of stream.
pub async fn consume_stream<F>(
    body: Option<ByteStream>,
    abort: &AbortHandle,
    framing: Framing,
    mut on_chunk: F,
) -> Result<String, ChatError>
where
    F: FnMut(&str),
{
    let body = body.ok_or(ChatError::NoResponseBody)?;
    let mut chunks = text_chunks(body, abort.clone(), framing);
    let mut full_text = String::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        on_chunk(&chunk);
        full_text.push_str(&chunk);
    }

    tracing::debug!(bytes = full_text.len(), "response stream finished");
    Ok(full_text)
}
