//! Response fetcher
//!
//! Issues the outbound request and classifies failures. Any failure at this
//! stage is terminal for the generation: the user is notified once,
//! generation state goes idle, and the user entry plus its assistant
//! placeholder are rolled back before the error is returned.

use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::transport::{ByteStream, HttpTransport, HttpTransportRequest, HttpTransportResponse};
use crate::error::{ChatError, notification_text};
use crate::providers::ProviderAdapter;
use crate::state::ChatContext;
use crate::transcript::{ROLLBACK_ENTRY_COUNT, TranscriptAction};
use crate::utils::AbortHandle;

/// Structured error body: `{message}`, or `{error}` as sent by some servers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Sends chat requests through an [`HttpTransport`].
#[derive(Clone)]
pub struct ResponseFetcher {
    transport: Arc<dyn HttpTransport>,
    headers: HeaderMap,
}

impl ResponseFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, headers: HeaderMap) -> Self {
        Self { transport, headers }
    }

    /// Send `body` to `url` and return the response with its body unread.
    ///
    /// On failure the recovery policy has already been applied to `ctx`
    /// when this returns `Err`.
    pub async fn fetch(
        &self,
        url: &str,
        body: serde_json::Value,
        adapter: &dyn ProviderAdapter,
        abort: &AbortHandle,
        ctx: &dyn ChatContext,
    ) -> Result<HttpTransportResponse, ChatError> {
        match self.send(url, body, abort).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::error!(
                    provider = adapter.id(),
                    url,
                    status = ?err.status_code(),
                    error = %err,
                    "chat request failed"
                );
                let message = notification_text(&err, adapter.error_hint(&err));
                recover_from_failure(ctx, &message, true);
                Err(err)
            }
        }
    }

    /// Send without touching any state. Non-2xx statuses become `HttpError`.
    pub async fn send(
        &self,
        url: &str,
        body: serde_json::Value,
        abort: &AbortHandle,
    ) -> Result<HttpTransportResponse, ChatError> {
        let request = HttpTransportRequest {
            url: url.to_string(),
            headers: self.headers.clone(),
            body,
        };
        tracing::debug!(url, "sending chat request");

        let response = tokio::select! {
            biased;
            _ = abort.aborted() => return Err(ChatError::Aborted),
            response = self.transport.post_json_stream(request) => response?,
        };

        if response.is_success() {
            tracing::debug!(status = response.status, "response headers received");
            return Ok(response);
        }

        let status = response.status;
        let text = tokio::select! {
            biased;
            _ = abort.aborted() => return Err(ChatError::Aborted),
            text = read_body_text(response.body) => text,
        };
        Err(ChatError::http(status, error_message(status, &text)))
    }
}

impl std::fmt::Debug for ResponseFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseFetcher")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Partial-failure recovery: notify, go idle (clearing the first-token flag)
/// and optionally roll back the last two transcript entries.
pub fn recover_from_failure(ctx: &dyn ChatContext, message: &str, rollback: bool) {
    ctx.notify_error(message);
    ctx.set_is_generating(false);
    ctx.set_first_token_received(false);
    if rollback {
        ctx.update_chat_messages(TranscriptAction::RemoveLast(ROLLBACK_ENTRY_COUNT));
    }
}

/// Best-effort read of an error body. Read failures yield what was read so far.
async fn read_body_text(body: Option<ByteStream>) -> String {
    let Some(mut body) = body else {
        return String::new();
    };
    let mut bytes = Vec::new();
    while let Some(Ok(chunk)) = body.next().await {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Server message from an error body, falling back to the raw text and then
/// to the status reason.
pub fn error_message(status: u16, body_text: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body_text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty());
    if let Some(message) = parsed {
        return message;
    }
    let raw = body_text.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{HostedAdapter, OllamaAdapter};
    use crate::state::ChatSession;
    use crate::types::{ChatMessage, Message, ModelProvider};
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use tokio_test::{assert_err, assert_ok};
    use tracing_test::traced_test;

    struct FixedTransport {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn post_json_stream(
            &self,
            _request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ChatError> {
            let items: Vec<Result<Bytes, ChatError>> = vec![Ok(Bytes::from_static(self.body.as_bytes()))];
            Ok(HttpTransportResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: Some(Box::pin(stream::iter(items))),
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl HttpTransport for FailingTransport {
        async fn post_json_stream(
            &self,
            _request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ChatError> {
            Err(ChatError::TransportError("connection refused".into()))
        }
    }

    struct HangingTransport;

    #[async_trait]
    impl HttpTransport for HangingTransport {
        async fn post_json_stream(
            &self,
            _request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ChatError> {
            std::future::pending().await
        }
    }

    fn fetcher(transport: impl HttpTransport + 'static) -> ResponseFetcher {
        ResponseFetcher::new(Arc::new(transport), HeaderMap::new())
    }

    #[test]
    fn recovery_clears_generation_flags() {
        let ctx = session();
        ctx.set_first_token_received(true);
        recover_from_failure(&ctx, "stream failed", false);
        let state = ctx.snapshot();
        assert!(!state.is_generating);
        assert!(!state.first_token_received);
        assert_eq!(state.chat_messages.len(), 4);
        assert_eq!(ctx.notifications(), vec!["stream failed"]);
    }

    fn session() -> ChatSession {
        let session = ChatSession::new(vec![
            ChatMessage::new(Message::user("earlier")),
            ChatMessage::new(Message::assistant("reply")),
            ChatMessage::new(Message::user("question")),
            ChatMessage::new(Message::assistant("")),
        ]);
        session.set_is_generating(true);
        session
    }

    #[test]
    fn error_message_fallbacks() {
        assert_eq!(error_message(400, r#"{"message":"bad input"}"#), "bad input");
        assert_eq!(error_message(404, r#"{"error":"model 'x' not found"}"#), "model 'x' not found");
        assert_eq!(error_message(502, "upstream down"), "upstream down");
        assert_eq!(error_message(503, ""), "Service Unavailable");
    }

    #[tokio::test]
    async fn success_is_returned_untouched() {
        let ctx = session();
        let response = assert_ok!(
            fetcher(FixedTransport { status: 200, body: "hi" })
                .fetch("http://x/api/chat", serde_json::json!({}), &OllamaAdapter, &AbortHandle::new(), &ctx)
                .await
        );
        assert_eq!(response.status, 200);
        assert!(response.body.is_some());
        assert_eq!(ctx.snapshot().chat_messages.len(), 4);
        assert!(ctx.notifications().is_empty());
    }

    #[tokio::test]
    async fn not_found_on_self_hosted_uses_the_diagnostic() {
        let ctx = session();
        let err = fetcher(FixedTransport { status: 404, body: r#"{"error":"model 'nope' not found"}"# })
            .fetch("http://x/api/chat", serde_json::json!({}), &OllamaAdapter, &AbortHandle::new(), &ctx)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(
            ctx.notifications(),
            vec![crate::providers::ollama::MODEL_NOT_FOUND_HINT]
        );
        let state = ctx.snapshot();
        assert_eq!(state.chat_messages.len(), 2);
        assert!(!state.is_generating);
    }

    #[tokio::test]
    async fn hosted_errors_surface_the_server_message() {
        let ctx = session();
        fetcher(FixedTransport { status: 500, body: r#"{"message":"Rate limit reached"}"# })
            .fetch(
                "http://x/api/chat/openai",
                serde_json::json!({}),
                &HostedAdapter::new(ModelProvider::OpenAi),
                &AbortHandle::new(),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(ctx.notifications(), vec!["Rate limit reached"]);
        assert_eq!(ctx.snapshot().chat_messages.len(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn network_failures_roll_back_and_propagate() {
        let ctx = session();
        let err = assert_err!(
            fetcher(FailingTransport)
                .fetch("http://x/api/chat", serde_json::json!({}), &OllamaAdapter, &AbortHandle::new(), &ctx)
                .await
        );
        assert!(matches!(err, ChatError::TransportError(_)));
        assert!(logs_contain("chat request failed"));
        assert_eq!(ctx.notifications(), vec![crate::providers::ollama::CONNECTION_HINT]);
        assert_eq!(ctx.snapshot().chat_messages.len(), 2);
    }

    #[tokio::test]
    async fn abort_before_headers_is_a_fetch_failure() {
        let ctx = session();
        let abort = AbortHandle::new();
        abort.abort();
        let err = fetcher(HangingTransport)
            .fetch("http://x/api/chat", serde_json::json!({}), &OllamaAdapter, &abort, &ctx)
            .await
            .unwrap_err();
        assert!(err.is_aborted());
        assert_eq!(ctx.notifications(), vec!["Request aborted"]);
        assert!(!ctx.snapshot().first_token_received);
        assert_eq!(ctx.snapshot().chat_messages.len(), 2);
    }
}
