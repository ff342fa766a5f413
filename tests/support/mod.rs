//! Shared helpers for integration tests: a scripted transport that delivers
//! body reads on demand, fixture loading and session polling.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chatwire::execution::{ByteStream, HttpTransport, HttpTransportRequest, HttpTransportResponse};
use chatwire::prelude::{
    ChatConfig, ChatError, ChatMessage, ChatOrchestrator, ChatSession, Message, MessageStatus,
};
use reqwest::header::HeaderMap;
use tokio::sync::mpsc;

pub type BodySender = mpsc::UnboundedSender<Result<Bytes, ChatError>>;

/// Transport whose response body is fed by the test through a channel.
pub struct ScriptedTransport {
    status: u16,
    body: Mutex<Option<mpsc::UnboundedReceiver<Result<Bytes, ChatError>>>>,
    pub requests: Mutex<Vec<HttpTransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(status: u16) -> (Arc<Self>, BodySender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            status,
            body: Mutex::new(Some(rx)),
            requests: Mutex::new(Vec::new()),
        });
        (transport, tx)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post_json_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, ChatError> {
        self.requests.lock().unwrap().push(request);
        let mut rx = self
            .body
            .lock()
            .unwrap()
            .take()
            .expect("scripted transport is single use");
        let body: ByteStream = Box::pin(async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        });
        Ok(HttpTransportResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: Some(body),
        })
    }
}

/// One Ollama NDJSON record, newline terminated.
pub fn ndjson(content: &str) -> Bytes {
    let line = serde_json::json!({
        "model": "llama3:8b",
        "message": {"role": "assistant", "content": content},
        "done": false,
    });
    Bytes::from(format!("{line}\n"))
}

pub fn fixture(name: &str) -> Vec<u8> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read(&path).unwrap_or_else(|e| panic!("read fixture {path}: {e}"))
}

/// Split `bytes` into reads of `size` bytes, ignoring char and line boundaries.
pub fn reads_of(bytes: &[u8], size: usize) -> ByteStream {
    let items: Vec<Result<Bytes, ChatError>> = bytes
        .chunks(size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Box::pin(futures::stream::iter(items))
}

pub fn orchestrator_with(transport: Arc<dyn HttpTransport>) -> ChatOrchestrator {
    ChatOrchestrator::builder()
        .config(ChatConfig::default())
        .transport(transport)
        .build()
        .expect("orchestrator")
}

pub fn config_for(server_uri: &str) -> ChatConfig {
    ChatConfig::builder()
        .ollama_base_url(server_uri)
        .hosted_base_url(server_uri)
        .build()
        .expect("config")
}

/// A session holding one finished exchange.
pub fn session_with_exchange(question: &str, answer: &str) -> ChatSession {
    ChatSession::new(vec![
        ChatMessage::new(
            Message::user(question)
                .with_id("user-1")
                .with_chat_id("chat-1")
                .with_sequence_number(0),
        )
        .with_status(MessageStatus::Sent),
        ChatMessage::new(
            Message::assistant(answer)
                .with_id("assistant-1")
                .with_chat_id("chat-1")
                .with_sequence_number(1),
        )
        .with_status(MessageStatus::Sent),
    ])
}

/// Poll `condition` until it holds, for at most one second.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
