mod support;

use chatwire::prelude::*;
use chatwire::streaming::{Framing, consume_stream, decode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{config_for, fixture, reads_of};

#[tokio::test]
async fn streams_ndjson_reply_into_the_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "model": "llama3:8b",
            "options": {"temperature": 0.5},
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("ollama_chat_stream.ndjson"), "application/x-ndjson"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = ChatOrchestrator::new(config_for(&server.uri())).unwrap();
    let session = ChatSession::default();
    let reply = orchestrator
        .send_message(
            &session,
            SendMessage::new(
                "Say something in French",
                ChatSettings::default().with_model("llama3:8b"),
            ),
            &AbortHandle::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "Un café ☕, s'il vous plaît.");
    let state = session.snapshot();
    assert_eq!(state.chat_messages.len(), 2);
    assert_eq!(state.chat_messages[0].content(), "Say something in French");
    assert_eq!(state.chat_messages[1].role(), MessageRole::Assistant);
    assert_eq!(state.chat_messages[1].content(), reply);
    assert_eq!(state.chat_messages[1].status, Some(MessageStatus::Sent));
    assert!(!state.is_generating);
    assert!(session.notifications().is_empty());
}

#[tokio::test]
async fn request_carries_system_prompt_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "{\"message\":{\"content\":\"ok\"}}\n",
            "application/x-ndjson",
        ))
        .mount(&server)
        .await;

    let orchestrator = ChatOrchestrator::new(config_for(&server.uri())).unwrap();
    let session = support::session_with_exchange("first", "first answer");
    orchestrator
        .send_message(
            &session,
            SendMessage::new("second", ChatSettings::default().with_model("llama3:8b")),
            &AbortHandle::new(),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let messages = body["messages"].as_array().unwrap();
    let roles: Vec<&str> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    assert!(
        messages[0]["content"]
            .as_str()
            .unwrap()
            .ends_with("User Instructions:\nYou are a friendly, helpful AI assistant.")
    );
    assert_eq!(messages[3]["content"], "second");
}

#[tokio::test]
async fn arbitrary_read_boundaries_decode_to_the_same_text() {
    let bytes = fixture("ollama_chat_stream.ndjson");
    for size in [1, 3, 7, 64, bytes.len()] {
        let mut reply = String::new();
        let raw = consume_stream(
            Some(reads_of(&bytes, size)),
            &AbortHandle::new(),
            Framing::Lines,
            |chunk| reply.push_str(&decode(chunk, false)),
        )
        .await
        .unwrap();

        assert_eq!(reply, "Un café ☕, s'il vous plaît.", "read size {size}");
        assert_eq!(raw.as_bytes(), bytes.as_slice());
    }
}
