//! Integration tests for the relay connection lifecycle.
//!
//! These tests drive the relay through whole conversations:
//! 1. A peer connects with a token and is registered
//! 2. Messages are answered on the same connection
//! 3. Follow-ups carry the continuation token back to the service
//! 4. Disconnect removes the connection
//!
//! Uses in-memory implementations to test without external services.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use chat_relay::adapters::ai::MockCompletionClient;
use chat_relay::adapters::auth::StaticTokenValidator;
use chat_relay::adapters::gateway::RecordingGateway;
use chat_relay::adapters::registry::InMemoryConnectionRegistry;
use chat_relay::adapters::websocket::LocalGateway;
use chat_relay::application::{MessageOutcome, Relay, RelayOutcome, RelaySettings};
use chat_relay::domain::foundation::ConnectionId;
use chat_relay::domain::relay::{ContinuationToken, RelayEvent};
use chat_relay::ports::{CompletionError, ConnectionRegistry};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id).unwrap()
}

fn frame(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

struct Harness {
    relay: Relay,
    registry: Arc<InMemoryConnectionRegistry>,
    completions: MockCompletionClient,
    gateway: RecordingGateway,
}

impl Harness {
    fn new(completions: MockCompletionClient) -> Self {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let gateway = RecordingGateway::new();
        let relay = Relay::new(
            registry.clone(),
            Arc::new(completions.clone()),
            Arc::new(gateway.clone()),
            Arc::new(StaticTokenValidator::new(["T1"])),
            RelaySettings::default(),
        );
        Self {
            relay,
            registry,
            completions,
            gateway,
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn full_conversation_round_trip() {
    let h = Harness::new(
        MockCompletionClient::new()
            .with_reply("bg-blue-500", "m2")
            .with_reply("bg-blue-500 px-6 py-3", "m3"),
    );
    let id = conn("conn-A");

    // Connect
    let outcome = h
        .relay
        .handle(RelayEvent::Connect {
            connection_id: id.clone(),
            token: Some("T1".into()),
        })
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Connected);
    assert!(h.registry.contains(&id).await.unwrap());

    // First message starts a thread
    let outcome = h
        .relay
        .handle(RelayEvent::Message {
            connection_id: id.clone(),
            body: r#"{"text":"make a button blue"}"#.into(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Message(MessageOutcome::Replied));

    let frames = h.gateway.pushed_to(&id);
    assert_eq!(frames.len(), 1);
    let reply = frame(&frames[0]);
    assert_eq!(reply["text"], "bg-blue-500");
    assert_eq!(reply["continuationToken"], "m2");

    // Follow-up continues the thread with the token the peer received
    let token = reply["continuationToken"].as_str().unwrap();
    h.relay
        .handle(RelayEvent::Message {
            connection_id: id.clone(),
            body: format!(r#"{{"text":"make it bigger","parentMessageId":"{}"}}"#, token),
        })
        .await
        .unwrap();

    let calls = h.completions.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].continuation, None);
    assert_eq!(calls[1].continuation, Some(ContinuationToken::new("m2")));
    assert_eq!(frame(&h.gateway.pushed_to(&id)[1])["continuationToken"], "m3");

    // Disconnect
    let outcome = h
        .relay
        .handle(RelayEvent::Disconnect {
            connection_id: id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Disconnected);
    assert!(!h.registry.contains(&id).await.unwrap());
}

#[tokio::test]
async fn replies_only_reach_the_sender() {
    let h = Harness::new(MockCompletionClient::new());
    h.relay.connect(&conn("conn-A"), Some("T1")).await.unwrap();
    h.relay.connect(&conn("conn-B"), Some("T1")).await.unwrap();

    h.relay
        .message(&conn("conn-A"), r#"{"text":"hello from A"}"#)
        .await
        .unwrap();

    assert_eq!(h.gateway.pushed_to(&conn("conn-A")).len(), 1);
    assert!(h.gateway.pushed_to(&conn("conn-B")).is_empty());
}

#[tokio::test]
async fn peer_that_vanished_is_cleaned_up() {
    let h = Harness::new(MockCompletionClient::new());
    h.relay.connect(&conn("conn-A"), Some("T1")).await.unwrap();
    h.relay.connect(&conn("conn-B"), Some("T1")).await.unwrap();
    h.gateway.mark_stale(&conn("conn-A"));

    let outcome = h
        .relay
        .message(&conn("conn-A"), r#"{"text":"anyone there?"}"#)
        .await
        .unwrap();

    assert_eq!(outcome, MessageOutcome::PeerGone);
    let live: Vec<_> = h
        .registry
        .connections()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.connection_id)
        .collect();
    assert_eq!(live, vec![conn("conn-B")]);
}

#[tokio::test]
async fn service_hiccup_is_reported_and_conversation_continues() {
    let h = Harness::new(
        MockCompletionClient::new()
            .with_error(CompletionError::unavailable("502 from upstream"))
            .with_reply("bg-red-500", "m9"),
    );
    h.relay.connect(&conn("conn-A"), Some("T1")).await.unwrap();

    let first = h
        .relay
        .message(&conn("conn-A"), r#"{"text":"make it red"}"#)
        .await
        .unwrap();
    let second = h
        .relay
        .message(&conn("conn-A"), r#"{"text":"make it red"}"#)
        .await
        .unwrap();

    assert_eq!(first, MessageOutcome::ReportedError);
    assert_eq!(second, MessageOutcome::Replied);

    let frames = h.gateway.pushed_to(&conn("conn-A"));
    assert!(frame(&frames[0]).get("error").is_some());
    assert!(!frames[0].contains("upstream"));
    assert_eq!(frame(&frames[1])["text"], "bg-red-500");
    assert!(h.registry.contains(&conn("conn-A")).await.unwrap());
}

#[tokio::test]
async fn slow_completion_does_not_block_other_connections() {
    let delay = Duration::from_millis(300);
    let h = Harness::new(MockCompletionClient::new().with_delay(delay));

    let (conn_a, conn_b) = (conn("conn-A"), conn("conn-B"));

    let started = Instant::now();
    let (a, b) = tokio::join!(
        h.relay.message(&conn_a, r#"{"text":"one"}"#),
        h.relay.message(&conn_b, r#"{"text":"two"}"#),
    );

    assert_eq!(a.unwrap(), MessageOutcome::Replied);
    assert_eq!(b.unwrap(), MessageOutcome::Replied);
    assert!(started.elapsed() < delay * 2);
}

#[tokio::test]
async fn local_gateway_delivers_to_attached_socket() {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let gateway = Arc::new(LocalGateway::new());
    let relay = Relay::new(
        registry.clone(),
        Arc::new(MockCompletionClient::new().with_reply("bg-blue-500", "m2")),
        gateway.clone(),
        Arc::new(StaticTokenValidator::new(["T1"])),
        RelaySettings::default(),
    );
    let id = conn("conn-A");

    let mut outbound = gateway.attach(id.clone()).await;
    relay.open(&id).await.unwrap();

    relay
        .message(&id, r#"{"text":"make a button blue"}"#)
        .await
        .unwrap();
    let pushed = outbound.recv().await.unwrap();
    assert_eq!(frame(&pushed)["text"], "bg-blue-500");

    // Socket gone: the next reply finds a stale peer and cleans up
    drop(outbound);
    let outcome = relay.message(&id, r#"{"text":"again"}"#).await.unwrap();
    assert_eq!(outcome, MessageOutcome::PeerGone);
    assert!(!registry.contains(&id).await.unwrap());
}
