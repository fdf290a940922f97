//! End-to-end tests of the native WebSocket transport using a real client.
//!
//! A server is bound to an ephemeral port and driven through:
//! 1. Upgrade with a token registers the connection
//! 2. Text and UTF-8 binary frames are answered over the same socket
//! 3. Undecodable binary frames get an error frame and the socket stays open
//! 4. Close deregisters the connection

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use chat_relay::adapters::ai::MockCompletionClient;
use chat_relay::adapters::auth::StaticTokenValidator;
use chat_relay::adapters::registry::InMemoryConnectionRegistry;
use chat_relay::adapters::websocket::{websocket_router, LocalGateway, WebSocketState};
use chat_relay::application::{Relay, RelaySettings};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Boot a relay server and return its address and registry.
async fn boot_server() -> (String, Arc<InMemoryConnectionRegistry>) {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let gateway = Arc::new(LocalGateway::new());
    let relay = Relay::new(
        registry.clone(),
        Arc::new(MockCompletionClient::new()),
        gateway.clone(),
        Arc::new(StaticTokenValidator::new(["T1"])),
        RelaySettings::default(),
    );
    let app = websocket_router().with_state(WebSocketState::new(relay, gateway));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr.to_string(), registry)
}

/// Wait until the registry holds `expected` connections.
async fn wait_for_len(registry: &InMemoryConnectionRegistry, expected: usize) {
    timeout(TIMEOUT, async {
        while registry.len().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {} connections", expected));
}

/// Read the next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("receive error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn socket_lifecycle_registers_relays_and_deregisters() {
    let (addr, registry) = boot_server().await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws?token=T1", addr))
        .await
        .unwrap();
    wait_for_len(&registry, 1).await;

    // Text frame is answered on the same socket
    ws.send(Message::Text(r#"{"text":"hi"}"#.into())).await.unwrap();
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["text"], "Mock reply to: hi");
    assert_eq!(reply["continuationToken"], "mock-1");

    // Close removes the connection
    ws.close(None).await.unwrap();
    wait_for_len(&registry, 0).await;
}

#[tokio::test]
async fn binary_frames_are_relayed_or_rejected() {
    let (addr, registry) = boot_server().await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws?token=T1", addr))
        .await
        .unwrap();
    wait_for_len(&registry, 1).await;

    ws.send(Message::Binary(br#"{"text":"from bytes"}"#.to_vec()))
        .await
        .unwrap();
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["text"], "Mock reply to: from bytes");

    ws.send(Message::Binary(vec![0xff, 0xfe, 0x00])).await.unwrap();
    let reply = next_json(&mut ws).await;
    assert_eq!(
        reply["error"],
        "Malformed message: binary frame is not valid UTF-8"
    );

    // Still usable after the rejected frame
    ws.send(Message::Text(r#"{"text":"again"}"#.into())).await.unwrap();
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["text"], "Mock reply to: again");
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn upgrade_without_valid_token_is_refused() {
    let (addr, registry) = boot_server().await;

    assert!(connect_async(format!("ws://{}/ws", addr)).await.is_err());
    assert!(connect_async(format!("ws://{}/ws?token=nope", addr))
        .await
        .is_err());
    assert!(registry.is_empty().await);
}
