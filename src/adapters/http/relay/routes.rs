//! HTTP routes for the relay endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::Relay;

use super::handlers::{health, post_event};

/// Creates the relay router: event ingress and health probe.
pub fn relay_routes(relay: Relay) -> Router {
    Router::new()
        .route("/events", post(post_event))
        .route("/health", get(health))
        .with_state(relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::ai::MockCompletionClient;
    use crate::adapters::auth::StaticTokenValidator;
    use crate::adapters::gateway::RecordingGateway;
    use crate::adapters::registry::InMemoryConnectionRegistry;
    use crate::application::RelaySettings;
    use crate::domain::foundation::ConnectionId;
    use crate::ports::{CompletionError, ConnectionRegistry};

    struct Fixture {
        registry: Arc<InMemoryConnectionRegistry>,
        gateway: RecordingGateway,
        app: Router,
    }

    fn fixture(completions: MockCompletionClient) -> Fixture {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let gateway = RecordingGateway::new();
        let relay = Relay::new(
            registry.clone(),
            Arc::new(completions),
            Arc::new(gateway.clone()),
            Arc::new(StaticTokenValidator::new(["T1"])),
            RelaySettings::default(),
        );
        Fixture {
            registry,
            gateway,
            app: relay_routes(relay),
        }
    }

    fn event(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let Fixture { app, .. } = fixture(MockCompletionClient::new());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn connect_with_valid_token_registers() {
        let fx = fixture(MockCompletionClient::new());
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "connect", "connectionId": "conn-A", "token": "T1"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(fx.registry.contains(&conn("conn-A")).await.unwrap());
    }

    #[tokio::test]
    async fn connect_with_bad_token_is_401() {
        let fx = fixture(MockCompletionClient::new());
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "connect", "connectionId": "conn-A", "token": "bogus"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(fx.registry.is_empty().await);
    }

    #[tokio::test]
    async fn message_replies_through_gateway() {
        let fx = fixture(MockCompletionClient::new().with_reply("bg-blue-500", "m2"));
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "message",
                "connectionId": "conn-A",
                "body": r#"{"text":"make a button blue"}"#
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let frames = fx.gateway.pushed_to(&conn("conn-A"));
        assert_eq!(frames.len(), 1);
        assert!(frames[0].contains("bg-blue-500"));
    }

    #[tokio::test]
    async fn response_reports_connection_state_after_event() {
        let fx = fixture(MockCompletionClient::new());
        fx.gateway.mark_stale(&conn("conn-B"));

        let response = fx
            .app
            .clone()
            .oneshot(event(serde_json::json!({
                "type": "message", "connectionId": "conn-A", "body": "not json"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({"outcome": "rejected_input", "state": "open"}));

        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "message", "connectionId": "conn-B", "body": r#"{"text":"hi"}"#
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({"outcome": "peer_gone", "state": "closed"}));
    }

    #[tokio::test]
    async fn completion_auth_failure_is_502() {
        let fx = fixture(MockCompletionClient::new().with_error(CompletionError::AuthenticationFailed));
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "message", "connectionId": "conn-A", "body": r#"{"text":"hi"}"#
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(fx.gateway.push_count(), 0);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let fx = fixture(MockCompletionClient::new());
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "disconnect", "connectionId": "never-seen"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_event_type_is_rejected() {
        let fx = fixture(MockCompletionClient::new());
        let response = fx
            .app
            .oneshot(event(serde_json::json!({
                "type": "reboot", "connectionId": "conn-A"
            })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
