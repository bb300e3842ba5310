//! Webhook HTTP server.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use relay_core::InboundEvent;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::convert::{convert_update, parse_update};

/// Shared state of the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    events: mpsc::Sender<InboundEvent>,
}

/// Response of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Creates the webhook router.
///
/// Every accepted update is pushed onto `events`; a single routing task
/// drains the other end.
pub fn create_router(webhook_path: &str, events: mpsc::Sender<InboundEvent>) -> Router {
    Router::new()
        .route("/", get(health))
        .route(webhook_path, post(receive_update))
        .layer(TraceLayer::new_for_http())
        .with_state(WebhookState { events })
}

/// Serves the webhook router until `shutdown` resolves.
pub async fn serve(
    address: &str,
    router: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Webhook server listening on {}", address);
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await
}

/// GET / - Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Telegram relay webhook is running".to_string(),
    })
}

/// POST <webhook path> - Receives one Telegram update.
async fn receive_update(State(state): State<WebhookState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Rejecting malformed update");
            return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false })));
        }
    };

    let Some(event) = convert_update(update) else {
        return (StatusCode::OK, Json(json!({ "ok": true })));
    };

    debug!(event_id = %event.id, "Queueing update");
    if state.events.send(event).await.is_err() {
        error!("Routing queue is closed");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })));
    }
    (StatusCode::OK, Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use relay_core::{Content, Payload};

    fn server(path: &str) -> (TestServer, mpsc::Receiver<InboundEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let server = TestServer::new(create_router(path, tx)).unwrap();
        (server, rx)
    }

    fn text_update(id: u32, text: &str) -> Value {
        json!({
            "update_id": id,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "chat": { "id": 77, "type": "private", "first_name": "Ann" },
                "from": { "id": 77, "is_bot": false, "first_name": "Ann" },
                "text": text
            }
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _rx) = server("/webhook");

        let response = server.get("/").await;
        response.assert_status_ok();

        let body: HealthResponse = response.json();
        assert_eq!(body.status, "ok");
        assert!(!body.message.is_empty());
    }

    #[tokio::test]
    async fn test_update_is_queued() {
        let (server, mut rx) = server("/webhook");

        let response = server.post("/webhook").json(&text_update(5, "hi")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["ok"], true);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.id.0, 5);
        let Payload::Message(message) = event.payload else {
            panic!("expected a message");
        };
        assert_eq!(message.content, Content::Text("hi".into()));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let (server, mut rx) = server("/webhook");

        let response = server.post("/webhook").text("{ not json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ignored_update_is_acknowledged() {
        let (server, mut rx) = server("/webhook");

        let response = server
            .post("/webhook")
            .json(&json!({
                "update_id": 6,
                "edited_message": {
                    "message_id": 1,
                    "date": 1700000000,
                    "edit_date": 1700000001,
                    "chat": { "id": 77, "type": "private", "first_name": "Ann" },
                    "from": { "id": 77, "is_bot": false, "first_name": "Ann" },
                    "text": "edited"
                }
            }))
            .await;
        response.assert_status_ok();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_custom_path() {
        let (server, mut rx) = server("/tg/secret-hook");

        server
            .post("/tg/secret-hook")
            .json(&text_update(9, "hello"))
            .await
            .assert_status_ok();
        assert!(rx.try_recv().is_ok());

        server
            .post("/webhook")
            .json(&text_update(10, "hello"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (server, rx) = server("/webhook");
        drop(rx);

        let response = server.post("/webhook").json(&text_update(11, "hi")).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}
