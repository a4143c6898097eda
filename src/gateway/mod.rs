//! Axum-based HTTP gateway receiving webhook batches.

pub mod webhook;

use anyhow::{ensure, Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::channels::WebhookParser;
use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;

pub const HEALTH_PATH: &str = "/health";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub parser: Arc<dyn WebhookParser>,
    pub dispatcher: Arc<dyn Dispatcher>,
}

/// Build the gateway router. Bodies above `max_body_bytes` get 413.
pub fn router(state: AppState, webhook_path: &str, max_body_bytes: usize) -> Result<Router> {
    ensure!(
        webhook_path.starts_with('/'),
        "webhook path must start with '/': {webhook_path}"
    );
    ensure!(
        webhook_path != HEALTH_PATH,
        "webhook path collides with {HEALTH_PATH}"
    );

    Ok(Router::new()
        .route(webhook_path, post(webhook::handle_webhook))
        .route(HEALTH_PATH, get(webhook::handle_health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state))
}

/// Bind and serve until ctrl-c.
pub async fn run_gateway(config: &GatewayConfig, state: AppState) -> Result<()> {
    let app = router(state, &config.webhook_path, config.max_body_bytes)?;
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind gateway on {addr}"))?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        addr = %local_addr,
        webhook_path = %config.webhook_path,
        "gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server error")?;

    tracing::info!("gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal, draining in-flight batches");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{LineClient, SIGNATURE_HEADER};
    use crate::dispatch::{create_dispatcher, MissingHandlerPolicy};
    use crate::handlers::HandlerRegistry;
    use crate::reply::{MemoryReplySink, OutboundMessage};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SECRET: &str = "gateway-secret";

    const BODY: &str = r#"{
        "destination": "U0000",
        "events": [
            {
                "type": "message",
                "replyToken": "T1",
                "source": {"type": "user", "userId": "U1"},
                "timestamp": 1462629479859,
                "message": {"type": "text", "id": "M1", "text": "ping"}
            },
            {
                "type": "follow",
                "replyToken": "00000000000000000000000000000000",
                "source": {"type": "user", "userId": "Udeadbeef"},
                "timestamp": 1462629479859
            }
        ]
    }"#;

    fn test_app(max_body_bytes: usize) -> (Router, Arc<MemoryReplySink>, LineClient) {
        let registry = HandlerRegistry::builder()
            .on_text(|_, message| vec![OutboundMessage::text(message.text.to_uppercase())])
            .build();
        let sink = Arc::new(MemoryReplySink::new());
        let state = AppState {
            parser: Arc::new(LineClient::new(SECRET, "token").unwrap()),
            dispatcher: create_dispatcher(
                Arc::new(registry),
                sink.clone(),
                MissingHandlerPolicy::Report,
            ),
        };
        let app = router(state, "/webhook", max_body_bytes).unwrap();
        (app, sink, LineClient::new(SECRET, "token").unwrap())
    }

    fn webhook_request(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("content-length", body.len());
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn signed_batch_is_dispatched_before_ok() {
        let (app, sink, signer) = test_app(64 * 1024);
        let signature = signer.sign(BODY.as_bytes());

        let response = app
            .oneshot(webhook_request(BODY, Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_token, "T1");
        assert_eq!(sent[0].messages, vec![OutboundMessage::text("PING")]);
    }

    #[tokio::test]
    async fn bad_signature_is_bad_request() {
        let (app, sink, _) = test_app(64 * 1024);

        let response = app
            .oneshot(webhook_request(BODY, Some("bm90IHRoZSBzaWduYXR1cmU=")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "invalid signature");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_bad_request() {
        let (app, _, _) = test_app(64 * 1024);
        let response = app.oneshot(webhook_request(BODY, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_server_error() {
        let (app, sink, signer) = test_app(64 * 1024);
        let body = r#"{"events": "nope"}"#;
        let signature = signer.sign(body.as_bytes());

        let response = app
            .oneshot(webhook_request(body, Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (app, sink, signer) = test_app(64);
        let signature = signer.sign(BODY.as_bytes());

        let response = app
            .oneshot(webhook_request(BODY, Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _, _) = test_app(64 * 1024);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(HEALTH_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));
    }

    #[test]
    fn router_rejects_bad_webhook_paths() {
        let state = || AppState {
            parser: Arc::new(LineClient::new(SECRET, "token").unwrap()),
            dispatcher: create_dispatcher(
                Arc::new(HandlerRegistry::builder().build()),
                Arc::new(MemoryReplySink::new()),
                MissingHandlerPolicy::Ignore,
            ),
        };
        assert!(router(state(), "webhook", 1024).is_err());
        assert!(router(state(), HEALTH_PATH, 1024).is_err());
    }
}
