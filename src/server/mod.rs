//! HTTP server exposing the webhook handlers

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::mirror::{ProfileKind, SyncAction, SyncOutcome};
use crate::webhook::WebhookPayload;
use crate::BlogMirror;

/// Successful webhook response
#[derive(Debug, Serialize, Deserialize)]
pub struct OkBody {
    pub ok: bool,
    pub action: SyncAction,
    pub file: String,
}

impl From<SyncOutcome> for OkBody {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            ok: true,
            action: outcome.action,
            file: outcome.file,
        }
    }
}

/// Failed webhook response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

/// Build the router; shared by `serve` and the tests
pub fn router(app: BlogMirror) -> Router {
    let state = Arc::new(app);

    Router::new()
        .route(
            "/api/sync",
            post(sync_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/backup",
            post(backup_handler).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook server
pub async fn start(app: BlogMirror, ip: &str, port: u16) -> Result<()> {
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let app = router(app);

    println!("Listening on http://{}:{}", ip, port);
    println!("  POST /api/sync    mirror create/update/delete events");
    println!("  POST /api/backup  archive create/update events");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn sync_handler(
    State(app): State<Arc<BlogMirror>>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Response {
    handle_webhook(&app, ProfileKind::Sync, query, &body).await
}

async fn backup_handler(
    State(app): State<Arc<BlogMirror>>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Response {
    handle_webhook(&app, ProfileKind::Backup, query, &body).await
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn handle_webhook(app: &BlogMirror, kind: ProfileKind, query: IdQuery, body: &[u8]) -> Response {
    let payload = match parse_payload(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Rejected {} webhook body: {}", kind, e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };
    tracing::debug!("Webhook body: {}", String::from_utf8_lossy(body));

    match app.handle(kind, &payload, query.id.as_deref()).await {
        Ok(outcome) => (StatusCode::OK, Json(OkBody::from(outcome))).into_response(),
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            let label = app.profile(kind).label();
            tracing::error!("{} error: {}", label, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} failed", label),
            )
        }
    }
}

/// An empty body is an empty payload
fn parse_payload(body: &[u8]) -> Result<WebhookPayload, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(WebhookPayload::default());
    }
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload(b"").unwrap().id.is_none());
        assert!(parse_payload(b"  \n").unwrap().id.is_none());
        assert_eq!(
            parse_payload(br#"{"id": "abc"}"#).unwrap().id.as_deref(),
            Some("abc")
        );
        assert!(parse_payload(b"not json").is_err());
        assert!(parse_payload(b"[1, 2]").is_err());
    }

    #[test]
    fn test_ok_body_shape() {
        let body = OkBody::from(SyncOutcome::new(SyncAction::Deleted, "abc123.md"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"ok": true, "action": "deleted", "file": "abc123.md"})
        );
    }
}
