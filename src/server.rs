//! Local HTTP surface for the note handlers.
//!
//! Each route builds the same `ProxyRequest` a gateway would deliver and hands
//! it to the handler unchanged, so behavior matches the deployed functions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{ProxyRequest, ProxyResponse};
use crate::auth::{bearer_token, validate_jwt};
use crate::handlers::{self, HandlerContext};

#[derive(Clone)]
pub struct ServerState {
    ctx: Arc<HandlerContext>,
    jwt_secret: Arc<str>,
}

pub fn router(ctx: Arc<HandlerContext>, jwt_secret: impl Into<String>) -> Router {
    let state = ServerState {
        ctx,
        jwt_secret: Arc::from(jwt_secret.into()),
    };

    Router::new()
        .route("/health", get(health))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", delete(delete_note))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl ServerState {
    /// Event skeleton with the verified caller, if any, as the authorizer claim
    fn event(&self, method: &str, path: &str, headers: &HeaderMap) -> ProxyRequest {
        let event = ProxyRequest::new().with_method(method, path);
        match self.authenticated_subject(headers) {
            Some(sub) => event.with_subject(sub),
            None => event,
        }
    }

    fn authenticated_subject(&self, headers: &HeaderMap) -> Option<String> {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = bearer_token(header)?;

        match validate_jwt(token, &self.jwt_secret) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::warn!("Rejected bearer token: {}", e);
                None
            }
        }
    }
}

async fn create_note(State(state): State<ServerState>, headers: HeaderMap, body: String) -> ProxyResponse {
    let event = state.event("POST", "/notes", &headers).with_body(body);
    handlers::create_note(&state.ctx, &event).await
}

async fn list_notes(State(state): State<ServerState>, headers: HeaderMap) -> ProxyResponse {
    let event = state.event("GET", "/notes", &headers);
    handlers::list_notes(&state.ctx, &event).await
}

async fn delete_note(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResponse {
    let path = format!("/notes/{}", id);
    let event = state.event("DELETE", &path, &headers).with_path_parameter("id", id);
    handlers::delete_note(&state.ctx, &event).await
}

/// Liveness; reports pool state without forcing a build
async fn health(State(state): State<ServerState>) -> Json<Value> {
    let database = if state.ctx.store().is_ready() { "ready" } else { "not_initialized" };

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": database,
    }))
}
