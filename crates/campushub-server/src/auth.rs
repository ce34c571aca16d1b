//! Bearer token auth middleware.
//!
//! The token lives in `~/.config/campushub/config.toml` under
//! `[server] api_token = "..."` and arrives as
//! `Authorization: Bearer <token>`. An empty configured token disables the
//! check; organizer-role certification happens upstream in the portal's
//! auth layer either way.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

pub async fn require_api_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if state.api_token.is_empty() {
        return next.run(req).await;
    }

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(state.api_token.as_str()) {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid or missing API token" })),
        )
            .into_response()
    }
}
