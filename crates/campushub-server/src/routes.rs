//! REST routes for the portal.
//
// Endpoints:
//   POST /api/v1/events/{id}/allocate   (auth)
//   GET  /api/v1/health                 (no auth)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use campushub_core::allocation::{run_allocation, AllocationRun};
use campushub_core::CoreError;

use crate::auth::require_api_auth;
use crate::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/events/{id}/allocate", post(allocate_event))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_auth,
        ))
        // Health (no auth)
        .route("/api/v1/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run the allocation engine for an event and report every decision.
pub async fn allocate_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let db = state
        .db
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    match run_allocation(&db, &event_id) {
        Ok(AllocationRun::NothingToAssign) => Ok(Json(json!({
            "message": "No unassigned tasks for this event",
        }))),
        Ok(AllocationRun::Completed(report)) => {
            let assignments: Vec<Value> = report
                .assignments()
                .iter()
                .map(|a| {
                    json!({
                        "task_id": a.task_id,
                        "member_id": a.member_id,
                        "member_name": a.member_name,
                    })
                })
                .collect();
            Ok(Json(json!({
                "message": format!("Assigned {} task(s)", assignments.len()),
                "assignments": assignments,
                "skipped": report.skipped_count(),
            })))
        }
        Err(err) => Err(error_response(err)),
    }
}

/// Map core failures onto the HTTP taxonomy: bad input is the caller's
/// fault, unknown teams are 404s, an in-flight run is a conflict, and
/// anything store-shaped is a 500 with no partial result.
fn error_response(err: CoreError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::RunInProgress { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
