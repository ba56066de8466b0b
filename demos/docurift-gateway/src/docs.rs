//! The documentation endpoints described in SPEC_FULL.md §6:
//! `/api/analyzer`, `/api/openapi.json`, and `/api/postman.json`.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// `GET /api/analyzer` — the raw endpoint registry as JSON.
pub async fn analyzer_json(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.analyzer().registry().snapshot().await;
    Json(snapshot)
}

/// `GET /api/openapi.json` — the synthesized OpenAPI 3.0 document.
pub async fn openapi_json(State(state): State<AppState>) -> impl IntoResponse {
    match docurift_core::openapi::assemble_document(state.analyzer().registry()).await {
        Ok(document) => Json(document).into_response(),
        Err(err) => {
            warn!(%err, "failed to assemble openapi document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

/// `GET /api/postman.json` — out of scope per SPEC_FULL.md §1/§2: the
/// Postman-collection serializer is an external collaborator this core does
/// not implement, so the demo reports the boundary explicitly instead of
/// faking a collection.
pub async fn postman_json() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "error": "postman collection serialization is out of scope for docurift-core",
        })),
    )
}
