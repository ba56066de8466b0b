//! The gateway's router: the documentation endpoints described in
//! SPEC_FULL.md §6, plus a catch-all proxy for everything else.

use axum::Router;
use axum::routing::get;

use crate::docs::{analyzer_json, openapi_json, postman_json};
use crate::proxy::proxy;
use crate::state::AppState;

/// Build the gateway's router.
///
/// The documentation routes are registered first so a backend that happens
/// to expose its own `/api/analyzer` path never shadows them; everything
/// else falls through to the proxy.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/api/analyzer", get(analyzer_json))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/postman.json", get(postman_json))
        .fallback(proxy)
}
