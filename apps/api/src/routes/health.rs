use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
///
/// 200 while the store answers a ping, 503 with `"status": "degraded"`
/// otherwise. Either way the body carries the service name and version.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, overall, store) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            warn!("Health check could not reach the store: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": overall,
            "store": store,
            "version": env!("CARGO_PKG_VERSION"),
            "service": env!("CARGO_PKG_NAME")
        })),
    )
}
