//! Route handlers.

pub mod external;
pub mod members;

use axum::Json;

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
