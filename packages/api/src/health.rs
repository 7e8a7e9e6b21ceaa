// ABOUTME: Liveness endpoint
// ABOUTME: Answers as long as the HTTP server is up

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "clientwatch"
    }))
}
