// ABOUTME: HTTP API layer for Client Watch
// ABOUTME: Client listing, ignore list and preference endpoints behind permissive CORS

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod clients_handlers;
pub mod error;
pub mod health;
pub mod preferences_handlers;
pub mod state;

pub use error::{ApiResult, AppError};
pub use state::ApiState;

/// Build the full router. `cors_origin` of `*` allows any origin
pub fn create_router(state: ApiState, cors_origin: &str) -> Router {
    Router::new()
        .route("/clients", get(clients_handlers::clients))
        .route("/preferences", get(preferences_handlers::preferences))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
