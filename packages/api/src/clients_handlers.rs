// ABOUTME: HTTP handler for the client list and ignore list
// ABOUTME: One endpoint dispatching on the `action` query parameter

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{ApiResult, ApiState, AppError};

#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    pub action: Option<String>,
    pub mac: Option<String>,
}

impl ClientsQuery {
    fn require_mac(&self) -> ApiResult<&str> {
        self.mac
            .as_deref()
            .map(str::trim)
            .filter(|mac| !mac.is_empty())
            .ok_or_else(|| AppError::validation("'mac' is required"))
    }
}

/// `GET /clients[?action=get|ignore|unignore|ignored&mac=M]`
pub async fn clients(
    State(state): State<ApiState>,
    Query(query): Query<ClientsQuery>,
) -> ApiResult<Response> {
    match query.action.as_deref() {
        None | Some("") | Some("list") => Ok(Json(state.monitor.clients()).into_response()),
        Some("get") => {
            let mac = query.require_mac()?;
            state
                .monitor
                .client(mac)
                .map(|client| Json(client).into_response())
                .ok_or_else(|| AppError::not_found(format!("Client {}", mac)))
        }
        Some("ignore") => {
            let mac = query.require_mac()?;
            info!("Ignore requested for {}", mac);
            state.ignore.ignore(mac).await?;
            Ok(Json(json!({ "message": "ok" })).into_response())
        }
        Some("unignore") => {
            let mac = query.require_mac()?;
            info!("Unignore requested for {}", mac);
            state.ignore.unignore(mac).await?;
            Ok(Json(json!({ "message": "ok" })).into_response())
        }
        Some("ignored") => Ok(Json(state.ignore.list()).into_response()),
        Some(other) => Err(AppError::validation(format!("unknown action '{}'", other))),
    }
}
