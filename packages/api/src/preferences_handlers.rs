// ABOUTME: HTTP handler for reading and changing preferences
// ABOUTME: Listing masks secure values, single reads return plaintext

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
pub struct PreferencesQuery {
    pub action: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    /// Kept as text so bad flags get the JSON error body
    pub secure: Option<String>,
}

impl PreferencesQuery {
    fn require_name(&self) -> ApiResult<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::validation("'name' is required"))
    }

    fn secure_flag(&self) -> ApiResult<bool> {
        match self.secure.as_deref() {
            None | Some("") => Ok(false),
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                AppError::validation(format!("'secure' must be a boolean, got '{}'", raw))
            }),
        }
    }
}

/// Accepts the usual spellings: 1, t, T, TRUE, true, True and their false forms
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// `GET /preferences[?action=get&name=N | ?action=set&name=N&value=V[&secure=true]]`
pub async fn preferences(
    State(state): State<ApiState>,
    Query(query): Query<PreferencesQuery>,
) -> ApiResult<Response> {
    match query.action.as_deref() {
        None | Some("") | Some("list") => Ok(Json(state.preferences.list_masked()).into_response()),
        Some("get") => {
            let name = query.require_name()?;
            let value = state
                .preferences
                .get(name)?
                .ok_or_else(|| AppError::not_found(format!("Preference '{}'", name)))?;
            Ok(Json(json!({ "name": name, "value": value })).into_response())
        }
        Some("set") => {
            let name = query.require_name()?;
            let value = query
                .value
                .as_deref()
                .ok_or_else(|| AppError::validation("'value' is required"))?;
            let secure = query.secure_flag()?;

            info!(name = %name, secure, "Setting preference");
            state.preferences.set(name, value, secure).await?;
            Ok(Json(json!({ "message": "ok" })).into_response())
        }
        Some(other) => Err(AppError::validation(format!("unknown action '{}'", other))),
    }
}
