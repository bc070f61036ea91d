use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::handlers::required;

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl MutationResponse {
    pub(crate) fn ok() -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                error: None,
            }),
        )
    }

    pub(crate) fn failed(error: &'static str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                success: false,
                error: Some(error),
            }),
        )
    }
}

/// POST /api/deactivate
///
/// Retires the code and releases its device. Reports success even when no
/// code matched.
pub async fn deactivate(
    State(state): State<AppState>,
    Json(req): Json<DeactivateRequest>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let Some(code) = required(req.code) else {
        return Err(AppError::missing_fields());
    };
    tracing::debug!("Received deactivation request for code {}", code);

    if let Err(e) = state.activations.deactivate(&code) {
        tracing::error!("Deactivation failed for code {}: {}", code, e);
        return Ok(MutationResponse::failed("Failed to deactivate code"));
    }

    tracing::info!("Deactivated code {}", code);
    Ok(MutationResponse::ok())
}
