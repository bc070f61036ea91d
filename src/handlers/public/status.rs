use axum::{extract::State, http::StatusCode};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::activation::{StatusOutcome, StatusReport};
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::handlers::{required, server_timestamp};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatusRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub last_server_check: String,
}

impl From<StatusReport> for StatusData {
    fn from(report: StatusReport) -> Self {
        Self {
            expiry_date: report.active_till,
            is_active: report.is_active,
            last_server_check: server_timestamp(report.last_server_check),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckStatusResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatusData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl CheckStatusResponse {
    fn rejected(error: &'static str) -> Self {
        Self {
            valid: false,
            data: None,
            error: Some(error),
        }
    }
}

/// POST /api/check-status
///
/// Periodic re-validation from an already activated device. Read-only except
/// that an expired code is retired on the spot.
pub async fn check_status(
    State(state): State<AppState>,
    Json(req): Json<CheckStatusRequest>,
) -> Result<(StatusCode, Json<CheckStatusResponse>)> {
    let (Some(code), Some(device_id)) = (required(req.code), required(req.device_id)) else {
        return Err(AppError::missing_fields());
    };

    let outcome = match state.activations.check_status(&code, &device_id, Utc::now()) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Status check failed for code {}: {}", code, e);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckStatusResponse::rejected("Error checking activation status")),
            ));
        }
    };

    let (status, body) = match outcome {
        StatusOutcome::Valid(report) => (
            StatusCode::OK,
            CheckStatusResponse {
                valid: true,
                data: Some(report.into()),
                error: None,
            },
        ),
        StatusOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            CheckStatusResponse::rejected("Invalid activation code"),
        ),
        StatusOutcome::DeviceMismatch => (
            StatusCode::BAD_REQUEST,
            CheckStatusResponse::rejected("Device ID mismatch"),
        ),
        StatusOutcome::Inactive => (
            StatusCode::BAD_REQUEST,
            CheckStatusResponse::rejected("Code is inactive"),
        ),
        StatusOutcome::Expired => (
            StatusCode::BAD_REQUEST,
            CheckStatusResponse::rejected("Activation code has expired"),
        ),
    };

    if !body.valid {
        tracing::debug!("Status check for code {} rejected: {:?}", code, body.error);
    }

    Ok((status, Json(body)))
}
