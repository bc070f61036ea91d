use axum::{extract::State, http::StatusCode};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::activation::{ActivateOutcome, Activation};
use crate::db::AppState;
use crate::error::{ActivationError, AppError, Result};
use crate::extractors::Json;
use crate::handlers::{required, server_timestamp};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationData {
    pub code: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub device_id: String,
    pub last_server_check: String,
}

impl From<Activation> for ActivationData {
    fn from(a: Activation) -> Self {
        Self {
            code: a.code,
            email: a.email,
            name: a.name,
            expiry_date: a.active_till,
            is_active: a.is_active,
            device_id: a.device_id,
            last_server_check: server_timestamp(a.last_server_check),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActivationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_activated: Option<bool>,
}

impl ActivateResponse {
    fn rejected(error: &'static str) -> Self {
        Self {
            valid: false,
            data: None,
            error: Some(error),
            already_activated: None,
        }
    }
}

/// POST /api/activate (also served at /api/check-activation)
///
/// Binds the code to the calling device on first use. Later calls from the
/// same device succeed again; any other device is turned away.
pub async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<(StatusCode, Json<ActivateResponse>)> {
    let (Some(code), Some(device_id)) = (required(req.code), required(req.device_id)) else {
        return Err(AppError::missing_fields());
    };
    tracing::debug!("Received activation request for code {} from device {}", code, device_id);

    let outcome = match state.activations.activate(&code, &device_id, Utc::now()) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Activation failed for code {}: {}", code, e);
            let message = match e {
                ActivationError::Lookup(_) => "Error checking activation code",
                ActivationError::Update(_) => "Error updating device registration",
            };
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActivateResponse::rejected(message)),
            ));
        }
    };

    let (status, body) = match outcome {
        ActivateOutcome::Activated(activation) => {
            tracing::info!("Activated code {} on device {}", activation.code, activation.device_id);
            (
                StatusCode::OK,
                ActivateResponse {
                    valid: true,
                    data: Some(activation.into()),
                    error: None,
                    already_activated: None,
                },
            )
        }
        ActivateOutcome::NotFound => {
            tracing::info!("No active code found for {}", code);
            (
                StatusCode::NOT_FOUND,
                ActivateResponse::rejected("Invalid activation code"),
            )
        }
        ActivateOutcome::DeviceConflict => {
            tracing::info!("Code {} already in use on another device", code);
            (
                StatusCode::BAD_REQUEST,
                ActivateResponse {
                    already_activated: Some(true),
                    ..ActivateResponse::rejected(
                        "This activation code is already in use on another device",
                    )
                },
            )
        }
        ActivateOutcome::Expired => {
            tracing::info!("Code {} has expired", code);
            (
                StatusCode::BAD_REQUEST,
                ActivateResponse::rejected("Activation code has expired"),
            )
        }
    };

    Ok((status, Json(body)))
}
