use axum::{extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;

use super::deactivate::MutationResponse;
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::handlers::required;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpiryRequest {
    #[serde(default)]
    pub code: Option<String>,
    /// New last valid day, `YYYY-MM-DD`
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Parse a strict `YYYY-MM-DD` date. chrono alone accepts unpadded fields
/// like `2025-1-5`, so the shape is checked first.
fn parse_expiry_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// POST /api/update-expiry
///
/// Moves the last valid day of a code. An already retired code stays retired.
pub async fn update_expiry(
    State(state): State<AppState>,
    Json(req): Json<UpdateExpiryRequest>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let (Some(code), Some(expiry_date)) = (required(req.code), required(req.expiry_date)) else {
        return Err(AppError::missing_fields());
    };

    let active_till = parse_expiry_date(&expiry_date).ok_or_else(|| {
        AppError::BadRequest("Invalid expiry date, expected YYYY-MM-DD".into())
    })?;
    tracing::debug!("Received expiry update for code {}: {}", code, active_till);

    if let Err(e) = state.activations.update_expiry(&code, active_till) {
        tracing::error!("Expiry update failed for code {}: {}", code, e);
        return Ok(MutationResponse::failed("Failed to update expiry date"));
    }

    tracing::info!("Updated expiry for code {} to {}", code, active_till);
    Ok(MutationResponse::ok())
}
