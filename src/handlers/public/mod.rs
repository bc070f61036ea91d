mod activate;
mod deactivate;
mod expiry;
mod status;

pub use activate::*;
pub use deactivate::*;
pub use expiry::*;
pub use status::*;

use axum::{Json, Router};
use serde::Serialize;

use crate::db::AppState;
use crate::handlers::post_endpoint;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/activate", post_endpoint(activate))
        // Path used by already shipped extension builds
        .route("/api/check-activation", post_endpoint(activate))
        .route("/api/check-status", post_endpoint(check_status))
        .route("/api/deactivate", post_endpoint(deactivate))
        .route("/api/update-expiry", post_endpoint(update_expiry))
}
