pub mod public;

use std::any::Any;

use axum::{
    Router,
    handler::Handler,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use chrono::{DateTime, SecondsFormat, Utc};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::AllowedOrigins;
use crate::cors::cors_layer;
use crate::db::AppState;
use crate::error::AppError;

/// The served application: routes, panic recovery, CORS and request tracing.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    router()
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// All routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .route("/health", get(public::health).fallback(method_not_allowed))
        .fallback(not_found)
}

/// POST route that answers bare OPTIONS with 200 and every other method with
/// a JSON 405. CORS preflights are answered by the CORS layer before this.
pub(crate) fn post_endpoint<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    post(handler).options(preflight).fallback(method_not_allowed)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// Timestamp format sent to clients as `lastServerCheck`: RFC 3339, UTC,
/// millisecond precision, `Z` suffix.
pub(crate) fn server_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Treat absent and empty strings alike.
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}
