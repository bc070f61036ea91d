//! Test utilities and fixtures for activation server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Days, NaiveDate, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::Value;
use tower::ServiceExt;

pub use activation_server::activation::ActivationService;
pub use activation_server::config::AllowedOrigins;
pub use activation_server::db::{AppState, DbPool, init_db, queries};
pub use activation_server::handlers;
pub use activation_server::models::*;
pub use activation_server::store::{MemoryStore, SqliteStore};

/// Create an in-memory database pool with schema initialized.
///
/// Pool size is 1: every in-memory SQLite connection is its own database.
/// Drop any connection taken from the pool before sending a request.
pub fn setup_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    pool
}

/// App state backed by a fresh in-memory SQLite store
pub fn create_test_app_state() -> (AppState, DbPool) {
    let pool = setup_test_pool();
    let state = AppState {
        activations: ActivationService::new(Arc::new(SqliteStore::new(pool.clone()))),
    };
    (state, pool)
}

/// App state backed by an in-memory fake store (for injecting store failures)
pub fn create_memory_app_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        activations: ActivationService::new(store.clone()),
    };
    (state, store)
}

/// The full app with middleware, allowing any origin
pub fn test_app(state: AppState) -> Router {
    handlers::app(state, &AllowedOrigins::Any)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_now(days: u64) -> NaiveDate {
    today() + Days::new(days)
}

pub fn days_ago(days: u64) -> NaiveDate {
    today() - Days::new(days)
}

/// Create an activation code with default metadata
pub fn create_test_record(conn: &Connection, code: &str, active_till: NaiveDate) -> ActivationRecord {
    let input = CreateActivationRecord {
        code: code.to_string(),
        email: Some("buyer@example.com".to_string()),
        name: Some("Test Buyer".to_string()),
        active_till,
    };
    queries::create_record(conn, &input).expect("Failed to create test activation code")
}

/// Create an activation code already bound to a device
pub fn create_bound_record(
    conn: &Connection,
    code: &str,
    active_till: NaiveDate,
    device_id: &str,
) -> ActivationRecord {
    let record = create_test_record(conn, code, active_till);
    assert!(queries::bind_device(conn, &record.code, device_id).unwrap());
    ActivationRecord {
        device_id: Some(device_id.to_string()),
        ..record
    }
}

/// Read a record straight from the database, active or not
pub fn stored_record(pool: &DbPool, code: &str) -> ActivationRecord {
    let conn = pool.get().unwrap();
    queries::get_record_by_code(&conn, code)
        .unwrap()
        .expect("record should exist")
}

/// Send a JSON POST and return the status and parsed body
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response should be valid JSON")
    };
    (status, json)
}
