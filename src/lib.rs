//! Activation server - single-device activation codes over HTTP
//!
//! Validates, binds, renews and revokes activation codes stored in one
//! SQLite table. All endpoints share one state machine in [`activation`].

pub mod activation;
pub mod code;
pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod store;
