//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::error::StoreError;
use crate::models::{ActivationRecord, ActivationStatus};

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Option<T>, StoreError> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const RECORD_COLS: &str = "code, email, name, is_active, active_till, device_id";

/// Projection used by status checks
pub const STATUS_COLS: &str = "is_active, active_till, device_id";

// ============ FromRow Implementations ============

impl FromRow for ActivationRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ActivationRecord {
            code: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            is_active: row.get(3)?,
            active_till: row.get(4)?,
            device_id: row.get(5)?,
        })
    }
}

impl FromRow for ActivationStatus {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ActivationStatus {
            is_active: row.get(0)?,
            active_till: row.get(1)?,
            device_id: row.get(2)?,
        })
    }
}
