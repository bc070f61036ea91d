use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};

use crate::code::normalize_code;
use crate::error::StoreError;
use crate::models::*;

use super::from_row::{RECORD_COLS, STATUS_COLS, query_one};

type Result<T> = std::result::Result<T, StoreError>;

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Provisioning ============

/// Insert a new activation code. The code is stored in normalized form.
pub fn create_record(conn: &Connection, input: &CreateActivationRecord) -> Result<ActivationRecord> {
    let code = normalize_code(&input.code);
    let now = now();

    conn.execute(
        "INSERT INTO activation_codes (code, email, name, is_active, active_till, device_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, ?4, NULL, ?5, ?5)",
        params![&code, &input.email, &input.name, input.active_till, now],
    )?;

    Ok(ActivationRecord {
        code,
        email: input.email.clone(),
        name: input.name.clone(),
        is_active: true,
        active_till: input.active_till,
        device_id: None,
    })
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM activation_codes", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Lookups ============

/// Fetch a record regardless of its active flag.
pub fn get_record_by_code(conn: &Connection, code: &str) -> Result<Option<ActivationRecord>> {
    query_one(
        conn,
        &format!("SELECT {} FROM activation_codes WHERE code = ?1", RECORD_COLS),
        &[&code],
    )
}

/// Fetch a record only while it is still active.
pub fn get_active_record_by_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<ActivationRecord>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM activation_codes WHERE code = ?1 AND is_active = 1",
            RECORD_COLS
        ),
        &[&code],
    )
}

pub fn get_status_by_code(conn: &Connection, code: &str) -> Result<Option<ActivationStatus>> {
    query_one(
        conn,
        &format!("SELECT {} FROM activation_codes WHERE code = ?1", STATUS_COLS),
        &[&code],
    )
}

// ============ Mutations ============

pub fn mark_inactive(conn: &Connection, code: &str) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE activation_codes SET is_active = 0, updated_at = ?1 WHERE code = ?2",
        params![now(), code],
    )?;
    Ok(updated)
}

/// Bind a device to an active code, but only while the code is unbound or
/// already bound to the same device.
///
/// Returns false when another device holds the binding (or the code is no
/// longer active), so two concurrent activations cannot both win.
pub fn bind_device(conn: &Connection, code: &str, device_id: &str) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE activation_codes SET device_id = ?1, updated_at = ?2
         WHERE code = ?3 AND is_active = 1 AND (device_id IS NULL OR device_id = ?1)",
        params![device_id, now(), code],
    )?;
    Ok(updated > 0)
}

/// Retire a code and release its device. Unknown codes are a no-op.
pub fn deactivate_record(conn: &Connection, code: &str) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE activation_codes SET is_active = 0, device_id = NULL, updated_at = ?1 WHERE code = ?2",
        params![now(), code],
    )?;
    Ok(updated)
}

/// Move a code's last valid day. Never touches `is_active`.
pub fn update_active_till(conn: &Connection, code: &str, active_till: NaiveDate) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE activation_codes SET active_till = ?1, updated_at = ?2 WHERE code = ?3",
        params![active_till, now(), code],
    )?;
    Ok(updated)
}
