use chrono::NaiveDate;

use crate::db::{DbPool, queries};
use crate::error::StoreError;
use crate::models::{ActivationRecord, ActivationStatus};

use super::ActivationStore;

/// SQLite-backed store. Each call checks out its own pooled connection.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl ActivationStore for SqliteStore {
    fn find_active(&self, code: &str) -> Result<Option<ActivationRecord>, StoreError> {
        let conn = self.pool.get()?;
        queries::get_active_record_by_code(&conn, code)
    }

    fn find_status(&self, code: &str) -> Result<Option<ActivationStatus>, StoreError> {
        let conn = self.pool.get()?;
        queries::get_status_by_code(&conn, code)
    }

    fn mark_inactive(&self, code: &str) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        queries::mark_inactive(&conn, code)
    }

    fn bind_device(&self, code: &str, device_id: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        queries::bind_device(&conn, code, device_id)
    }

    fn deactivate(&self, code: &str) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        queries::deactivate_record(&conn, code)
    }

    fn update_active_till(&self, code: &str, active_till: NaiveDate) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        queries::update_active_till(&conn, code, active_till)
    }
}
