//! Persistent store seam for activation records.
//!
//! The state machine only talks to [`ActivationStore`]. Production uses
//! [`SqliteStore`] over an r2d2 pool; tests can swap in [`MemoryStore`].
//! All codes passed to a store are already normalized.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{ActivationRecord, ActivationStatus};

pub trait ActivationStore: Send + Sync {
    /// Record for `code` if it exists and is still active.
    fn find_active(&self, code: &str) -> Result<Option<ActivationRecord>, StoreError>;

    /// Status projection for `code`, active or not.
    fn find_status(&self, code: &str) -> Result<Option<ActivationStatus>, StoreError>;

    /// Flag `code` inactive. Returns the number of rows touched.
    fn mark_inactive(&self, code: &str) -> Result<usize, StoreError>;

    /// Conditionally bind `device_id`: succeeds only while the code is active
    /// and either unbound or already bound to the same device.
    fn bind_device(&self, code: &str, device_id: &str) -> Result<bool, StoreError>;

    /// Flag `code` inactive and clear its device binding.
    fn deactivate(&self, code: &str) -> Result<usize, StoreError>;

    /// Replace the last valid day of `code`.
    fn update_active_till(&self, code: &str, active_till: NaiveDate) -> Result<usize, StoreError>;
}
