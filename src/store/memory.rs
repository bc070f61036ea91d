use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::code::normalize_code;
use crate::error::StoreError;
use crate::models::{ActivationRecord, ActivationStatus};

use super::ActivationStore;

/// In-process store keyed by normalized code.
///
/// Reads and writes can be made to fail on demand so callers can exercise
/// their store-error paths.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ActivationRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, keyed by its normalized code.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    pub fn insert(&self, mut record: ActivationRecord) {
        record.code = normalize_code(&record.code);
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .insert(record.code.clone(), record);
    }

    /// Snapshot of a record, active or not.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    pub fn get(&self, code: &str) -> Option<ActivationRecord> {
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .get(code)
            .cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> Result<MutexGuard<'_, HashMap<String, ActivationRecord>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        self.lock()
    }

    fn write(&self) -> Result<MutexGuard<'_, HashMap<String, ActivationRecord>>, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.lock()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ActivationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".into()))
    }
}

impl ActivationStore for MemoryStore {
    fn find_active(&self, code: &str) -> Result<Option<ActivationRecord>, StoreError> {
        Ok(self.read()?.get(code).filter(|r| r.is_active).cloned())
    }

    fn find_status(&self, code: &str) -> Result<Option<ActivationStatus>, StoreError> {
        Ok(self.read()?.get(code).map(ActivationRecord::status))
    }

    fn mark_inactive(&self, code: &str) -> Result<usize, StoreError> {
        let mut records = self.write()?;
        Ok(match records.get_mut(code) {
            Some(record) => {
                record.is_active = false;
                1
            }
            None => 0,
        })
    }

    fn bind_device(&self, code: &str, device_id: &str) -> Result<bool, StoreError> {
        let mut records = self.write()?;
        let Some(record) = records.get_mut(code) else {
            return Ok(false);
        };
        let bindable = record.is_active
            && record
                .device_id
                .as_deref()
                .is_none_or(|bound| bound == device_id);
        if bindable {
            record.device_id = Some(device_id.to_string());
        }
        Ok(bindable)
    }

    fn deactivate(&self, code: &str) -> Result<usize, StoreError> {
        let mut records = self.write()?;
        Ok(match records.get_mut(code) {
            Some(record) => {
                record.is_active = false;
                record.device_id = None;
                1
            }
            None => 0,
        })
    }

    fn update_active_till(&self, code: &str, active_till: NaiveDate) -> Result<usize, StoreError> {
        let mut records = self.write()?;
        Ok(match records.get_mut(code) {
            Some(record) => {
                record.active_till = active_till;
                1
            }
            None => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, device_id: Option<&str>) -> ActivationRecord {
        ActivationRecord {
            code: code.to_string(),
            email: None,
            name: None,
            is_active: true,
            active_till: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            device_id: device_id.map(String::from),
        }
    }

    #[test]
    fn test_insert_normalizes_key() {
        let store = MemoryStore::new();
        store.insert(record("ab-12", None));
        assert!(store.get("AB12").is_some());
    }

    #[test]
    fn test_bind_device_keeps_existing_binding() {
        let store = MemoryStore::new();
        store.insert(record("AB12", Some("dev-1")));
        assert!(!store.bind_device("AB12", "dev-2").unwrap());
        assert_eq!(store.get("AB12").unwrap().device_id.as_deref(), Some("dev-1"));
    }

    #[test]
    fn test_poisoned_lock_is_not_silent() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let insert = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.insert(record("AB12", None));
        }));
        assert!(insert.is_err(), "insert must fail loudly on a poisoned lock");

        let get = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| store.get("AB12")));
        assert!(get.is_err(), "get must fail loudly on a poisoned lock");

        assert!(matches!(
            store.find_active("AB12"),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_failure_switches() {
        let store = MemoryStore::new();
        store.insert(record("AB12", None));

        store.fail_reads(true);
        assert!(store.find_active("AB12").is_err());
        assert!(store.mark_inactive("AB12").is_ok());

        store.fail_reads(false);
        store.fail_writes(true);
        assert!(store.find_status("AB12").is_ok());
        assert!(store.deactivate("AB12").is_err());
    }
}
