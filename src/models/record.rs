use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One activation code and its single-device binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    /// Canonical (normalized) code, primary key
    pub code: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// False once the code is retired (expired or deactivated)
    pub is_active: bool,
    /// Last valid calendar day, inclusive
    pub active_till: NaiveDate,
    /// Device currently bound to this code
    pub device_id: Option<String>,
}

impl ActivationRecord {
    pub fn status(&self) -> ActivationStatus {
        ActivationStatus {
            is_active: self.is_active,
            active_till: self.active_till,
            device_id: self.device_id.clone(),
        }
    }
}

/// The subset of a record a status check reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationStatus {
    pub is_active: bool,
    pub active_till: NaiveDate,
    pub device_id: Option<String>,
}

impl ActivationStatus {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_past_expiry(self.active_till, now)
    }
}

/// Input for provisioning a new code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivationRecord {
    pub code: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub active_till: NaiveDate,
}

/// The instant a code stops being valid: 23:59:59.999 UTC on its last day.
pub fn expiry_instant(active_till: NaiveDate) -> DateTime<Utc> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
    active_till.and_time(end_of_day).and_utc()
}

pub fn is_past_expiry(active_till: NaiveDate, now: DateTime<Utc>) -> bool {
    now > expiry_instant(active_till)
}
