//! Activation state machine.
//!
//! Every endpoint funnels through here. The `decide_*` functions are pure:
//! given what the store returned, the caller's device and the current time,
//! they pick an outcome and at most one store mutation. [`ActivationService`]
//! fetches, decides, and applies.
//!
//! Codes are normalized before every store access, including deactivation
//! and status checks.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::code::normalize_code;
use crate::error::ActivationError;
use crate::models::{ActivationRecord, ActivationStatus};
use crate::store::ActivationStore;

/// A store write the state machine asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MarkInactive,
    BindDevice(String),
}

/// An outcome plus the mutation needed to make it true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<T> {
    pub outcome: T,
    pub mutation: Option<Mutation>,
}

impl<T> Decision<T> {
    fn done(outcome: T) -> Self {
        Self { outcome, mutation: None }
    }

    fn then(mutation: Mutation, outcome: T) -> Self {
        Self { outcome, mutation: Some(mutation) }
    }
}

/// Public view of a freshly activated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub code: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub active_till: NaiveDate,
    pub is_active: bool,
    pub device_id: String,
    pub last_server_check: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    Activated(Activation),
    NotFound,
    DeviceConflict,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub active_till: NaiveDate,
    pub is_active: bool,
    pub last_server_check: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Valid(StatusReport),
    NotFound,
    DeviceMismatch,
    Inactive,
    Expired,
}

/// Decide an activation attempt against the active record for a code.
///
/// `record` must already be filtered to active codes.
pub fn decide_activation(
    record: Option<&ActivationRecord>,
    device_id: &str,
    now: DateTime<Utc>,
) -> Decision<ActivateOutcome> {
    let Some(record) = record else {
        return Decision::done(ActivateOutcome::NotFound);
    };

    if let Some(bound) = &record.device_id
        && bound != device_id
    {
        return Decision::done(ActivateOutcome::DeviceConflict);
    }

    if record.status().is_expired_at(now) {
        return Decision::then(Mutation::MarkInactive, ActivateOutcome::Expired);
    }

    Decision::then(
        Mutation::BindDevice(device_id.to_string()),
        ActivateOutcome::Activated(Activation {
            code: record.code.clone(),
            email: record.email.clone(),
            name: record.name.clone(),
            active_till: record.active_till,
            is_active: record.is_active,
            device_id: device_id.to_string(),
            last_server_check: now,
        }),
    )
}

/// Decide a status check. The device comparison treats an unbound code as a
/// mismatch for every caller.
pub fn decide_status(
    status: Option<&ActivationStatus>,
    device_id: &str,
    now: DateTime<Utc>,
) -> Decision<StatusOutcome> {
    let Some(status) = status else {
        return Decision::done(StatusOutcome::NotFound);
    };

    if status.device_id.as_deref() != Some(device_id) {
        return Decision::done(StatusOutcome::DeviceMismatch);
    }

    if !status.is_active {
        return Decision::done(StatusOutcome::Inactive);
    }

    if status.is_expired_at(now) {
        return Decision::then(Mutation::MarkInactive, StatusOutcome::Expired);
    }

    Decision::done(StatusOutcome::Valid(StatusReport {
        active_till: status.active_till,
        is_active: status.is_active,
        last_server_check: now,
    }))
}

/// Runs activation operations against an injected store.
#[derive(Clone)]
pub struct ActivationService {
    store: Arc<dyn ActivationStore>,
}

impl ActivationService {
    pub fn new(store: Arc<dyn ActivationStore>) -> Self {
        Self { store }
    }

    pub fn activate(
        &self,
        code: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivateOutcome, ActivationError> {
        let code = normalize_code(code);
        let record = self
            .store
            .find_active(&code)
            .map_err(ActivationError::Lookup)?;

        let decision = decide_activation(record.as_ref(), device_id, now);
        match decision.mutation {
            Some(Mutation::MarkInactive) => {
                tracing::info!("Activation code {} has expired, marking inactive", code);
                self.store
                    .mark_inactive(&code)
                    .map_err(ActivationError::Update)?;
            }
            Some(Mutation::BindDevice(device)) => {
                let bound = self
                    .store
                    .bind_device(&code, &device)
                    .map_err(ActivationError::Update)?;
                if !bound {
                    // The row changed between our read and write: either it was
                    // retired, or another device took the binding
                    let still_active = self
                        .store
                        .find_active(&code)
                        .map_err(ActivationError::Lookup)?;
                    if still_active.is_none() {
                        tracing::info!("Code {} was retired before it could be bound", code);
                        return Ok(ActivateOutcome::NotFound);
                    }
                    tracing::warn!("Lost device binding race for code {}", code);
                    return Ok(ActivateOutcome::DeviceConflict);
                }
            }
            None => {}
        }

        Ok(decision.outcome)
    }

    pub fn check_status(
        &self,
        code: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StatusOutcome, ActivationError> {
        let code = normalize_code(code);
        let status = self
            .store
            .find_status(&code)
            .map_err(ActivationError::Lookup)?;

        let decision = decide_status(status.as_ref(), device_id, now);
        if decision.mutation == Some(Mutation::MarkInactive) {
            tracing::info!("Activation code {} has expired, marking inactive", code);
            self.store
                .mark_inactive(&code)
                .map_err(ActivationError::Update)?;
        }

        Ok(decision.outcome)
    }

    /// Retire a code and release its device. Unknown codes succeed as a no-op.
    pub fn deactivate(&self, code: &str) -> Result<(), ActivationError> {
        let code = normalize_code(code);
        let touched = self
            .store
            .deactivate(&code)
            .map_err(ActivationError::Update)?;
        if touched == 0 {
            tracing::debug!("Deactivate matched no code {}", code);
        }
        Ok(())
    }

    /// Move a code's last valid day. Does not revive an inactive code.
    pub fn update_expiry(&self, code: &str, active_till: NaiveDate) -> Result<(), ActivationError> {
        let code = normalize_code(code);
        let touched = self
            .store
            .update_active_till(&code, active_till)
            .map_err(ActivationError::Update)?;
        if touched == 0 {
            tracing::debug!("Expiry update matched no code {}", code);
        }
        Ok(())
    }
}
