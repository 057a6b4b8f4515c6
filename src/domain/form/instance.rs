//! Runtime form instance and its lifecycle status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, ErrorCode, FormId, StateMachine, Timestamp};

/// Lifecycle status of a form instance.
///
/// `Completed`, `ExitedIneligible`, and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Collecting,
    Suspended,
    Completed,
    ExitedIneligible,
    Cancelled,
}

impl StateMachine for FormStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use FormStatus::*;
        matches!(
            (self, target),
            (Collecting, Suspended)
                | (Collecting, Completed)
                | (Collecting, ExitedIneligible)
                | (Collecting, Cancelled)
                | (Suspended, Collecting)
                | (Suspended, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use FormStatus::*;
        match self {
            Collecting => vec![Suspended, Completed, ExitedIneligible, Cancelled],
            Suspended => vec![Collecting, Cancelled],
            Completed | ExitedIneligible | Cancelled => vec![],
        }
    }
}

/// Why a form was suspended mid-dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    /// The user asked an unrelated question.
    Question,
    /// The user signalled they made a mistake.
    Mistake,
}

/// A single in-flight form dialogue.
///
/// Owned by the form engine for the duration of an active dialogue and
/// persisted in the session context between stateless invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInstance {
    pub form_id: FormId,
    pub field_index: usize,
    pub collected_values: BTreeMap<String, String>,
    pub status: FormStatus,
    /// Consecutive validation failures on the current field. Resets on
    /// success and on advancing; at three, optional fields unlock a skip.
    pub consecutive_failures: u8,
}

impl FormInstance {
    /// Starts a fresh instance at the first field.
    pub fn start(form_id: FormId) -> Self {
        Self {
            form_id,
            field_index: 0,
            collected_values: BTreeMap::new(),
            status: FormStatus::Collecting,
            consecutive_failures: 0,
        }
    }

    /// Records a collected value under `key`.
    pub fn record(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.collected_values.insert(key.into(), value.into());
    }

    /// Moves to the next field, resetting the failure counter.
    pub fn advance(&mut self) {
        self.field_index += 1;
        self.consecutive_failures = 0;
    }

    /// Moves the instance to `target`, enforcing the status machine.
    pub fn transition(&mut self, target: FormStatus) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|err| DomainError::new(ErrorCode::InvalidStateTransition, err.to_string()))?;
        Ok(())
    }
}

/// Persisted snapshot of a form instance at the moment of interruption.
///
/// Used to reconstruct the instance on resume and to expire it after the
/// suspended-form TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendedFormState {
    pub form_id: FormId,
    pub field_index: usize,
    pub collected_values: BTreeMap<String, String>,
    pub consecutive_failures: u8,
    pub suspend_reason: SuspendReason,
    pub suspended_at: Timestamp,
}

impl SuspendedFormState {
    /// Captures a snapshot of `instance` at suspension time.
    pub fn capture(instance: &FormInstance, reason: SuspendReason, now: Timestamp) -> Self {
        Self {
            form_id: instance.form_id.clone(),
            field_index: instance.field_index,
            collected_values: instance.collected_values.clone(),
            consecutive_failures: instance.consecutive_failures,
            suspend_reason: reason,
            suspended_at: now,
        }
    }

    /// Reconstructs a collecting instance exactly where suspension occurred.
    pub fn restore(&self) -> FormInstance {
        FormInstance {
            form_id: self.form_id.clone(),
            field_index: self.field_index,
            collected_values: self.collected_values.clone(),
            status: FormStatus::Collecting,
            consecutive_failures: self.consecutive_failures,
        }
    }

    /// Returns true if the snapshot is past its TTL and counts as abandoned.
    pub fn is_expired(&self, now: &Timestamp, ttl_minutes: i64) -> bool {
        self.suspended_at.is_older_than(now, ttl_minutes)
    }
}
