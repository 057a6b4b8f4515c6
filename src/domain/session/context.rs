//! The externally persisted, per-session record.
//!
//! All durable state of the decision core lives here: completed programs,
//! the single suspended-form slot, declared program interest, and the
//! in-flight form instance carried between stateless invocations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::form::{FormInstance, SuspendedFormState};
use crate::domain::foundation::{ProgramId, SessionId, Timestamp};

/// Per-session durable context.
///
/// Invariant: a program appears in `completed_programs` only after a full,
/// eligible completion, never after an eligibility-gate exit or a cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: SessionId,

    /// Programs this session has fully completed a form for. Tracked at
    /// program granularity: multiple forms may share a program.
    pub completed_programs: BTreeSet<ProgramId>,

    /// The single suspended-form slot; each suspend overwrites it.
    pub suspended_form: Option<SuspendedFormState>,

    /// Program the user declared interest in mid-form, used to humanize
    /// resume prompts.
    pub program_interest: Option<ProgramId>,

    /// Form dialogue currently collecting answers, if any.
    pub active_form: Option<FormInstance>,

    /// Last interaction time, for idle expiry.
    pub last_active: Timestamp,
}

impl SessionContext {
    /// Creates the context for a session's first interaction.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            completed_programs: BTreeSet::new(),
            suspended_form: None,
            program_interest: None,
            active_form: None,
            last_active: Timestamp::now(),
        }
    }

    /// Records a full, eligible completion of a form's program.
    pub fn record_completion(&mut self, program_id: ProgramId) {
        self.completed_programs.insert(program_id);
    }

    /// Returns true if the program has already been completed this session.
    pub fn has_completed(&self, program_id: &ProgramId) -> bool {
        self.completed_programs.contains(program_id)
    }

    /// Stores a suspended-form snapshot, replacing any prior one.
    pub fn suspend_form(&mut self, snapshot: SuspendedFormState) {
        self.suspended_form = Some(snapshot);
        self.active_form = None;
    }

    /// Discards any suspended snapshot.
    pub fn clear_suspended(&mut self) {
        self.suspended_form = None;
    }

    /// Updates the last-active marker.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_active = now;
    }

    /// Returns true if the session has been idle past `ttl_minutes`.
    pub fn is_idle_expired(&self, now: &Timestamp, ttl_minutes: i64) -> bool {
        self.last_active.is_older_than(now, ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::SuspendReason;
    use crate::domain::foundation::FormId;

    fn ctx() -> SessionContext {
        SessionContext::new(SessionId::new("s1").unwrap())
    }

    #[test]
    fn new_context_is_empty() {
        let ctx = ctx();
        assert!(ctx.completed_programs.is_empty());
        assert!(ctx.suspended_form.is_none());
        assert!(ctx.program_interest.is_none());
        assert!(ctx.active_form.is_none());
    }

    #[test]
    fn record_completion_is_idempotent() {
        let mut ctx = ctx();
        let program = ProgramId::new("volunteer").unwrap();
        ctx.record_completion(program.clone());
        ctx.record_completion(program.clone());
        assert_eq!(ctx.completed_programs.len(), 1);
        assert!(ctx.has_completed(&program));
    }

    #[test]
    fn suspend_form_overwrites_prior_snapshot_and_clears_active() {
        let mut ctx = ctx();
        let first = FormInstance::start(FormId::new("form_a").unwrap());
        let second = FormInstance::start(FormId::new("form_b").unwrap());
        ctx.active_form = Some(second.clone());

        ctx.suspend_form(SuspendedFormState::capture(
            &first,
            SuspendReason::Question,
            Timestamp::now(),
        ));
        ctx.suspend_form(SuspendedFormState::capture(
            &second,
            SuspendReason::Mistake,
            Timestamp::now(),
        ));

        let snapshot = ctx.suspended_form.as_ref().unwrap();
        assert_eq!(snapshot.form_id.as_str(), "form_b");
        assert!(ctx.active_form.is_none());
    }

    #[test]
    fn idle_expiry_follows_last_active() {
        let mut ctx = ctx();
        let now = Timestamp::now();
        ctx.touch(now.minus_minutes(120));
        assert!(ctx.is_idle_expired(&now, 60));
        ctx.touch(now);
        assert!(!ctx.is_idle_expired(&now, 60));
    }
}
