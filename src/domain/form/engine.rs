//! The resumable multi-step form state machine.
//!
//! Each interaction is a stateless invocation; the engine reads and writes
//! the form instance carried by the session context, so every transition
//! here is a total function over (persisted state, classified input).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::catalog::{FieldType, FormDefinition, FormField};
use crate::domain::foundation::{
    DomainError, ErrorCode, FieldId, FormId, ProgramId, Timestamp, ValidationError,
};
use crate::domain::session::SessionContext;

use super::instance::{FormInstance, FormStatus, SuspendReason, SuspendedFormState};
use super::interruption::{classify, Interruption};
use super::validator::{is_negative_answer, validate_field, ValidatedValue};

/// Consecutive validation failures after which an optional field offers a
/// skip and a required field reports itself blocked.
pub const MAX_CONSECUTIVE_FAILURES: u8 = 3;

/// The word an offered skip is accepted with.
const SKIP_ANSWER: &str = "skip";

/// The next prompt to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPrompt {
    pub field_id: FieldId,
    pub prompt_text: String,
    pub field_type: FieldType,
}

impl FormPrompt {
    pub fn for_field(field: &FormField) -> Self {
        Self {
            field_id: field.id.clone(),
            prompt_text: field.prompt.clone(),
            field_type: field.field_type,
        }
    }
}

/// Event emitted to the fulfillment collaborator on completion.
///
/// Dispatch is fire-and-forget: a delivery failure never alters the
/// engine's terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCompleted {
    pub event_id: Uuid,
    pub form_id: FormId,
    pub program_id: ProgramId,
    pub collected_values: BTreeMap<String, String>,
    pub completed_at: Timestamp,
}

/// Result of submitting one raw value while collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The utterance was a cancel; the dialogue is over, nothing recorded.
    Cancelled,
    /// The utterance was an interruption; the instance is snapshotted and
    /// the raw text should be routed as an ordinary free-text interaction.
    Suspended { reason: SuspendReason },
    /// The answer failed validation; the same field is prompted again.
    ValidationFailed {
        field_id: FieldId,
        message: String,
        /// True once an optional field has failed three times in a row.
        skip_offered: bool,
    },
    /// An eligibility gate was answered negatively; dialogue over, the
    /// field's failure message is returned verbatim.
    ExitedIneligible { message: String },
    /// The answer was accepted; prompt the next field.
    NextField(FormPrompt),
    /// The last field was accepted; the program is recorded as completed.
    Completed(FormCompleted),
}

/// Result of attempting to resume a suspended form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Collecting again at exactly the field where suspension occurred.
    Resumed(FormPrompt),
    /// The snapshot was past its TTL; it was discarded and the form must
    /// be started fresh.
    Expired,
    /// No suspended snapshot exists for this form.
    NothingSuspended,
}

/// The resumable multi-step form engine.
#[derive(Debug, Clone, Copy)]
pub struct FormEngine {
    suspended_form_ttl_minutes: i64,
}

impl FormEngine {
    pub fn new(suspended_form_ttl_minutes: i64) -> Self {
        Self {
            suspended_form_ttl_minutes,
        }
    }

    /// Starts a form dialogue, implicitly cancelling any different form
    /// already active for the session (no silent merge of two forms).
    ///
    /// Starting the form that is already collecting re-prompts its current
    /// field without losing progress.
    pub fn start(
        &self,
        definition: &FormDefinition,
        ctx: &mut SessionContext,
    ) -> Result<FormPrompt, DomainError> {
        if let Some(active) = &ctx.active_form {
            if active.form_id == definition.form_id {
                let field = self.field_at(definition, active.field_index)?;
                return Ok(FormPrompt::for_field(field));
            }
            info!(
                prior = %active.form_id,
                requested = %definition.form_id,
                "implicitly cancelling active form"
            );
        }

        let instance = FormInstance::start(definition.form_id.clone());
        let field = self.field_at(definition, 0)?;
        let prompt = FormPrompt::for_field(field);
        ctx.active_form = Some(instance);
        Ok(prompt)
    }

    /// Processes one raw value for the active form's current field.
    pub fn submit_field(
        &self,
        definition: &FormDefinition,
        ctx: &mut SessionContext,
        raw: &str,
        now: Timestamp,
    ) -> Result<SubmitOutcome, DomainError> {
        let instance = ctx.active_form.as_mut().ok_or_else(|| {
            DomainError::new(ErrorCode::FormNotActive, "No form is collecting answers")
        })?;
        if instance.status != FormStatus::Collecting {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot submit a field while {:?}", instance.status),
            ));
        }
        let field_index = instance.field_index;
        let field = self.field_at(definition, field_index)?;

        // Interruption classification applies only to typed answers; a
        // select value is a picked option and is taken literally.
        if field.field_type.is_text_bearing() {
            match classify(raw) {
                Interruption::Cancel => {
                    info!(form = %definition.form_id, "form cancelled by user");
                    let mut cancelled = ctx.active_form.take().ok_or_else(missing_active)?;
                    cancelled.transition(FormStatus::Cancelled)?;
                    ctx.clear_suspended();
                    return Ok(SubmitOutcome::Cancelled);
                }
                Interruption::Question => {
                    return self.suspend(definition, ctx, SuspendReason::Question, now);
                }
                Interruption::Mistake => {
                    return self.suspend(definition, ctx, SuspendReason::Mistake, now);
                }
                Interruption::Continue => {}
            }
        }

        // An offered skip on an optional field advances without a value.
        if !field.required
            && instance.consecutive_failures >= MAX_CONSECUTIVE_FAILURES
            && raw.trim().eq_ignore_ascii_case(SKIP_ANSWER)
        {
            return self.accept(definition, ctx, field_index, None, now);
        }

        let validated = match validate_field(field, raw) {
            Ok(validated) => validated,
            Err(err) => {
                let instance = ctx.active_form.as_mut().ok_or_else(missing_active)?;
                return Ok(self.reject(field, instance, err));
            }
        };

        // Eligibility gates end the dialogue on a negative answer without
        // marking the program completed.
        if field.eligibility_gate {
            let answer = match &validated {
                ValidatedValue::Scalar(s) => s.as_str(),
                ValidatedValue::Composite { confirmation, .. } => confirmation.as_str(),
            };
            if is_negative_answer(answer) {
                let message = field.failure_message.clone().unwrap_or_default();
                info!(form = %definition.form_id, field = %field.id, "eligibility exit");
                let mut exited = ctx.active_form.take().ok_or_else(missing_active)?;
                exited.transition(FormStatus::ExitedIneligible)?;
                return Ok(SubmitOutcome::ExitedIneligible { message });
            }
        }

        self.accept(definition, ctx, field_index, Some(validated), now)
    }

    /// Restores a suspended form if its snapshot is still within the TTL.
    ///
    /// Idempotent: resuming an already-collecting form re-prompts its
    /// current field without advancing.
    pub fn resume(
        &self,
        form_id: &FormId,
        definition: &FormDefinition,
        ctx: &mut SessionContext,
        now: Timestamp,
    ) -> Result<ResumeOutcome, DomainError> {
        // Already restored and collecting: repeat the current prompt.
        if let Some(active) = &ctx.active_form {
            if &active.form_id == form_id && active.status == FormStatus::Collecting {
                let field = self.field_at(definition, active.field_index)?;
                return Ok(ResumeOutcome::Resumed(Self::resume_prompt(field, ctx)));
            }
        }

        let snapshot = match &ctx.suspended_form {
            Some(snapshot) if &snapshot.form_id == form_id => snapshot.clone(),
            _ => return Ok(ResumeOutcome::NothingSuspended),
        };

        if snapshot.is_expired(&now, self.suspended_form_ttl_minutes) {
            info!(form = %form_id, "suspended form expired, treating as abandoned");
            ctx.clear_suspended();
            return Ok(ResumeOutcome::Expired);
        }

        let instance = snapshot.restore();
        let field = self.field_at(definition, instance.field_index)?;
        let prompt = Self::resume_prompt(field, ctx);
        ctx.active_form = Some(instance);
        ctx.clear_suspended();
        debug!(form = %form_id, field = %prompt.field_id, "form resumed");
        Ok(ResumeOutcome::Resumed(prompt))
    }

    /// Cancels whatever dialogue exists, active or suspended.
    ///
    /// Returns true if there was anything to cancel. Completed programs
    /// are never touched.
    pub fn cancel(&self, ctx: &mut SessionContext) -> bool {
        let had_form = ctx.active_form.is_some() || ctx.suspended_form.is_some();
        if let Some(mut instance) = ctx.active_form.take() {
            // Active instances are always collecting.
            let _ = instance.transition(FormStatus::Cancelled);
        }
        ctx.clear_suspended();
        had_form
    }

    /// The re-prompt shown on resume, naming the declared program interest
    /// when the session has one.
    fn resume_prompt(field: &FormField, ctx: &SessionContext) -> FormPrompt {
        let mut prompt = FormPrompt::for_field(field);
        if let Some(program) = &ctx.program_interest {
            prompt.prompt_text = format!(
                "Picking up your {} application where we left off. {}",
                program, prompt.prompt_text
            );
        }
        prompt
    }

    fn field_at<'a>(
        &self,
        definition: &'a FormDefinition,
        index: usize,
    ) -> Result<&'a FormField, DomainError> {
        definition.field(index).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!(
                    "Form '{}' has no field at index {}",
                    definition.form_id, index
                ),
            )
        })
    }

    fn suspend(
        &self,
        definition: &FormDefinition,
        ctx: &mut SessionContext,
        reason: SuspendReason,
        now: Timestamp,
    ) -> Result<SubmitOutcome, DomainError> {
        let mut instance = ctx.active_form.take().ok_or_else(missing_active)?;
        instance.transition(FormStatus::Suspended)?;
        let snapshot = SuspendedFormState::capture(&instance, reason, now);
        debug!(
            form = %definition.form_id,
            field_index = snapshot.field_index,
            ?reason,
            "suspending form on interruption"
        );
        ctx.suspend_form(snapshot);
        Ok(SubmitOutcome::Suspended { reason })
    }

    fn reject(
        &self,
        field: &FormField,
        instance: &mut FormInstance,
        err: ValidationError,
    ) -> SubmitOutcome {
        instance.consecutive_failures = instance.consecutive_failures.saturating_add(1);
        let skip_offered =
            !field.required && instance.consecutive_failures >= MAX_CONSECUTIVE_FAILURES;
        SubmitOutcome::ValidationFailed {
            field_id: field.id.clone(),
            message: err.to_string(),
            skip_offered,
        }
    }

    fn accept(
        &self,
        definition: &FormDefinition,
        ctx: &mut SessionContext,
        field_index: usize,
        validated: Option<ValidatedValue>,
        now: Timestamp,
    ) -> Result<SubmitOutcome, DomainError> {
        let field = self.field_at(definition, field_index)?;
        let field_id = field.id.clone();
        let sets_interest = field.sets_program_interest;

        let mut interest: Option<ProgramId> = None;
        {
            let instance = ctx.active_form.as_mut().ok_or_else(missing_active)?;
            match validated {
                Some(ValidatedValue::Scalar(value)) => {
                    if sets_interest {
                        interest = ProgramId::new(value.clone()).ok();
                    }
                    instance.record(field_id.as_str(), value);
                }
                Some(ValidatedValue::Composite {
                    confirmation,
                    sub_values,
                }) => {
                    // Composite fields record the confirmation string plus
                    // each sub-value under dotted keys, but occupy exactly
                    // one step of progress.
                    instance.record(field_id.as_str(), confirmation);
                    for (key, value) in sub_values {
                        instance.record(format!("{}.{}", field_id, key), value);
                    }
                }
                None => {} // skipped optional field
            }
            instance.consecutive_failures = 0;
        }

        // Program interest is written through immediately so a later
        // suspend/resume can humanize the prompt.
        if let Some(program) = interest {
            ctx.program_interest = Some(program);
        }

        if definition.is_last_field(field_index) {
            let mut instance = ctx.active_form.take().ok_or_else(missing_active)?;
            instance.transition(FormStatus::Completed)?;
            ctx.record_completion(definition.program_id.clone());
            info!(form = %definition.form_id, program = %definition.program_id, "form completed");
            return Ok(SubmitOutcome::Completed(FormCompleted {
                event_id: Uuid::new_v4(),
                form_id: definition.form_id.clone(),
                program_id: definition.program_id.clone(),
                collected_values: instance.collected_values,
                completed_at: now,
            }));
        }

        let instance = ctx.active_form.as_mut().ok_or_else(missing_active)?;
        instance.advance();
        let next = self.field_at(definition, instance.field_index)?;
        Ok(SubmitOutcome::NextField(FormPrompt::for_field(next)))
    }
}

fn missing_active() -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        "Active form instance disappeared mid-submit",
    )
}
