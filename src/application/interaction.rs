//! One-turn orchestration: load context, run the decision core, commit.
//!
//! Every turn is a single atomic commit against the session store. The
//! routing, selection, and form logic all run inside the commit's mutator
//! so they always observe the latest persisted context, and their writes
//! land in the same commit they read from.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::config::EngineConfig;
use crate::domain::catalog::{ConfigView, CtaAction, FormDefinition};
use crate::domain::form::{
    FormCompleted, FormEngine, FormPrompt, FormStatus, ResumeOutcome, SubmitOutcome,
};
use crate::domain::foundation::{
    BranchId, ChipId, CtaId, DomainError, ErrorCode, SessionId, Timestamp,
};
use crate::domain::routing::{RoutingMetadata, RoutingResolver};
use crate::domain::selection::{CtaSelector, PositionedCta};
use crate::domain::session::SessionContext;
use crate::ports::{FulfillmentDispatcher, SessionStore, SessionStoreError};

/// One user interaction, as delivered by the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub kind: InteractionKind,
}

/// What the user did, plus any explicit routing hints the widget attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionKind {
    ActionChip {
        chip_id: ChipId,
        #[serde(default)]
        target_branch: Option<BranchId>,
    },
    Cta {
        cta_id: CtaId,
        #[serde(default)]
        target_branch: Option<BranchId>,
    },
    FreeText {
        text: String,
    },
    FormField {
        raw_value: String,
    },
}

/// What the widget should present after one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    /// Resolved branch, or `None` when no follow-up actions apply.
    pub branch_id: Option<BranchId>,
    pub ctas: Vec<PositionedCta>,
    pub form_prompt: Option<FormPrompt>,
    pub form_status: Option<FormStatus>,
    /// User-facing correction or exit text, when the form produced one.
    pub message: Option<String>,
    /// True when the session store was unreachable and this response was
    /// served from an empty context.
    pub degraded: bool,
}

/// Everything one turn decided, computed inside the store commit.
struct Turn {
    branch_id: Option<BranchId>,
    ctas: Vec<PositionedCta>,
    form_prompt: Option<FormPrompt>,
    form_status: Option<FormStatus>,
    message: Option<String>,
    completed: Option<FormCompleted>,
}

/// Orchestrates the decision core for one interaction at a time.
pub struct InteractionHandler {
    config: Arc<dyn ConfigView>,
    store: Arc<dyn SessionStore>,
    fulfillment: Arc<dyn FulfillmentDispatcher>,
    resolver: RoutingResolver,
    selector: CtaSelector,
    engine: FormEngine,
    max_display: usize,
    session_idle_ttl_minutes: i64,
}

impl InteractionHandler {
    pub fn new(
        config: Arc<dyn ConfigView>,
        store: Arc<dyn SessionStore>,
        fulfillment: Arc<dyn FulfillmentDispatcher>,
        settings: &EngineConfig,
    ) -> Self {
        Self {
            config,
            store,
            fulfillment,
            resolver: RoutingResolver::new(),
            selector: CtaSelector::new(),
            engine: FormEngine::new(settings.suspended_form_ttl_minutes),
            max_display: settings.max_display,
            session_idle_ttl_minutes: settings.session_idle_ttl_minutes,
        }
    }

    /// Handles one interaction end to end.
    pub async fn handle(
        &self,
        event: InteractionEvent,
    ) -> Result<InteractionResponse, DomainError> {
        let now = Timestamp::now();
        let kind = event.kind;

        let config = Arc::clone(&self.config);
        let engine = self.engine;
        let resolver = self.resolver;
        let selector = self.selector;
        let max_display = self.max_display;
        let idle_ttl = self.session_idle_ttl_minutes;
        let turn_kind = kind.clone();

        let slot: Arc<Mutex<Option<Result<Turn, DomainError>>>> = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&slot);

        let committed = self
            .store
            .commit(
                &event.session_id,
                Box::new(move |ctx| {
                    if ctx.is_idle_expired(&now, idle_ttl) {
                        *ctx = SessionContext::new(ctx.session_id.clone());
                    }
                    let turn = process_turn(
                        turn_kind,
                        ctx,
                        config.as_ref(),
                        &engine,
                        &resolver,
                        &selector,
                        max_display,
                        now,
                    );
                    ctx.touch(now);
                    *captured.lock().unwrap_or_else(|e| e.into_inner()) = Some(turn);
                }),
            )
            .await;

        match committed {
            Ok(_) => {}
            Err(SessionStoreError::Unavailable(reason)) => {
                return Ok(self.degraded_response(&reason));
            }
            Err(SessionStoreError::Serialization(reason)) => {
                return Err(DomainError::new(ErrorCode::InternalError, reason));
            }
        }

        let turn = slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InternalError,
                    "session store commit did not run the turn",
                )
            })??;

        // Fire-and-forget: the form is already completed and committed, a
        // delivery failure never rolls that back.
        if let Some(completed) = turn.completed {
            if let Err(err) = self.fulfillment.dispatch(completed).await {
                warn!(error = %err, "fulfillment dispatch failed");
            }
        }

        Ok(InteractionResponse {
            branch_id: turn.branch_id,
            ctas: turn.ctas,
            form_prompt: turn.form_prompt,
            form_status: turn.form_status,
            message: turn.message,
            degraded: false,
        })
    }

    /// The store is down: serve the fallback branch from an empty context,
    /// with no program filtering and no form processing.
    fn degraded_response(&self, reason: &str) -> InteractionResponse {
        warn!(reason, "session store unavailable, serving degraded response");
        let config = self.config.as_ref();
        let branch_id =
            self.resolver
                .resolve(&RoutingMetadata::FreeText, config, config.fallback_branch());
        let ctas = match (branch_id.as_ref(), SessionId::new("degraded")) {
            (Some(branch), Ok(session_id)) => {
                let empty = SessionContext::new(session_id);
                self.selector.select(branch, config, &empty, self.max_display)
            }
            _ => Vec::new(),
        };
        InteractionResponse {
            branch_id,
            ctas,
            form_prompt: None,
            form_status: None,
            message: None,
            degraded: true,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn process_turn(
    kind: InteractionKind,
    ctx: &mut SessionContext,
    config: &dyn ConfigView,
    engine: &FormEngine,
    resolver: &RoutingResolver,
    selector: &CtaSelector,
    max_display: usize,
    now: Timestamp,
) -> Result<Turn, DomainError> {
    match kind {
        InteractionKind::ActionChip {
            chip_id,
            target_branch,
        } => {
            // The widget may omit the target; the chip definition carries it.
            let target = target_branch.or_else(|| {
                config
                    .action_chip(&chip_id)
                    .and_then(|chip| chip.target_branch.clone())
            });
            let metadata = RoutingMetadata::ActionChip {
                source_id: chip_id,
                target_branch: target,
            };
            Ok(route(metadata, ctx, config, resolver, selector, max_display))
        }

        InteractionKind::Cta {
            cta_id,
            target_branch,
        } => {
            let metadata = RoutingMetadata::Cta {
                source_id: cta_id.clone(),
                target_branch,
            };
            let mut turn = route(metadata, ctx, config, resolver, selector, max_display);

            let triggered = config
                .cta(&cta_id)
                .and_then(|cta| match &cta.action {
                    CtaAction::TriggerForm { form_id } => Some(form_id.clone()),
                    _ => None,
                })
                .and_then(|form_id| config.form(&form_id).cloned());
            if let Some(definition) = triggered {
                let prompt = begin_form(engine, &definition, ctx, now)?;
                turn.form_prompt = Some(prompt);
                turn.form_status = Some(FormStatus::Collecting);
            }
            Ok(turn)
        }

        InteractionKind::FreeText { text } => {
            if ctx.active_form.is_some() {
                submit(&text, ctx, config, engine, resolver, selector, max_display, now)
            } else {
                Ok(route(
                    RoutingMetadata::FreeText,
                    ctx,
                    config,
                    resolver,
                    selector,
                    max_display,
                ))
            }
        }

        InteractionKind::FormField { raw_value } => {
            if ctx.active_form.is_some() {
                submit(&raw_value, ctx, config, engine, resolver, selector, max_display, now)
            } else {
                // No dialogue to answer; treat the value as plain text.
                Ok(route(
                    RoutingMetadata::FreeText,
                    ctx,
                    config,
                    resolver,
                    selector,
                    max_display,
                ))
            }
        }
    }
}

/// Resolves a branch and selects its CTAs against the current context.
fn route(
    metadata: RoutingMetadata,
    ctx: &SessionContext,
    config: &dyn ConfigView,
    resolver: &RoutingResolver,
    selector: &CtaSelector,
    max_display: usize,
) -> Turn {
    let branch_id = resolver.resolve(&metadata, config, config.fallback_branch());
    let ctas = branch_id
        .as_ref()
        .map(|b| selector.select(b, config, ctx, max_display))
        .unwrap_or_default();
    Turn {
        branch_id,
        ctas,
        form_prompt: None,
        form_status: None,
        message: None,
        completed: None,
    }
}

/// Starts a form dialogue, resuming a matching suspended snapshot first.
///
/// An expired snapshot is discarded and the form starts fresh, since the
/// user explicitly asked for it again.
fn begin_form(
    engine: &FormEngine,
    definition: &FormDefinition,
    ctx: &mut SessionContext,
    now: Timestamp,
) -> Result<FormPrompt, DomainError> {
    let suspended_here = ctx
        .suspended_form
        .as_ref()
        .map(|s| s.form_id == definition.form_id)
        .unwrap_or(false);
    if suspended_here || ctx.active_form.is_some() {
        match engine.resume(&definition.form_id, definition, ctx, now)? {
            ResumeOutcome::Resumed(prompt) => return Ok(prompt),
            ResumeOutcome::Expired | ResumeOutcome::NothingSuspended => {}
        }
    }
    engine.start(definition, ctx)
}

/// Runs one answer through the active form.
#[allow(clippy::too_many_arguments)]
fn submit(
    raw: &str,
    ctx: &mut SessionContext,
    config: &dyn ConfigView,
    engine: &FormEngine,
    resolver: &RoutingResolver,
    selector: &CtaSelector,
    max_display: usize,
    now: Timestamp,
) -> Result<Turn, DomainError> {
    let form_id = match ctx.active_form.as_ref() {
        Some(instance) => instance.form_id.clone(),
        None => {
            return Err(DomainError::new(
                ErrorCode::FormNotActive,
                "No form is collecting answers",
            ))
        }
    };
    let definition = match config.form(&form_id) {
        Some(definition) => definition.clone(),
        None => {
            // The form was removed from configuration mid-dialogue.
            warn!(form = %form_id, "active form missing from configuration, abandoning");
            ctx.active_form = None;
            return Ok(route(
                RoutingMetadata::FreeText,
                ctx,
                config,
                resolver,
                selector,
                max_display,
            ));
        }
    };

    match engine.submit_field(&definition, ctx, raw, now)? {
        SubmitOutcome::Cancelled => {
            let mut turn = route(
                RoutingMetadata::FreeText,
                ctx,
                config,
                resolver,
                selector,
                max_display,
            );
            turn.form_status = Some(FormStatus::Cancelled);
            Ok(turn)
        }
        SubmitOutcome::Suspended { .. } => {
            // The utterance is routed as an ordinary free-text interaction.
            let mut turn = route(
                RoutingMetadata::FreeText,
                ctx,
                config,
                resolver,
                selector,
                max_display,
            );
            turn.form_status = Some(FormStatus::Suspended);
            Ok(turn)
        }
        SubmitOutcome::ValidationFailed {
            message,
            skip_offered,
            ..
        } => {
            let prompt = ctx
                .active_form
                .as_ref()
                .and_then(|instance| definition.field(instance.field_index))
                .map(FormPrompt::for_field);
            let message = if skip_offered {
                format!("{message} You can reply \"skip\" to move on.")
            } else {
                message
            };
            Ok(Turn {
                branch_id: None,
                ctas: Vec::new(),
                form_prompt: prompt,
                form_status: Some(FormStatus::Collecting),
                message: Some(message),
                completed: None,
            })
        }
        SubmitOutcome::ExitedIneligible { message } => {
            let mut turn = route(
                RoutingMetadata::FreeText,
                ctx,
                config,
                resolver,
                selector,
                max_display,
            );
            turn.form_status = Some(FormStatus::ExitedIneligible);
            turn.message = Some(message);
            Ok(turn)
        }
        SubmitOutcome::NextField(prompt) => Ok(Turn {
            branch_id: None,
            ctas: Vec::new(),
            form_prompt: Some(prompt),
            form_status: Some(FormStatus::Collecting),
            message: None,
            completed: None,
        }),
        SubmitOutcome::Completed(event) => {
            let mut turn = route(
                RoutingMetadata::FreeText,
                ctx,
                config,
                resolver,
                selector,
                max_display,
            );
            turn.form_status = Some(FormStatus::Completed);
            turn.completed = Some(event);
            Ok(turn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::StaticConfigView;
    use crate::adapters::fulfillment::RecordingDispatcher;
    use crate::adapters::storage::{InMemorySessionStore, UnavailableSessionStore};

    const CONFIG_YAML: &str = r#"
fallback_branch: navigation_hub
branches:
  - branch_id: navigation_hub
    available_ctas:
      primary: learn_more
  - branch_id: volunteer_interest
    available_ctas:
      primary: apply
      secondary: [learn_more]
ctas:
  - cta_id: apply
    label: Apply now
    action:
      kind: trigger_form
      form_id: lb_apply
  - cta_id: learn_more
    label: Learn more
    action:
      kind: send_query
      query: Tell me about volunteering
action_chips:
  - chip_id: chip_volunteer
    label: Volunteering
    value: I want to volunteer
    target_branch: volunteer_interest
forms:
  - form_id: lb_apply
    program_id: volunteer
    fields:
      - id: first_name
        type: text
        prompt: What is your first name?
        required: true
      - id: email
        type: email
        prompt: What is your email?
        required: true
"#;

    fn handler_with_store(store: Arc<dyn SessionStore>) -> InteractionHandler {
        let config: Arc<dyn ConfigView> =
            Arc::new(StaticConfigView::from_yaml(CONFIG_YAML).unwrap());
        InteractionHandler::new(
            config,
            store,
            Arc::new(RecordingDispatcher::new()),
            &EngineConfig::default(),
        )
    }

    fn handler() -> InteractionHandler {
        handler_with_store(Arc::new(InMemorySessionStore::new()))
    }

    fn event(kind: InteractionKind) -> InteractionEvent {
        InteractionEvent {
            session_id: SessionId::new("s1").unwrap(),
            kind,
        }
    }

    #[tokio::test]
    async fn chip_tap_routes_to_its_target_branch() {
        let handler = handler();

        let response = handler
            .handle(event(InteractionKind::ActionChip {
                chip_id: ChipId::new("chip_volunteer").unwrap(),
                target_branch: None,
            }))
            .await
            .unwrap();

        assert_eq!(
            response.branch_id.as_ref().map(|b| b.as_str()),
            Some("volunteer_interest")
        );
        let ids: Vec<&str> = response.ctas.iter().map(|p| p.cta.cta_id.as_str()).collect();
        assert_eq!(ids, vec!["apply", "learn_more"]);
        assert!(!response.degraded);
    }

    #[tokio::test]
    async fn trigger_form_cta_starts_the_form() {
        let handler = handler();

        let response = handler
            .handle(event(InteractionKind::Cta {
                cta_id: CtaId::new("apply").unwrap(),
                target_branch: None,
            }))
            .await
            .unwrap();

        assert_eq!(response.form_status, Some(FormStatus::Collecting));
        assert_eq!(
            response.form_prompt.as_ref().map(|p| p.field_id.as_str()),
            Some("first_name")
        );
    }

    #[tokio::test]
    async fn free_text_without_form_routes_to_fallback() {
        let handler = handler();

        let response = handler
            .handle(event(InteractionKind::FreeText {
                text: "hello there".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(
            response.branch_id.as_ref().map(|b| b.as_str()),
            Some("navigation_hub")
        );
        assert!(response.form_status.is_none());
    }

    #[tokio::test]
    async fn store_outage_degrades_to_fallback_only() {
        let handler = handler_with_store(Arc::new(UnavailableSessionStore::new()));

        let response = handler
            .handle(event(InteractionKind::FreeText {
                text: "hello".to_string(),
            }))
            .await
            .unwrap();

        assert!(response.degraded);
        assert_eq!(
            response.branch_id.as_ref().map(|b| b.as_str()),
            Some("navigation_hub")
        );
        assert!(response.form_prompt.is_none());
    }

    #[tokio::test]
    async fn form_field_without_active_form_routes_as_text() {
        let handler = handler();

        let response = handler
            .handle(event(InteractionKind::FormField {
                raw_value: "stray answer".to_string(),
            }))
            .await
            .unwrap();

        assert!(response.form_status.is_none());
        assert_eq!(
            response.branch_id.as_ref().map(|b| b.as_str()),
            Some("navigation_hub")
        );
    }
}
