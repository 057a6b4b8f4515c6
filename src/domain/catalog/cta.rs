//! Call-to-action definitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CtaId, FormId};

/// What pressing a CTA does.
///
/// Styling is never stored on the definition; the presentation role
/// (primary/secondary) is assigned at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CtaAction {
    /// Start (or resume) the multi-step form dialogue for `form_id`.
    TriggerForm { form_id: FormId },
    /// Open an external link.
    OpenLink { url: String },
    /// Send a canned query as if the user had typed it.
    SendQuery { query: String },
    /// Request additional information on a topic.
    RequestInfo { topic: String },
}

/// A call-to-action as published in the tenant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaDefinition {
    pub cta_id: CtaId,
    pub label: String,
    pub action: CtaAction,
}

impl CtaDefinition {
    /// Returns the target form if this CTA triggers a form, else None.
    pub fn triggered_form(&self) -> Option<&FormId> {
        match &self.action {
            CtaAction::TriggerForm { form_id } => Some(form_id),
            _ => None,
        }
    }
}
