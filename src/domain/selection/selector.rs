//! CTA selection: gather, filter, de-duplicate, cap, tag.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::catalog::{ConfigView, CtaDefinition};
use crate::domain::foundation::BranchId;
use crate::domain::session::SessionContext;

/// Presentation role assigned to a CTA at selection time.
///
/// This tag, not any stored field, is authoritative for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaPosition {
    Primary,
    Secondary,
}

/// A CTA chosen for display, with its selection-time position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedCta {
    pub cta: CtaDefinition,
    pub position: CtaPosition,
}

/// Produces the final, position-tagged, de-duplicated, capped list of
/// actions to present for a resolved branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtaSelector;

impl CtaSelector {
    pub fn new() -> Self {
        Self
    }

    /// Selects the CTAs to display for `branch_id`.
    ///
    /// Order of operations:
    /// 1. gather the branch's CTAs, primary slot first
    /// 2. drop trigger-form CTAs whose program the session already completed
    /// 3. de-duplicate by cta id, keeping first occurrence
    /// 4. truncate to `max_display`; the primary survives truncation because
    ///    it is gathered first, so secondaries are always trimmed first
    /// 5. tag each survivor with its slot position
    pub fn select(
        &self,
        branch_id: &BranchId,
        config: &dyn ConfigView,
        ctx: &SessionContext,
        max_display: usize,
    ) -> Vec<PositionedCta> {
        let branch = match config.branch(branch_id) {
            Some(branch) => branch,
            None => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for (slot, cta_id) in branch.cta_ids().enumerate() {
            if selected.len() >= max_display {
                break;
            }
            let cta = match config.cta(cta_id) {
                Some(cta) => cta,
                // Dangling references were rejected at load time; a stale
                // snapshot still degrades to skipping the entry.
                None => continue,
            };
            if let Some(form_id) = cta.triggered_form() {
                if let Some(form) = config.form(form_id) {
                    if ctx.has_completed(&form.program_id) {
                        continue;
                    }
                }
            }
            if !seen.insert(cta_id.clone()) {
                continue;
            }
            let position = if slot == 0 {
                CtaPosition::Primary
            } else {
                CtaPosition::Secondary
            };
            selected.push(PositionedCta {
                cta: cta.clone(),
                position,
            });
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{
        ActionChip, AvailableCtas, ConversationBranch, CtaAction, FormDefinition,
    };
    use crate::domain::foundation::{ChipId, CtaId, FormId, ProgramId, SessionId};
    use std::collections::HashMap;

    struct FixtureConfig {
        branches: HashMap<BranchId, ConversationBranch>,
        ctas: HashMap<CtaId, CtaDefinition>,
        forms: HashMap<FormId, FormDefinition>,
    }

    impl ConfigView for FixtureConfig {
        fn branch(&self, branch_id: &BranchId) -> Option<&ConversationBranch> {
            self.branches.get(branch_id)
        }
        fn cta(&self, cta_id: &CtaId) -> Option<&CtaDefinition> {
            self.ctas.get(cta_id)
        }
        fn form(&self, form_id: &FormId) -> Option<&FormDefinition> {
            self.forms.get(form_id)
        }
        fn action_chip(&self, _: &ChipId) -> Option<&ActionChip> {
            None
        }
        fn fallback_branch(&self) -> Option<&BranchId> {
            None
        }
    }

    /// Branch "volunteer_interest" with primary "apply" (trigger-form for
    /// program "volunteer") and secondary ["learn_more", "requirements"].
    fn volunteer_fixture() -> FixtureConfig {
        let mut ctas = HashMap::new();
        ctas.insert(
            CtaId::new("apply").unwrap(),
            CtaDefinition {
                cta_id: CtaId::new("apply").unwrap(),
                label: "Apply now".to_string(),
                action: CtaAction::TriggerForm {
                    form_id: FormId::new("lb_apply").unwrap(),
                },
            },
        );
        for (id, label) in [("learn_more", "Learn more"), ("requirements", "Requirements")] {
            ctas.insert(
                CtaId::new(id).unwrap(),
                CtaDefinition {
                    cta_id: CtaId::new(id).unwrap(),
                    label: label.to_string(),
                    action: CtaAction::SendQuery {
                        query: label.to_string(),
                    },
                },
            );
        }

        let mut forms = HashMap::new();
        forms.insert(
            FormId::new("lb_apply").unwrap(),
            FormDefinition {
                form_id: FormId::new("lb_apply").unwrap(),
                program_id: ProgramId::new("volunteer").unwrap(),
                fields: vec![],
            },
        );

        let branch_id = BranchId::new("volunteer_interest").unwrap();
        let mut branches = HashMap::new();
        branches.insert(
            branch_id.clone(),
            ConversationBranch {
                branch_id,
                available_ctas: AvailableCtas {
                    primary: CtaId::new("apply").unwrap(),
                    secondary: vec![
                        CtaId::new("learn_more").unwrap(),
                        CtaId::new("requirements").unwrap(),
                    ],
                },
                legacy_keywords: vec![],
            },
        );

        FixtureConfig { branches, ctas, forms }
    }

    fn ctx() -> SessionContext {
        SessionContext::new(SessionId::new("s1").unwrap())
    }

    fn branch_id() -> BranchId {
        BranchId::new("volunteer_interest").unwrap()
    }

    #[test]
    fn selects_all_ctas_with_positions_when_nothing_completed() {
        // Scenario A.
        let config = volunteer_fixture();
        let selected = CtaSelector::new().select(&branch_id(), &config, &ctx(), 3);

        let ids: Vec<&str> = selected.iter().map(|p| p.cta.cta_id.as_str()).collect();
        let positions: Vec<CtaPosition> = selected.iter().map(|p| p.position).collect();

        assert_eq!(ids, vec!["apply", "learn_more", "requirements"]);
        assert_eq!(
            positions,
            vec![CtaPosition::Primary, CtaPosition::Secondary, CtaPosition::Secondary]
        );
    }

    #[test]
    fn drops_trigger_form_cta_for_completed_program() {
        // Scenario B.
        let config = volunteer_fixture();
        let mut ctx = ctx();
        ctx.record_completion(ProgramId::new("volunteer").unwrap());

        let selected = CtaSelector::new().select(&branch_id(), &config, &ctx, 3);

        let ids: Vec<&str> = selected.iter().map(|p| p.cta.cta_id.as_str()).collect();
        assert_eq!(ids, vec!["learn_more", "requirements"]);
    }

    #[test]
    fn de_duplicates_by_cta_id_keeping_first() {
        let mut config = volunteer_fixture();
        // Misconfigured branch repeating the primary in the secondary slot.
        config
            .branches
            .get_mut(&branch_id())
            .unwrap()
            .available_ctas
            .secondary
            .insert(0, CtaId::new("apply").unwrap());

        let selected = CtaSelector::new().select(&branch_id(), &config, &ctx(), 5);

        let ids: Vec<&str> = selected.iter().map(|p| p.cta.cta_id.as_str()).collect();
        assert_eq!(ids, vec!["apply", "learn_more", "requirements"]);
        assert_eq!(selected[0].position, CtaPosition::Primary);
    }

    #[test]
    fn truncates_secondaries_before_primary() {
        let config = volunteer_fixture();
        let selected = CtaSelector::new().select(&branch_id(), &config, &ctx(), 2);

        let ids: Vec<&str> = selected.iter().map(|p| p.cta.cta_id.as_str()).collect();
        assert_eq!(ids, vec!["apply", "learn_more"]);
        assert_eq!(selected[0].position, CtaPosition::Primary);
    }

    #[test]
    fn unknown_branch_selects_nothing() {
        let config = volunteer_fixture();
        let selected = CtaSelector::new().select(
            &BranchId::new("missing").unwrap(),
            &config,
            &ctx(),
            3,
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn dangling_cta_reference_is_skipped() {
        let mut config = volunteer_fixture();
        config.ctas.remove(&CtaId::new("learn_more").unwrap());

        let selected = CtaSelector::new().select(&branch_id(), &config, &ctx(), 3);

        let ids: Vec<&str> = selected.iter().map(|p| p.cta.cta_id.as_str()).collect();
        assert_eq!(ids, vec!["apply", "requirements"]);
    }
}
