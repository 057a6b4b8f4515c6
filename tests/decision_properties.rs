//! Property tests for the routing and selection invariants.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use dialog_core::domain::catalog::{
    ActionChip, AvailableCtas, ConfigView, ConversationBranch, CtaAction, CtaDefinition,
    FormDefinition,
};
use dialog_core::domain::foundation::{BranchId, ChipId, CtaId, FormId, SessionId};
use dialog_core::domain::routing::{RoutingMetadata, RoutingResolver};
use dialog_core::domain::selection::{CtaPosition, CtaSelector};
use dialog_core::domain::session::SessionContext;

#[derive(Default)]
struct MapConfig {
    branches: HashMap<BranchId, ConversationBranch>,
    ctas: HashMap<CtaId, CtaDefinition>,
    fallback: Option<BranchId>,
}

impl ConfigView for MapConfig {
    fn branch(&self, branch_id: &BranchId) -> Option<&ConversationBranch> {
        self.branches.get(branch_id)
    }
    fn cta(&self, cta_id: &CtaId) -> Option<&CtaDefinition> {
        self.ctas.get(cta_id)
    }
    fn form(&self, _: &FormId) -> Option<&FormDefinition> {
        None
    }
    fn action_chip(&self, _: &ChipId) -> Option<&ActionChip> {
        None
    }
    fn fallback_branch(&self) -> Option<&BranchId> {
        self.fallback.as_ref()
    }
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

fn branch_with_ctas(id: &BranchId, cta_ids: &[CtaId]) -> ConversationBranch {
    ConversationBranch {
        branch_id: id.clone(),
        available_ctas: AvailableCtas {
            primary: cta_ids[0].clone(),
            secondary: cta_ids[1..].to_vec(),
        },
        legacy_keywords: vec![],
    }
}

fn send_query_cta(id: &CtaId) -> CtaDefinition {
    CtaDefinition {
        cta_id: id.clone(),
        label: id.as_str().to_string(),
        action: CtaAction::SendQuery {
            query: id.as_str().to_string(),
        },
    }
}

proptest! {
    /// A valid tier-1 target always wins, whatever tier 2 and 3 hold.
    #[test]
    fn tier_1_always_outranks_lower_tiers(
        chip_target in id_strategy(),
        fallback in id_strategy(),
    ) {
        let placeholder = CtaId::new("ask").unwrap();
        let mut config = MapConfig::default();
        config.ctas.insert(placeholder.clone(), send_query_cta(&placeholder));
        for raw in [&chip_target, &fallback] {
            let branch_id = BranchId::new(raw.clone()).unwrap();
            config.branches.insert(
                branch_id.clone(),
                branch_with_ctas(&branch_id, &[placeholder.clone()]),
            );
        }
        let fallback_id = BranchId::new(fallback).unwrap();
        config.fallback = Some(fallback_id.clone());

        let metadata = RoutingMetadata::ActionChip {
            source_id: ChipId::new("chip").unwrap(),
            target_branch: Some(BranchId::new(chip_target.clone()).unwrap()),
        };
        let resolved = RoutingResolver::new().resolve(&metadata, &config, Some(&fallback_id));

        prop_assert_eq!(resolved, Some(BranchId::new(chip_target).unwrap()));
    }

    /// Selection never yields duplicate CTA ids, keeps the primary through
    /// truncation, and tags exactly the first slot as primary.
    #[test]
    fn selection_is_deduplicated_capped_and_primary_first(
        cta_names in proptest::collection::vec(id_strategy(), 1..8),
        max_display in 1usize..6,
    ) {
        let mut config = MapConfig::default();
        let cta_ids: Vec<CtaId> = cta_names
            .iter()
            .map(|raw| CtaId::new(raw.clone()).unwrap())
            .collect();
        for cta_id in &cta_ids {
            config.ctas.insert(cta_id.clone(), send_query_cta(cta_id));
        }
        let branch_id = BranchId::new("any_branch").unwrap();
        config
            .branches
            .insert(branch_id.clone(), branch_with_ctas(&branch_id, &cta_ids));

        let ctx = SessionContext::new(SessionId::new("s1").unwrap());
        let selected = CtaSelector::new().select(&branch_id, &config, &ctx, max_display);

        let mut seen = HashSet::new();
        for positioned in &selected {
            prop_assert!(seen.insert(positioned.cta.cta_id.clone()), "duplicate cta id");
        }
        prop_assert!(selected.len() <= max_display);
        prop_assert!(!selected.is_empty());
        prop_assert_eq!(selected[0].cta.cta_id.clone(), cta_ids[0].clone());
        prop_assert_eq!(selected[0].position, CtaPosition::Primary);
        for positioned in &selected[1..] {
            prop_assert_eq!(positioned.position, CtaPosition::Secondary);
        }
    }
}
