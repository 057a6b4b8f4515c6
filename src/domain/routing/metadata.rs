//! Routing metadata attached to one interaction.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BranchId, ChipId, CtaId};

/// How an interaction arrived and what explicit routing hints it carries.
///
/// Chip clicks and CTA clicks may carry an explicit target branch; free
/// text never does and always falls to the fallback tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingMetadata {
    ActionChip {
        source_id: ChipId,
        target_branch: Option<BranchId>,
    },
    Cta {
        source_id: CtaId,
        target_branch: Option<BranchId>,
    },
    FreeText,
}

impl RoutingMetadata {
    /// Returns the explicit target branch hint, if this interaction has one.
    pub fn target_branch(&self) -> Option<&BranchId> {
        match self {
            RoutingMetadata::ActionChip { target_branch, .. }
            | RoutingMetadata::Cta { target_branch, .. } => target_branch.as_ref(),
            RoutingMetadata::FreeText => None,
        }
    }
}
