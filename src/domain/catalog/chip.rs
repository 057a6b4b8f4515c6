//! Suggestion chip schema.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BranchId, ChipId};

/// A suggestion chip rendered alongside the composer.
///
/// Clicking a chip sends `value` as the interaction text; if `target_branch`
/// is set, the click carries an explicit Tier-1 routing hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChip {
    pub chip_id: ChipId,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub target_branch: Option<BranchId>,
}
