//! Read contract over the tenant's static configuration.

use crate::domain::foundation::{BranchId, ChipId, CtaId, FormId};

use super::{ActionChip, ConversationBranch, CtaDefinition, FormDefinition};

/// Read-only, cached snapshot of a tenant's static configuration.
///
/// Implementations validate at load time that every branch/form reference
/// resolves and that every referenced branch has a non-empty primary CTA
/// slot. The core assumes this has already happened and degrades gracefully
/// (falling through routing tiers) if it has not. Lookups never block on
/// I/O.
pub trait ConfigView: Send + Sync {
    /// Looks up a conversation branch.
    fn branch(&self, branch_id: &BranchId) -> Option<&ConversationBranch>;

    /// Looks up a call-to-action definition.
    fn cta(&self, cta_id: &CtaId) -> Option<&CtaDefinition>;

    /// Looks up a form definition.
    fn form(&self, form_id: &FormId) -> Option<&FormDefinition>;

    /// Looks up a suggestion chip.
    fn action_chip(&self, chip_id: &ChipId) -> Option<&ActionChip>;

    /// Returns the tenant's configured fallback branch, if any.
    fn fallback_branch(&self) -> Option<&BranchId>;
}
