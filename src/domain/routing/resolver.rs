//! Three-tier branch resolution.

use tracing::debug;

use crate::domain::catalog::ConfigView;
use crate::domain::foundation::BranchId;

use super::RoutingMetadata;

/// Deterministic, priority-ordered branch resolver.
///
/// Strict priority, first match wins:
/// 1. Tier 1 - an action chip's explicit target branch
/// 2. Tier 2 - a CTA's explicit target branch
/// 3. Tier 3 - the tenant's fallback branch
///
/// A target that references a branch missing from the configuration is
/// treated as absent at that tier and falls through; a single bad reference
/// never blocks the fallback. `None` is a valid terminal meaning "present
/// no follow-up actions", not a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingResolver;

impl RoutingResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the interaction to a branch, or `None` if no tier matches.
    pub fn resolve(
        &self,
        metadata: &RoutingMetadata,
        config: &dyn ConfigView,
        fallback_branch: Option<&BranchId>,
    ) -> Option<BranchId> {
        // Tier 1: explicit chip target.
        if let RoutingMetadata::ActionChip { target_branch: Some(target), source_id } = metadata {
            if config.branch(target).is_some() {
                debug!(chip = %source_id, branch = %target, tier = 1, "routing resolved");
                return Some(target.clone());
            }
            debug!(chip = %source_id, branch = %target, "tier 1 target missing, falling through");
        }

        // Tier 2: explicit CTA target.
        if let RoutingMetadata::Cta { target_branch: Some(target), source_id } = metadata {
            if config.branch(target).is_some() {
                debug!(cta = %source_id, branch = %target, tier = 2, "routing resolved");
                return Some(target.clone());
            }
            debug!(cta = %source_id, branch = %target, "tier 2 target missing, falling through");
        }

        // Tier 3: fallback.
        if let Some(fallback) = fallback_branch {
            if config.branch(fallback).is_some() {
                debug!(branch = %fallback, tier = 3, "routing resolved");
                return Some(fallback.clone());
            }
            debug!(branch = %fallback, "fallback branch missing from configuration");
        }

        None
    }
}
