//! Conversation branch schema.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BranchId, CtaId};

/// The follow-up actions a branch offers, primary slot first.
///
/// A branch with no primary CTA is invalid configuration and is rejected
/// at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableCtas {
    pub primary: CtaId,
    #[serde(default)]
    pub secondary: Vec<CtaId>,
}

/// A named bundle of follow-up actions associated with a conversation topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationBranch {
    pub branch_id: BranchId,
    pub available_ctas: AvailableCtas,

    /// Legacy keyword-based activation patterns.
    ///
    /// Historically these guessed a branch from free text. They are kept in
    /// the schema so existing tenant documents keep parsing, but routing
    /// never consults them: branch resolution is limited to the three
    /// explicit tiers.
    #[serde(default)]
    pub legacy_keywords: Vec<String>,
}

impl ConversationBranch {
    /// Returns the branch's CTA ids in presentation order, primary first.
    pub fn cta_ids(&self) -> impl Iterator<Item = &CtaId> {
        std::iter::once(&self.available_ctas.primary).chain(self.available_ctas.secondary.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch() -> ConversationBranch {
        ConversationBranch {
            branch_id: BranchId::new("volunteer_interest").unwrap(),
            available_ctas: AvailableCtas {
                primary: CtaId::new("apply").unwrap(),
                secondary: vec![
                    CtaId::new("learn_more").unwrap(),
                    CtaId::new("requirements").unwrap(),
                ],
            },
            legacy_keywords: vec!["volunteer".to_string()],
        }
    }

    #[test]
    fn cta_ids_yields_primary_first() {
        let branch = branch();
        let ids: Vec<&str> = branch.cta_ids().map(|c| c.as_str()).collect();
        assert_eq!(ids, vec!["apply", "learn_more", "requirements"]);
    }

    #[test]
    fn legacy_keywords_default_to_empty_on_deserialize() {
        let json = r#"{
            "branch_id": "hub",
            "available_ctas": { "primary": "ask" }
        }"#;
        let branch: ConversationBranch = serde_json::from_str(json).unwrap();
        assert!(branch.legacy_keywords.is_empty());
        assert!(branch.available_ctas.secondary.is_empty());
    }

    #[test]
    fn legacy_keywords_round_trip_through_serde() {
        let original = branch();
        let json = serde_json::to_string(&original).unwrap();
        let back: ConversationBranch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
