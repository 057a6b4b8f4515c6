//! Static, validated configuration snapshot.
//!
//! Loads a tenant's configuration document (YAML or JSON), checks its
//! reference integrity once, and serves lookups from indexed maps. The
//! runtime components assume these checks happened and only have to
//! tolerate the stale-snapshot case, where a branch referenced by live
//! metadata has since been removed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::catalog::{
    ActionChip, ConfigView, ConversationBranch, CtaDefinition, FieldType, FormDefinition,
};
use crate::domain::foundation::{BranchId, ChipId, CtaId, FormId};

/// Errors detected while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration parse failed: {0}")]
    Parse(String),

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("branch '{branch}' references undefined CTA '{cta}'")]
    UnknownCta { branch: String, cta: String },

    #[error("CTA '{cta}' triggers undefined form '{form}'")]
    UnknownForm { cta: String, form: String },

    #[error("action chip '{chip}' targets undefined branch '{branch}'")]
    UnknownChipTarget { chip: String, branch: String },

    #[error("fallback branch '{0}' is not defined")]
    UnknownFallbackBranch(String),

    #[error("form '{form}' field '{field}': {reason}")]
    InvalidField {
        form: String,
        field: String,
        reason: String,
    },
}

/// The tenant configuration document as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub branches: Vec<ConversationBranch>,
    #[serde(default)]
    pub ctas: Vec<CtaDefinition>,
    #[serde(default)]
    pub action_chips: Vec<ActionChip>,
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
    #[serde(default)]
    pub fallback_branch: Option<BranchId>,
}

/// Indexed, validated, read-only configuration snapshot.
#[derive(Debug, Clone)]
pub struct StaticConfigView {
    branches: HashMap<BranchId, ConversationBranch>,
    ctas: HashMap<CtaId, CtaDefinition>,
    action_chips: HashMap<ChipId, ActionChip>,
    forms: HashMap<FormId, FormDefinition>,
    fallback_branch: Option<BranchId>,
}

impl StaticConfigView {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Indexes and validates an already-parsed document.
    pub fn from_document(doc: ConfigDocument) -> Result<Self, ConfigError> {
        let mut ctas = HashMap::new();
        for cta in doc.ctas {
            if ctas.insert(cta.cta_id.clone(), cta.clone()).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "CTA",
                    id: cta.cta_id.to_string(),
                });
            }
        }

        let mut forms = HashMap::new();
        for form in doc.forms {
            validate_form(&form)?;
            if forms.insert(form.form_id.clone(), form.clone()).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "form",
                    id: form.form_id.to_string(),
                });
            }
        }

        let mut branches = HashMap::new();
        for branch in doc.branches {
            for cta_id in branch.cta_ids() {
                if !ctas.contains_key(cta_id) {
                    return Err(ConfigError::UnknownCta {
                        branch: branch.branch_id.to_string(),
                        cta: cta_id.to_string(),
                    });
                }
            }
            if branches
                .insert(branch.branch_id.clone(), branch.clone())
                .is_some()
            {
                return Err(ConfigError::DuplicateId {
                    kind: "branch",
                    id: branch.branch_id.to_string(),
                });
            }
        }

        for cta in ctas.values() {
            if let Some(form_id) = cta.triggered_form() {
                if !forms.contains_key(form_id) {
                    return Err(ConfigError::UnknownForm {
                        cta: cta.cta_id.to_string(),
                        form: form_id.to_string(),
                    });
                }
            }
        }

        let mut action_chips = HashMap::new();
        for chip in doc.action_chips {
            if let Some(target) = &chip.target_branch {
                if !branches.contains_key(target) {
                    return Err(ConfigError::UnknownChipTarget {
                        chip: chip.chip_id.to_string(),
                        branch: target.to_string(),
                    });
                }
            }
            if action_chips
                .insert(chip.chip_id.clone(), chip.clone())
                .is_some()
            {
                return Err(ConfigError::DuplicateId {
                    kind: "action chip",
                    id: chip.chip_id.to_string(),
                });
            }
        }

        if let Some(fallback) = &doc.fallback_branch {
            if !branches.contains_key(fallback) {
                return Err(ConfigError::UnknownFallbackBranch(fallback.to_string()));
            }
        }

        Ok(Self {
            branches,
            ctas,
            action_chips,
            forms,
            fallback_branch: doc.fallback_branch,
        })
    }
}

fn validate_form(form: &FormDefinition) -> Result<(), ConfigError> {
    let invalid = |field: &str, reason: &str| ConfigError::InvalidField {
        form: form.form_id.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if form.fields.is_empty() {
        return Err(invalid("", "form has no fields"));
    }

    let mut seen = HashMap::new();
    for field in &form.fields {
        if seen.insert(field.id.clone(), ()).is_some() {
            return Err(invalid(field.id.as_str(), "duplicate field id"));
        }
        if field.field_type == FieldType::Select && field.options.is_empty() {
            return Err(invalid(field.id.as_str(), "select field has no options"));
        }
        if field.eligibility_gate && field.failure_message.is_none() {
            return Err(invalid(
                field.id.as_str(),
                "eligibility gate has no failure message",
            ));
        }
    }
    Ok(())
}

impl ConfigView for StaticConfigView {
    fn branch(&self, branch_id: &BranchId) -> Option<&ConversationBranch> {
        self.branches.get(branch_id)
    }

    fn cta(&self, cta_id: &CtaId) -> Option<&CtaDefinition> {
        self.ctas.get(cta_id)
    }

    fn form(&self, form_id: &FormId) -> Option<&FormDefinition> {
        self.forms.get(form_id)
    }

    fn action_chip(&self, chip_id: &ChipId) -> Option<&ActionChip> {
        self.action_chips.get(chip_id)
    }

    fn fallback_branch(&self) -> Option<&BranchId> {
        self.fallback_branch.as_ref()
    }
}
