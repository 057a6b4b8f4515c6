//! Strongly-typed identifier value objects.
//!
//! Every identifier in this domain is opaque and externally assigned:
//! session ids come from the caller, everything else from the tenant
//! configuration document. They are modeled as validated string newtypes
//! rather than generated UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if empty.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Caller-assigned identifier for one widget session.
    SessionId,
    "session_id"
);

string_id!(
    /// Identifier of a conversation branch in the tenant configuration.
    BranchId,
    "branch_id"
);

string_id!(
    /// Identifier of a call-to-action definition.
    CtaId,
    "cta_id"
);

string_id!(
    /// Identifier of a suggestion chip.
    ChipId,
    "chip_id"
);

string_id!(
    /// Identifier of a form definition.
    FormId,
    "form_id"
);

string_id!(
    /// Identifier of the program (campaign/offering) a form belongs to.
    ///
    /// Completion is tracked at this granularity, never per form.
    ProgramId,
    "program_id"
);

string_id!(
    /// Identifier of a single field within a form definition.
    FieldId,
    "field_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_non_empty_string() {
        let id = SessionId::new("sess-123").unwrap();
        assert_eq!(id.as_str(), "sess-123");
    }

    #[test]
    fn session_id_rejects_empty_string() {
        let result = SessionId::new("");
        assert!(result.is_err());
        match result {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "session_id"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn branch_id_rejects_whitespace_only() {
        assert!(BranchId::new("   ").is_err());
    }

    #[test]
    fn program_id_displays_inner_value() {
        let id = ProgramId::new("volunteer").unwrap();
        assert_eq!(format!("{}", id), "volunteer");
    }

    #[test]
    fn cta_id_serializes_transparently() {
        let id = CtaId::new("apply").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"apply\"");
    }

    #[test]
    fn form_id_deserializes_from_plain_string() {
        let id: FormId = serde_json::from_str("\"lb_apply\"").unwrap();
        assert_eq!(id.as_str(), "lb_apply");
    }

    #[test]
    fn ids_of_same_value_are_equal() {
        assert_eq!(FieldId::new("zip").unwrap(), FieldId::new("zip").unwrap());
        assert_ne!(ChipId::new("a").unwrap(), ChipId::new("b").unwrap());
    }
}
