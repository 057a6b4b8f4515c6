//! Form definition schema.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FieldId, FormId, ProgramId};

/// Declared type of a form field's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Number,
    Date,
    Select,
    /// A group of named sub-fields collected as a single step.
    Composite(CompositeKind),
}

impl FieldType {
    /// Returns true if answers to this field arrive as typed free text.
    ///
    /// Interruption classification only runs on text-bearing fields; a
    /// select answer is a picked option and is never reinterpreted.
    pub fn is_text_bearing(&self) -> bool {
        !matches!(self, FieldType::Select)
    }
}

/// The composite field groups the widget knows how to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    /// Expands to {first, middle, last}.
    FullName,
    /// Expands to {street, unit, city, state, zip}.
    PostalAddress,
}

/// Validation rule applied to one sub-field of a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFieldRule {
    Text,
    StateCode,
    Zip,
}

/// Static description of one sub-field within a composite group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubFieldSpec {
    pub key: &'static str,
    pub required: bool,
    pub rule: SubFieldRule,
}

impl CompositeKind {
    /// Returns the ordered sub-fields this composite expands into.
    pub fn sub_fields(&self) -> &'static [SubFieldSpec] {
        match self {
            CompositeKind::FullName => &[
                SubFieldSpec { key: "first", required: true, rule: SubFieldRule::Text },
                SubFieldSpec { key: "middle", required: false, rule: SubFieldRule::Text },
                SubFieldSpec { key: "last", required: true, rule: SubFieldRule::Text },
            ],
            CompositeKind::PostalAddress => &[
                SubFieldSpec { key: "street", required: true, rule: SubFieldRule::Text },
                SubFieldSpec { key: "unit", required: false, rule: SubFieldRule::Text },
                SubFieldSpec { key: "city", required: true, rule: SubFieldRule::Text },
                SubFieldSpec { key: "state", required: true, rule: SubFieldRule::StateCode },
                SubFieldSpec { key: "zip", required: true, rule: SubFieldRule::Zip },
            ],
        }
    }
}

/// One field within a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: FieldId,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Text shown to the user when this field is prompted.
    pub prompt: String,

    #[serde(default)]
    pub required: bool,

    /// Declared option values for select fields (matched case-sensitively).
    #[serde(default)]
    pub options: Vec<String>,

    /// If true, a negative answer ends the dialogue without completion.
    #[serde(default)]
    pub eligibility_gate: bool,

    /// Shown verbatim on an eligibility exit. Required when `eligibility_gate`.
    #[serde(default)]
    pub failure_message: Option<String>,

    /// If true, the validated answer is written to the session's program
    /// interest as soon as this field is collected, so a later resume
    /// prompt can name the program.
    #[serde(default)]
    pub sets_program_interest: bool,
}

/// An ordered, immutable multi-step form, sourced from the tenant config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub form_id: FormId,
    pub program_id: ProgramId,
    pub fields: Vec<FormField>,
}

impl FormDefinition {
    /// Returns the field at `index`, if the form has one.
    pub fn field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    /// Number of steps in the form. Composite fields count as one step.
    pub fn step_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if `index` addresses the last field.
    pub fn is_last_field(&self, index: usize) -> bool {
        index + 1 == self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field(id: &str) -> FormField {
        FormField {
            id: FieldId::new(id).unwrap(),
            field_type: FieldType::Text,
            prompt: format!("Enter {}", id),
            required: true,
            options: vec![],
            eligibility_gate: false,
            failure_message: None,
            sets_program_interest: false,
        }
    }

    #[test]
    fn composite_counts_as_one_step() {
        let form = FormDefinition {
            form_id: FormId::new("lb_apply").unwrap(),
            program_id: ProgramId::new("volunteer").unwrap(),
            fields: vec![
                FormField {
                    field_type: FieldType::Composite(CompositeKind::PostalAddress),
                    ..text_field("address")
                },
                text_field("email"),
            ],
        };
        assert_eq!(form.step_count(), 2);
        assert!(form.is_last_field(1));
        assert!(!form.is_last_field(0));
    }

    #[test]
    fn full_name_expands_to_three_sub_fields() {
        let subs = CompositeKind::FullName.sub_fields();
        let keys: Vec<&str> = subs.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["first", "middle", "last"]);
        assert!(!subs[1].required, "middle name is optional");
    }

    #[test]
    fn postal_address_zip_uses_zip_rule() {
        let subs = CompositeKind::PostalAddress.sub_fields();
        let zip = subs.iter().find(|s| s.key == "zip").unwrap();
        assert_eq!(zip.rule, SubFieldRule::Zip);
        assert!(zip.required);
    }

    #[test]
    fn select_is_not_text_bearing() {
        assert!(!FieldType::Select.is_text_bearing());
        assert!(FieldType::Email.is_text_bearing());
        assert!(FieldType::Composite(CompositeKind::FullName).is_text_bearing());
    }

    #[test]
    fn field_type_deserializes_from_snake_case() {
        let ty: FieldType = serde_json::from_str("\"textarea\"").unwrap();
        assert_eq!(ty, FieldType::Textarea);
    }

    #[test]
    fn composite_field_type_round_trips() {
        let ty = FieldType::Composite(CompositeKind::PostalAddress);
        let json = serde_json::to_string(&ty).unwrap();
        let back: FieldType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
