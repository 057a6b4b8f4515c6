//! Pure field-answer validation.
//!
//! Validates a single field's raw answer against its declared type and
//! constraints, and expands composite field types into a confirmation
//! string plus structured sub-values.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::catalog::{CompositeKind, FieldType, FormField, SubFieldRule, SubFieldSpec};
use crate::domain::foundation::ValidationError;

/// Maximum length for single-line text answers.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Maximum length for multi-line textarea answers.
pub const MAX_TEXTAREA_LENGTH: usize = 5_000;

/// A successfully validated answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedValue {
    /// A single normalized value.
    Scalar(String),
    /// A composite answer expanded into a confirmation string plus its
    /// structured sub-values, keyed by sub-field name.
    Composite {
        confirmation: String,
        sub_values: BTreeMap<String, String>,
    },
}

/// Validates `raw` against the field's declared type and constraints.
pub fn validate_field(field: &FormField, raw: &str) -> Result<ValidatedValue, ValidationError> {
    let trimmed = raw.trim();
    let name = field.id.as_str();

    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(name));
    }

    match &field.field_type {
        FieldType::Text => {
            check_length(name, trimmed, MAX_TEXT_LENGTH)?;
            Ok(ValidatedValue::Scalar(trimmed.to_string()))
        }
        FieldType::Textarea => {
            check_length(name, trimmed, MAX_TEXTAREA_LENGTH)?;
            Ok(ValidatedValue::Scalar(trimmed.to_string()))
        }
        FieldType::Email => validate_email(name, trimmed),
        FieldType::Phone => validate_phone(name, trimmed),
        FieldType::Number => validate_number(name, trimmed),
        FieldType::Date => validate_date(name, trimmed),
        FieldType::Select => validate_select(name, trimmed, &field.options),
        FieldType::Composite(kind) => validate_composite(name, trimmed, *kind),
    }
}

/// Returns true if a normalized answer should be read as negative.
///
/// Used by the engine to evaluate eligibility gates.
pub fn is_negative_answer(raw: &str) -> bool {
    let normalized = raw.trim().to_lowercase();
    matches!(
        normalized.as_str(),
        "no" | "n" | "nope" | "nah" | "never" | "no thanks" | "not yet" | "false"
    ) || normalized.starts_with("no ")
        || normalized.starts_with("no,")
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::too_long(field, max, value.chars().count()));
    }
    Ok(())
}

fn validate_email(field: &str, value: &str) -> Result<ValidatedValue, ValidationError> {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    let local_ok = !local.is_empty() && !local.contains(char::is_whitespace);
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains(char::is_whitespace)
        && domain.len() >= 3;

    if !local_ok || !domain_ok || value.matches('@').count() != 1 {
        return Err(ValidationError::invalid_format(
            field,
            "expected an address like name@example.org",
        ));
    }
    Ok(ValidatedValue::Scalar(value.to_string()))
}

fn validate_phone(field: &str, value: &str) -> Result<ValidatedValue, ValidationError> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return Err(ValidationError::invalid_format(
            field,
            "expected at least 10 digits",
        ));
    }
    Ok(ValidatedValue::Scalar(digits))
}

fn validate_number(field: &str, value: &str) -> Result<ValidatedValue, ValidationError> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(ValidatedValue::Scalar(value.to_string())),
        _ => Err(ValidationError::invalid_format(field, "expected a number")),
    }
}

fn validate_date(field: &str, value: &str) -> Result<ValidatedValue, ValidationError> {
    // ISO first, then US month/day/year.
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"));
    match parsed {
        Ok(date) => Ok(ValidatedValue::Scalar(date.format("%Y-%m-%d").to_string())),
        Err(_) => Err(ValidationError::invalid_format(
            field,
            "expected a date like 2026-08-24 or 8/24/2026",
        )),
    }
}

fn validate_select(
    field: &str,
    value: &str,
    options: &[String],
) -> Result<ValidatedValue, ValidationError> {
    // Option values are matched case-sensitively.
    if options.iter().any(|option| option == value) {
        Ok(ValidatedValue::Scalar(value.to_string()))
    } else {
        Err(ValidationError::not_an_option(field, value))
    }
}

fn validate_composite(
    field: &str,
    value: &str,
    kind: CompositeKind,
) -> Result<ValidatedValue, ValidationError> {
    let specs = kind.sub_fields();
    let parts = split_composite(field, value, kind, specs)?;

    let mut sub_values = BTreeMap::new();
    let mut confirmation_parts = Vec::new();
    for (spec, part) in specs.iter().zip(parts.iter()) {
        let part = part.trim();
        if part.is_empty() {
            if spec.required {
                return Err(ValidationError::empty_field(format!("{}.{}", field, spec.key)));
            }
            continue;
        }
        validate_sub_field(field, spec, part)?;
        sub_values.insert(spec.key.to_string(), part.to_string());
        confirmation_parts.push(part.to_string());
    }

    let confirmation = match kind {
        CompositeKind::FullName => confirmation_parts.join(" "),
        CompositeKind::PostalAddress => confirmation_parts.join(", "),
    };

    Ok(ValidatedValue::Composite {
        confirmation,
        sub_values,
    })
}

/// Splits a raw composite answer into slots aligned with `specs`.
///
/// Full names split on whitespace (two tokens mean no middle name);
/// addresses split on commas (four segments mean no unit).
fn split_composite(
    field: &str,
    value: &str,
    kind: CompositeKind,
    specs: &'static [SubFieldSpec],
) -> Result<Vec<String>, ValidationError> {
    match kind {
        CompositeKind::FullName => {
            let tokens: Vec<&str> = value.split_whitespace().collect();
            match tokens.len() {
                2 => Ok(vec![tokens[0].to_string(), String::new(), tokens[1].to_string()]),
                3 => Ok(tokens.iter().map(|t| t.to_string()).collect()),
                n if n > 3 => Ok(vec![
                    tokens[0].to_string(),
                    tokens[1..n - 1].join(" "),
                    tokens[n - 1].to_string(),
                ]),
                _ => Err(ValidationError::invalid_format(
                    field,
                    "expected at least a first and last name",
                )),
            }
        }
        CompositeKind::PostalAddress => {
            let segments: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
            match segments.len() {
                4 => Ok(vec![
                    segments[0].clone(),
                    String::new(),
                    segments[1].clone(),
                    segments[2].clone(),
                    segments[3].clone(),
                ]),
                n if n == specs.len() => Ok(segments),
                _ => Err(ValidationError::invalid_format(
                    field,
                    "expected street, [unit,] city, state, zip separated by commas",
                )),
            }
        }
    }
}

fn validate_sub_field(
    field: &str,
    spec: &SubFieldSpec,
    value: &str,
) -> Result<(), ValidationError> {
    let name = format!("{}.{}", field, spec.key);
    match spec.rule {
        SubFieldRule::Text => check_length(&name, value, MAX_TEXT_LENGTH),
        SubFieldRule::StateCode => {
            if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
                Ok(())
            } else {
                Err(ValidationError::invalid_format(
                    name,
                    "expected a two-letter state code",
                ))
            }
        }
        SubFieldRule::Zip => {
            let valid = match value.split_once('-') {
                Some((five, four)) => is_digits(five, 5) && is_digits(four, 4),
                None => is_digits(value, 5),
            };
            if valid {
                Ok(())
            } else {
                Err(ValidationError::invalid_format(
                    name,
                    "expected a 5-digit or 5+4 zip code",
                ))
            }
        }
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}
