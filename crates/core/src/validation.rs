//! Field-level validation results.
//!
//! Rules are expressed either with the `validator` derive (static bounds) or
//! as plain functions (rules that depend on the clock or on derived values).
//! Both produce [`FieldViolation`]s, which callers surface as a structured
//! list instead of failing on the first problem.

use serde::Serialize;
use validator::ValidationErrors;

use crate::error::CoreError;

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// API-facing (camelCase) field name.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flatten `validator` errors into violations, sorted by field name so
/// responses are deterministic.
pub fn from_validator(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = snake_to_camel(&field.to_string());
            errs.iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldViolation::new(field.clone(), message)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

/// Turn a list of violations into `Ok(())` when empty, or a
/// [`CoreError::Validation`] otherwise.
pub fn ensure_valid(violations: Vec<FieldViolation>) -> Result<(), CoreError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(violations))
    }
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
