//! Turning `validator` output into client-facing field errors.
//!
//! Two renderings are used by the API:
//! - a mapping `{"field": ["message", ...]}` ([`field_error_map`])
//! - a flat list `["field: message", ...]` ([`flatten_field_errors`])
//!
//! The map is keyed by field name; the flat list follows the field order
//! the caller declares.

use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Message attached to missing required fields.
pub const FIELD_REQUIRED: &str = "This field is required.";

/// Field name -> messages, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Collects the per-field messages of `errors`.
pub fn field_error_map(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| (field.to_string(), errs.iter().map(message_of).collect()))
        .collect()
}

/// Renders each message as `"field: message"`.
///
/// Fields named in `field_order` come first, in that order; any others
/// follow by name.
pub fn flatten_field_errors(errors: &FieldErrors, field_order: &[&str]) -> Vec<String> {
    let rank = |field: &str| {
        field_order
            .iter()
            .position(|f| *f == field)
            .unwrap_or(field_order.len())
    };
    let mut fields: Vec<(&String, &Vec<String>)> = errors.iter().collect();
    // stable sort keeps unlisted fields in name order
    fields.sort_by_key(|(field, _)| rank(field));

    fields
        .into_iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("{}: {}", field, message))
        })
        .collect()
}

pub fn single_field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    BTreeMap::from([(field.to_string(), vec![message.into()])])
}
