//! Data models for the catalog

pub mod author;
pub mod book;
pub mod enums;
pub mod user;

use std::borrow::Cow;

use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

// Re-export commonly used types
pub use author::{Author, AuthorPayload, AuthorSummary};
pub use book::{Book, BookPayload, BookSummary};
pub use enums::RecordState;
pub use user::User;

/// A denormalized copy of a related record, identified by the record's id
pub trait Embedded {
    fn id(&self) -> &str;
}

/// Replace the summary with the same id in place, or append it
pub fn upsert_summary<S: Embedded>(summaries: &mut Vec<S>, summary: S) {
    match summaries.iter_mut().find(|s| s.id() == summary.id()) {
        Some(slot) => *slot = summary,
        None => summaries.push(summary),
    }
}

/// Drop every summary with `id`; returns whether anything was removed
pub fn remove_summary<S: Embedded>(summaries: &mut Vec<S>, id: &str) -> bool {
    let before = summaries.len();
    summaries.retain(|s| s.id() != id);
    summaries.len() != before
}

/// Ids submitted for a relationship field, in submitted order.
///
/// Numbers are accepted as ids in their decimal form; anything else can never
/// resolve and is left out.
pub fn submitted_ids(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
    )
}

/// Body-carried `_id` as a lookup key; `None` when absent, `null` or empty.
///
/// Non-string ids are looked up by their JSON text and so never match.
pub fn submitted_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Whether a required value counts as missing: blank strings and empty arrays do
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Check a required text field, reporting blanks as `required` and non-strings as `not_text`
pub(crate) fn check_text(
    value: &Value,
    required: &'static str,
    not_text: &'static str,
) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(validation_error("required", required));
    }
    if value.is_string() {
        Ok(())
    } else {
        Err(validation_error("string", not_text))
    }
}

/// Text of a validated field
pub(crate) fn text_of(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Message of the first failing field, walking fields in declaration order
pub(crate) fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let by_field = errors.field_errors();

    field_order
        .iter()
        .find_map(|name| {
            by_field.iter().find_map(|(field, errs)| {
                let field: &str = field.as_ref();
                (field == *name).then(|| errs.first()).flatten()
            })
        })
        .or_else(|| by_field.values().find_map(|errs| errs.first()))
        .map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string())
        })
        .unwrap_or_else(|| errors.to_string())
}
