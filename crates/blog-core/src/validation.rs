//! Write-payload validation.
//!
//! Inbound JSON objects are read field by field; every problem is recorded
//! against the field it belongs to so a single response can report all of
//! them at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NULL: &str = "This field may not be null.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set with a single message for one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// How strictly a payload is checked against the writable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New record: every writable field is required.
    Create,
    /// Full update (PUT): every writable field is required.
    Replace,
    /// Partial update (PATCH): only the fields present are validated.
    Partial,
}

impl WriteMode {
    pub fn requires_all(self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

pub fn incorrect_pk_type_message(value: &Value) -> String {
    format!(
        "Incorrect type. Expected pk value, received {}.",
        json_kind(value)
    )
}

pub fn missing_object_message(pk: i64) -> String {
    format!("Invalid pk \"{pk}\" - object does not exist.")
}

/// JSON type name used in validation messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read-only view over an inbound JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    mode: WriteMode,
}

impl<'a> Payload<'a> {
    /// Accepts only JSON objects.
    pub fn new(value: &'a Value, mode: WriteMode) -> Result<Self, FieldErrors> {
        match value {
            Value::Object(fields) => Ok(Self { fields, mode }),
            other => Err(FieldErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(other)
                ),
            )),
        }
    }

    /// Looks up a field, recording `required`/`null` errors as needed.
    fn present(&self, field: &str, errors: &mut FieldErrors) -> Option<&'a Value> {
        match self.fields.get(field) {
            None => {
                if self.mode.requires_all() {
                    errors.add(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                errors.add(field, NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Reads a non-blank string field. Surrounding whitespace is trimmed and
    /// numbers are accepted in their textual form.
    pub fn string(
        &self,
        field: &str,
        max_length: Option<usize>,
        errors: &mut FieldErrors,
    ) -> Option<String> {
        let raw = match self.present(field, errors)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                errors.add(field, INVALID_STRING);
                return None;
            }
        };

        if raw.is_empty() {
            errors.add(field, BLANK);
            return None;
        }

        if let Some(max) = max_length {
            if raw.chars().count() > max {
                errors.add(field, max_length_message(max));
                return None;
            }
        }

        Some(raw)
    }

    /// Reads a primary-key reference. `exists` decides whether the referenced
    /// row is present.
    pub fn primary_key(
        &self,
        field: &str,
        exists: impl Fn(i64) -> bool,
        errors: &mut FieldErrors,
    ) -> Option<i64> {
        let value = self.present(field, errors)?;
        let Some(pk) = coerce_pk(value) else {
            errors.add(field, incorrect_pk_type_message(value));
            return None;
        };

        if !exists(pk) {
            errors.add(field, missing_object_message(pk));
            return None;
        }

        Some(pk)
    }
}

/// Primary key referenced by `field`, if the payload carries a usable one.
///
/// Lets callers look the row up before running the full validation.
pub fn referenced_pk(value: &Value, field: &str) -> Option<i64> {
    value.as_object()?.get(field).and_then(coerce_pk)
}

fn coerce_pk(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payloads() {
        let value = json!(["title"]);
        let errors = Payload::new(&value, WriteMode::Create).unwrap_err();
        assert_eq!(
            errors.get(NON_FIELD_ERRORS).unwrap(),
            ["Invalid data. Expected a dictionary, but got array."]
        );
    }

    #[test]
    fn missing_field_is_required_only_outside_partial_mode() {
        let value = json!({});
        let mut errors = FieldErrors::new();

        let payload = Payload::new(&value, WriteMode::Create).unwrap();
        assert_eq!(payload.string("title", Some(200), &mut errors), None);
        assert_eq!(errors.get("title").unwrap(), [REQUIRED]);

        let mut errors = FieldErrors::new();
        let payload = Payload::new(&value, WriteMode::Partial).unwrap();
        assert_eq!(payload.string("title", Some(200), &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn string_checks_null_blank_type_and_length() {
        let value = json!({
            "a": null,
            "b": "   ",
            "c": true,
            "d": "x".repeat(11),
            "e": 42,
            "f": "  padded  ",
        });
        let payload = Payload::new(&value, WriteMode::Partial).unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(payload.string("a", None, &mut errors), None);
        assert_eq!(payload.string("b", None, &mut errors), None);
        assert_eq!(payload.string("c", None, &mut errors), None);
        assert_eq!(payload.string("d", Some(10), &mut errors), None);
        assert_eq!(payload.string("e", None, &mut errors).as_deref(), Some("42"));
        assert_eq!(
            payload.string("f", Some(6), &mut errors).as_deref(),
            Some("padded")
        );

        assert_eq!(errors.get("a").unwrap(), [NULL]);
        assert_eq!(errors.get("b").unwrap(), [BLANK]);
        assert_eq!(errors.get("c").unwrap(), [INVALID_STRING]);
        assert_eq!(errors.get("d").unwrap(), [max_length_message(10)]);
        assert!(!errors.contains("e"));
        assert!(!errors.contains("f"));
    }

    #[test]
    fn max_length_counts_characters_not_bytes() {
        let value = json!({ "title": "é".repeat(200) });
        let payload = Payload::new(&value, WriteMode::Create).unwrap();
        let mut errors = FieldErrors::new();
        assert!(payload.string("title", Some(200), &mut errors).is_some());
        assert!(errors.is_empty());
    }

    #[test]
    fn primary_key_reports_type_and_existence() {
        let value = json!({ "a": "nope", "b": 7, "c": "3", "d": false });
        let payload = Payload::new(&value, WriteMode::Create).unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(payload.primary_key("a", |_| true, &mut errors), None);
        assert_eq!(payload.primary_key("b", |_| false, &mut errors), None);
        assert_eq!(payload.primary_key("c", |pk| pk == 3, &mut errors), Some(3));
        assert_eq!(payload.primary_key("d", |_| true, &mut errors), None);

        assert_eq!(
            errors.get("a").unwrap(),
            ["Incorrect type. Expected pk value, received string."]
        );
        assert_eq!(
            errors.get("b").unwrap(),
            ["Invalid pk \"7\" - object does not exist."]
        );
        assert_eq!(
            errors.get("d").unwrap(),
            ["Incorrect type. Expected pk value, received boolean."]
        );
    }

    #[test]
    fn referenced_pk_reads_numbers_and_numeric_strings() {
        assert_eq!(referenced_pk(&json!({ "post": 5 }), "post"), Some(5));
        assert_eq!(referenced_pk(&json!({ "post": " 6 " }), "post"), Some(6));
        assert_eq!(referenced_pk(&json!({ "post": [1] }), "post"), None);
        assert_eq!(referenced_pk(&json!([]), "post"), None);
    }

    #[test]
    fn display_lists_every_message() {
        let mut errors = FieldErrors::new();
        errors.add("title", REQUIRED);
        errors.add("content", BLANK);
        assert_eq!(
            errors.to_string(),
            "content: This field may not be blank.; title: This field is required."
        );
    }
}
