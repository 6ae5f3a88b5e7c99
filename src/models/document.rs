//! Stored document envelope and field-level validation helpers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

/// Loosely-typed field bag, as held by the document store
pub type Fields = Map<String, Value>;

/// Message returned when a required field is missing or empty
pub const REQUIRED_FIELDS_MESSAGE: &str = "Todos los campos son obligatorios";

/// A stored record together with its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document {
    /// Store identifier
    pub id: String,
    /// Record fields
    #[schema(value_type = Object)]
    pub data: Fields,
}

/// JavaScript truthiness: `null`, `false`, `0`, `""` are falsy, anything else is truthy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Record a `required` error for `field` unless `value` is present and truthy
pub fn require(errors: &mut ValidationErrors, field: &'static str, value: Option<&Value>) {
    if !value.map(is_truthy).unwrap_or(false) {
        errors.add(field, error_with_message("required", REQUIRED_FIELDS_MESSAGE));
    }
}

/// Build a validation error carrying a human-readable message
pub fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Copy an optional field into `fields` when it was supplied
pub(crate) fn put(fields: &mut Fields, name: &str, value: Option<Value>) {
    if let Some(value) = value {
        fields.insert(name.to_string(), value);
    }
}
