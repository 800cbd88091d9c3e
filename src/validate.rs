//! Response shape validation
//!
//! The remote contract is not fully trusted, so the decoded body is
//! checked defensively before any field is read. Checks run in order and
//! fail fast on the first violation.

use serde_json::Value;

use crate::error::{ReviewbotError, Result};

/// Validate the decoded API response and return the homework list
///
/// The list may be empty; individual items are not inspected here. That
/// is deferred to translation, which only ever looks at the item in use.
pub fn check_response(raw: &Value) -> Result<&Vec<Value>> {
    log::info!("Validating API response shape");

    let object = raw.as_object().ok_or_else(|| {
        ReviewbotError::ResponseProtocol(format!(
            "response is not an object: got {}",
            json_type_name(raw)
        ))
    })?;

    let homeworks = object.get("homeworks").ok_or_else(|| {
        ReviewbotError::ResponseProtocol("response is missing the \"homeworks\" key".to_string())
    })?;

    homeworks.as_array().ok_or_else(|| {
        ReviewbotError::ResponseProtocol(format!(
            "\"homeworks\" is not an array: got {}",
            json_type_name(homeworks)
        ))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
