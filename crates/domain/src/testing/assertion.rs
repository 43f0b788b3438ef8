//! Assertions over response documents.
//!
//! Every check returns `Ok(())` or an [`AssertionError`] whose message
//! carries the operation, path, expected and actual values.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;

use super::json_diff::JsonDiff;
use super::json_path::{JsonPath, JsonPathError};
use super::operation::AssertionOperation;
use crate::response::StatusCode;
use crate::time::{parse_timestamp, same_instant_and_offset};

/// Details of a failed comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Operation that was applied.
    pub operation: Option<AssertionOperation>,
    /// Path that was evaluated.
    pub path: String,
    /// Expected value, as supplied.
    pub expected: String,
    /// Actual value, rendered.
    pub actual: String,
    /// Structural diff, for JSON comparisons.
    pub diff: Option<JsonDiff>,
    /// Additional explanation, e.g. a type mismatch.
    pub reason: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = self.operation {
            write!(f, "operationType: [{operation}], ")?;
        }
        write!(
            f,
            "selectPath: [{}], expected: [{}], actual: [{}]",
            self.path, self.expected, self.actual
        )?;
        if let Some(diff) = &self.diff {
            write!(f, ", diff: [{diff}]")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Why an assertion did not pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssertionError {
    /// The path expression is not valid.
    #[error(transparent)]
    InvalidPath(#[from] JsonPathError),

    /// The expected text could not be read as the operation requires.
    #[error("operationType: [{operation}], selectPath: [{path}], expected: [{expected}] is not a valid {kind}")]
    InvalidExpected {
        /// Operation that was requested.
        operation: AssertionOperation,
        /// Path that was requested.
        path: String,
        /// The offending expected text.
        expected: String,
        /// What the text should have been.
        kind: &'static str,
    },

    /// The expected body text is not JSON.
    #[error("expected body is not valid JSON: {0}")]
    InvalidExpectedBody(String),

    /// The values differ.
    #[error("{0}")]
    Mismatch(Box<Mismatch>),

    /// The status code differs.
    #[error("HttpStatusCode: expected [{expected}], actual [{actual}]")]
    Status {
        /// Expected status code.
        expected: u16,
        /// Actual status code.
        actual: StatusCode,
    },

    /// Database rows differ from the expected table.
    #[error("{0}")]
    Rows(String),
}

/// Evaluates `path` against `document` and compares the first match.
///
/// # Errors
///
/// Returns an [`AssertionError`] for an invalid path, an invalid expected
/// value, or a mismatch.
pub fn assert_path(
    document: &Value,
    path: &str,
    operation: AssertionOperation,
    expected: &str,
) -> Result<(), AssertionError> {
    let compiled = JsonPath::parse(path)?;
    let actual = compiled.first(document);

    match operation {
        AssertionOperation::StringEquals => string_equals(path, actual, expected),
        AssertionOperation::NumberEquals => number_equals(path, actual, expected),
        AssertionOperation::BoolEquals => bool_equals(path, actual, expected),
        AssertionOperation::JsonEquals => json_equals(path, actual, expected),
        AssertionOperation::DateTimeEquals => datetime_equals(path, actual, expected),
    }
}

/// Compares a whole response body with the expected JSON text, key order ignored.
///
/// # Errors
///
/// Returns [`AssertionError::InvalidExpectedBody`] if `expected` is not JSON and
/// [`AssertionError::Mismatch`] if the documents differ or `actual` is not JSON.
pub fn assert_body_equals(expected: &str, actual: &str) -> Result<(), AssertionError> {
    let expected_doc: Value = serde_json::from_str(expected)
        .map_err(|e| AssertionError::InvalidExpectedBody(e.to_string()))?;

    let actual_doc: Value = match serde_json::from_str(actual) {
        Ok(doc) => doc,
        Err(e) => {
            return Err(mismatch(Mismatch {
                operation: Some(AssertionOperation::JsonEquals),
                path: "$".to_string(),
                expected: compact(&expected_doc),
                actual: actual.to_string(),
                diff: None,
                reason: Some(format!("actual body is not JSON: {e}")),
            }));
        }
    };

    let diff = JsonDiff::between(&expected_doc, &actual_doc);
    if diff.is_empty() {
        Ok(())
    } else {
        Err(mismatch(Mismatch {
            operation: Some(AssertionOperation::JsonEquals),
            path: "$".to_string(),
            expected: compact(&expected_doc),
            actual: compact(&actual_doc),
            diff: Some(diff),
            reason: None,
        }))
    }
}

/// Compares a status code.
///
/// # Errors
///
/// Returns [`AssertionError::Status`] when the codes differ.
pub fn assert_status(expected: u16, actual: StatusCode) -> Result<(), AssertionError> {
    if actual.as_u16() == expected {
        Ok(())
    } else {
        Err(AssertionError::Status { expected, actual })
    }
}

fn mismatch(details: Mismatch) -> AssertionError {
    AssertionError::Mismatch(Box::new(details))
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

fn render(actual: Option<&Value>) -> String {
    match actual {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => compact(other),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn failed(
    operation: AssertionOperation,
    path: &str,
    expected: &str,
    actual: Option<&Value>,
    reason: Option<String>,
) -> AssertionError {
    mismatch(Mismatch {
        operation: Some(operation),
        path: path.to_string(),
        expected: expected.to_string(),
        actual: render(actual),
        diff: None,
        reason,
    })
}

// An absent node and an empty string compare equal here.
fn string_equals(path: &str, actual: Option<&Value>, expected: &str) -> Result<(), AssertionError> {
    let op = AssertionOperation::StringEquals;
    let text = match actual {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.as_str(),
        Some(other) => {
            let reason = format!("selected node is a {}, not a string", type_name(other));
            return Err(failed(op, path, expected, actual, Some(reason)));
        }
    };

    if text == expected {
        Ok(())
    } else {
        Err(failed(op, path, expected, actual, None))
    }
}

fn number_equals(path: &str, actual: Option<&Value>, expected: &str) -> Result<(), AssertionError> {
    let op = AssertionOperation::NumberEquals;
    let want = expected
        .trim()
        .parse::<i64>()
        .map_err(|_| AssertionError::InvalidExpected {
            operation: op,
            path: path.to_string(),
            expected: expected.to_string(),
            kind: "integer",
        })?;

    match actual.and_then(Value::as_i64) {
        Some(got) if got == want => Ok(()),
        Some(_) => Err(failed(op, path, expected, actual, None)),
        None => {
            let reason = actual.map_or_else(
                || "no node matched".to_string(),
                |v| format!("selected node is a {}, not an integer", type_name(v)),
            );
            Err(failed(op, path, expected, actual, Some(reason)))
        }
    }
}

fn bool_equals(path: &str, actual: Option<&Value>, expected: &str) -> Result<(), AssertionError> {
    let op = AssertionOperation::BoolEquals;
    let want = match expected.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            return Err(AssertionError::InvalidExpected {
                operation: op,
                path: path.to_string(),
                expected: expected.to_string(),
                kind: "boolean",
            });
        }
    };

    match actual.and_then(Value::as_bool) {
        Some(got) if got == want => Ok(()),
        Some(_) => Err(failed(op, path, expected, actual, None)),
        None => {
            let reason = actual.map_or_else(
                || "no node matched".to_string(),
                |v| format!("selected node is a {}, not a boolean", type_name(v)),
            );
            Err(failed(op, path, expected, actual, Some(reason)))
        }
    }
}

fn datetime_equals(path: &str, actual: Option<&Value>, expected: &str) -> Result<(), AssertionError> {
    let op = AssertionOperation::DateTimeEquals;
    let want = parse_timestamp(expected).map_err(|_| AssertionError::InvalidExpected {
        operation: op,
        path: path.to_string(),
        expected: expected.to_string(),
        kind: "timestamp",
    })?;

    let got: Option<DateTime<FixedOffset>> = actual
        .and_then(Value::as_str)
        .and_then(|text| parse_timestamp(text).ok());

    match got {
        Some(got) if same_instant_and_offset(&got, &want) => Ok(()),
        Some(got) => Err(mismatch(Mismatch {
            operation: Some(op),
            path: path.to_string(),
            expected: want.to_rfc3339(),
            actual: got.to_rfc3339(),
            diff: None,
            reason: None,
        })),
        None => {
            let reason = actual.map_or_else(
                || "no node matched".to_string(),
                |_| "selected node is not a timestamp".to_string(),
            );
            Err(failed(op, path, expected, actual, Some(reason)))
        }
    }
}

fn json_equals(path: &str, actual: Option<&Value>, expected: &str) -> Result<(), AssertionError> {
    let op = AssertionOperation::JsonEquals;
    let want = if expected.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(expected).map_err(|_| AssertionError::InvalidExpected {
            operation: op,
            path: path.to_string(),
            expected: expected.to_string(),
            kind: "JSON document",
        })?
    };
    let got = actual.cloned().unwrap_or(Value::Null);

    let diff = JsonDiff::between(&want, &got);
    if diff.is_empty() {
        Ok(())
    } else {
        Err(mismatch(Mismatch {
            operation: Some(op),
            path: path.to_string(),
            expected: expected.to_string(),
            actual: compact(&got),
            diff: Some(diff),
            reason: None,
        }))
    }
}
