//! Structural JSON comparison.
//!
//! Objects are compared key by key regardless of order, arrays element by
//! element, and numbers by value (`1` equals `1.0`).

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// How a node differs between the expected and actual documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Present on both sides with different values or types.
    Changed,
    /// Expected but absent from the actual document.
    Missing,
    /// Present in the actual document only.
    Unexpected,
}

/// A single difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    /// Location of the difference, as a JSON path.
    pub path: String,
    /// Kind of difference.
    pub kind: DiffKind,
    /// Expected value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// Actual value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

/// The full set of differences between two documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonDiff {
    entries: Vec<DiffEntry>,
}

impl JsonDiff {
    /// Compares two documents.
    #[must_use]
    pub fn between(expected: &Value, actual: &Value) -> Self {
        let mut diff = Self::default();
        diff.walk("$".to_string(), expected, actual);
        diff
    }

    /// Returns true when the documents are structurally equal.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the individual differences.
    #[must_use]
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    fn push(&mut self, path: String, kind: DiffKind, expected: Option<&Value>, actual: Option<&Value>) {
        self.entries.push(DiffEntry {
            path,
            kind,
            expected: expected.cloned(),
            actual: actual.cloned(),
        });
    }

    fn walk(&mut self, path: String, expected: &Value, actual: &Value) {
        match (expected, actual) {
            (Value::Object(exp), Value::Object(act)) => {
                for (key, exp_value) in exp {
                    let child = child_path(&path, key);
                    match act.get(key) {
                        Some(act_value) => self.walk(child, exp_value, act_value),
                        None => self.push(child, DiffKind::Missing, Some(exp_value), None),
                    }
                }
                for (key, act_value) in act {
                    if !exp.contains_key(key) {
                        self.push(child_path(&path, key), DiffKind::Unexpected, None, Some(act_value));
                    }
                }
            }
            (Value::Array(exp), Value::Array(act)) => {
                for (index, exp_value) in exp.iter().enumerate() {
                    let child = format!("{path}[{index}]");
                    match act.get(index) {
                        Some(act_value) => self.walk(child, exp_value, act_value),
                        None => self.push(child, DiffKind::Missing, Some(exp_value), None),
                    }
                }
                for (index, act_value) in act.iter().enumerate().skip(exp.len()) {
                    self.push(format!("{path}[{index}]"), DiffKind::Unexpected, None, Some(act_value));
                }
            }
            (Value::Number(exp), Value::Number(act)) => {
                if !numbers_equal(exp, act) {
                    self.push(path, DiffKind::Changed, Some(expected), Some(actual));
                }
            }
            _ => {
                if expected != actual {
                    self.push(path, DiffKind::Changed, Some(expected), Some(actual));
                }
            }
        }
    }
}

impl fmt::Display for JsonDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{} difference(s)", self.entries.len()),
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        #[allow(clippy::float_cmp)]
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn child_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c == '_' || c == '-' || c.is_alphanumeric());
    if plain {
        format!("{parent}.{key}")
    } else {
        format!("{parent}['{}']", key.replace('\'', "\\'"))
    }
}
