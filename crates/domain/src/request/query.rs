//! Query parameter types

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A query parameter key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value
    pub value: String,
}

impl QueryParam {
    /// Creates a new query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of query parameters.
///
/// This is deliberately a list and not a map: the same key may repeat
/// (`filters=a&filters=b`) and every entry must reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    items: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty query parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a query parameter, keeping earlier entries with the same key.
    pub fn add(&mut self, param: QueryParam) {
        self.items.push(param);
    }

    /// Returns all parameters in insertion order.
    #[must_use]
    pub fn all(&self) -> &[QueryParam] {
        &self.items
    }

    /// Returns the number of parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends every parameter to `target` as form-encoded pairs.
    ///
    /// Values are trimmed. An existing query string in `target` is kept.
    #[must_use]
    pub fn append_to(&self, target: &str) -> String {
        if self.items.is_empty() {
            return target.to_string();
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for param in &self.items {
            serializer.append_pair(&param.key, param.value.trim());
        }
        let encoded = serializer.finish();

        let separator = match target.find('?') {
            None => "?",
            Some(index) if index + 1 == target.len() || target.ends_with('&') => "",
            Some(_) => "&",
        };
        format!("{target}{separator}{encoded}")
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<T: IntoIterator<Item = QueryParam>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
