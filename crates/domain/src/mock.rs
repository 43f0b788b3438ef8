//! Mock endpoint rules for the fake external API.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::request::{HttpMethod, encode_path};

/// A canned response served by the mock external API.
///
/// Rules are keyed by `(method, path)`; registering the same key again
/// replaces the earlier rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockEndpoint {
    /// Method the inbound request must use.
    pub method: HttpMethod,
    /// Exact path the inbound request must hit.
    pub path: String,
    /// Status code to answer with.
    pub status_code: u16,
    /// Response body to answer with.
    #[serde(default)]
    pub body: String,
}

impl MockEndpoint {
    /// Creates a rule from step input.
    ///
    /// `url` may be absolute or relative; only its path is kept.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable URL or a status outside 100..=599.
    pub fn new(
        method: HttpMethod,
        url: &str,
        status_code: u16,
        body: impl Into<String>,
    ) -> DomainResult<Self> {
        if !(100..=599).contains(&status_code) {
            return Err(DomainError::InvalidStatusCode(status_code.to_string()));
        }

        Ok(Self {
            method,
            path: normalize_path(url)?,
            status_code,
            body: body.into(),
        })
    }

    /// Returns the key this rule is stored under.
    #[must_use]
    pub fn key(&self) -> (HttpMethod, String) {
        (self.method, self.path.clone())
    }

    /// Returns true if the body is valid JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        serde_json::from_str::<serde_json::Value>(&self.body).is_ok()
    }
}

/// Reduces a URL or path to a path with a leading slash and no query.
///
/// The result is percent-encoded segment by segment, so `/a b`, `/a%20b`
/// and `http://host/a%20b` all reduce to `/a%20b`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] if an absolute URL cannot be parsed.
pub fn normalize_path(url: &str) -> DomainResult<String> {
    let url = url.trim();
    let path = if url.contains("://") {
        encode_path(
            Url::parse(url)
                .map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")))?
                .path(),
        )
    } else {
        encode_path(url.split(['?', '#']).next().unwrap_or_default())
    };

    if path.starts_with('/') {
        Ok(path)
    } else {
        Ok(format!("/{path}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_path_gets_leading_slash() {
        let rule = MockEndpoint::new(HttpMethod::Get, "ext/ping", 200, "{}").unwrap();
        assert_eq!(rule.path, "/ext/ping");
    }

    #[test]
    fn test_query_is_ignored() {
        let rule = MockEndpoint::new(HttpMethod::Get, "/ext/ping?x=1", 200, "").unwrap();
        assert_eq!(rule.path, "/ext/ping");
    }

    #[test]
    fn test_absolute_url_keeps_path() {
        let rule =
            MockEndpoint::new(HttpMethod::Post, "http://localhost:1080/ext/users", 201, "").unwrap();
        assert_eq!(rule.key(), (HttpMethod::Post, "/ext/users".to_string()));
    }

    #[test]
    fn test_relative_and_absolute_urls_share_a_key() {
        let relative = MockEndpoint::new(HttpMethod::Get, "/ext/a b", 200, "").unwrap();
        let encoded = MockEndpoint::new(HttpMethod::Get, "/ext/a%20b", 200, "").unwrap();
        let absolute =
            MockEndpoint::new(HttpMethod::Get, "http://localhost/ext/a b", 200, "").unwrap();
        assert_eq!(relative.path, "/ext/a%20b");
        assert_eq!(encoded.key(), relative.key());
        assert_eq!(absolute.key(), relative.key());
        assert_eq!(normalize_path(&relative.path).unwrap(), relative.path);
    }

    #[test]
    fn test_invalid_status() {
        let result = MockEndpoint::new(HttpMethod::Get, "/x", 42, "");
        assert_eq!(result, Err(DomainError::InvalidStatusCode("42".to_string())));
    }

    #[test]
    fn test_is_json() {
        assert!(MockEndpoint::new(HttpMethod::Get, "/x", 200, r#"{"ok":true}"#).unwrap().is_json());
        assert!(!MockEndpoint::new(HttpMethod::Get, "/x", 200, "pong").unwrap().is_json());
    }
}
