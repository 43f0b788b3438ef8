//! Scenario-scoped state shared between steps.
//!
//! Each well-known value has its own typed slot. Ad hoc values go into a
//! string-keyed extension bag that remembers each value's type.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use memberdesk::Services;
use memberdesk_domain::request::{HeaderMap, QueryParam, QueryParams};
use memberdesk_domain::response::StatusCode;
use memberdesk_infrastructure::ReqwestHttpClient;
use serde_json::Value;
use thiserror::Error;

use crate::host::TestHost;

/// Well-known scenario values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Client bound to the test host.
    HttpClient,
    /// Services behind the test host.
    ServiceProvider,
    /// Staged request body.
    HttpRequestBody,
    /// Raw body of the last response.
    HttpResponseBody,
    /// Status of the last response.
    HttpStatusCode,
    /// Default caller of the test host.
    UserId,
    /// Frozen time of the test host.
    UtcNow,
    /// Staged query parameters.
    QueryString,
    /// Staged request headers.
    Headers,
    /// Parsed JSON of the last response.
    JsonNode,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failed context reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The value was never set in this scenario.
    #[error("scenario context has no value for {0}")]
    Missing(ContextKey),

    /// No extension value is stored under the name.
    #[error("scenario context has no extension named '{0}'")]
    MissingExtension(String),

    /// The extension value has a different type than requested.
    #[error("scenario context value '{key}' is a {actual}, not a {expected}")]
    TypeMismatch {
        /// Extension name.
        key: String,
        /// Requested type.
        expected: &'static str,
        /// Stored type.
        actual: &'static str,
    },
}

struct Extension {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// State owned by one scenario and dropped with it.
#[derive(Default)]
pub struct ScenarioContext {
    host: Option<TestHost>,
    request_body: Option<String>,
    response_body: Option<String>,
    status_code: Option<StatusCode>,
    user_id: Option<String>,
    utc_now: Option<DateTime<Utc>>,
    query: QueryParams,
    headers: HeaderMap,
    json: Option<Value>,
    extensions: HashMap<String, Extension>,
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("host", &self.host.as_ref().map(TestHost::base_url))
            .field("request_body", &self.request_body)
            .field("response_body", &self.response_body)
            .field("status_code", &self.status_code)
            .field("user_id", &self.user_id)
            .field("utc_now", &self.utc_now)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the test host, replacing (and stopping) any previous one.
    pub fn set_host(&mut self, host: TestHost) {
        self.host = Some(host);
    }

    /// The running test host.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] if no host was started.
    pub fn host(&self) -> Result<&TestHost, ContextError> {
        self.host
            .as_ref()
            .ok_or(ContextError::Missing(ContextKey::HttpClient))
    }

    /// Client bound to the test host.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] if no host was started.
    pub fn client(&self) -> Result<&ReqwestHttpClient, ContextError> {
        self.host().map(TestHost::client)
    }

    /// Services behind the test host.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] if no host was started.
    pub fn services(&self) -> Result<&Services, ContextError> {
        self.host
            .as_ref()
            .map(TestHost::services)
            .ok_or(ContextError::Missing(ContextKey::ServiceProvider))
    }

    /// Stages the request body.
    pub fn set_request_body(&mut self, body: impl Into<String>) {
        self.request_body = Some(body.into());
    }

    /// The staged request body, if any.
    #[must_use]
    pub fn request_body(&self) -> Option<&str> {
        self.request_body.as_deref()
    }

    /// Records the raw response body.
    pub fn set_response_body(&mut self, body: impl Into<String>) {
        self.response_body = Some(body.into());
    }

    /// Raw body of the last response.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] before any request was sent.
    pub fn response_body(&self) -> Result<&str, ContextError> {
        self.response_body
            .as_deref()
            .ok_or(ContextError::Missing(ContextKey::HttpResponseBody))
    }

    /// Records the response status.
    pub fn set_status_code(&mut self, status: StatusCode) {
        self.status_code = Some(status);
    }

    /// Status of the last response.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] before any request was sent.
    pub fn status_code(&self) -> Result<StatusCode, ContextError> {
        self.status_code
            .ok_or(ContextError::Missing(ContextKey::HttpStatusCode))
    }

    /// Sets the default caller.
    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
    }

    /// The default caller, if one was given.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Sets the frozen time.
    pub fn set_utc_now(&mut self, now: DateTime<Utc>) {
        self.utc_now = Some(now);
    }

    /// The frozen time, if one was given.
    #[must_use]
    pub const fn utc_now(&self) -> Option<DateTime<Utc>> {
        self.utc_now
    }

    /// Queues a query parameter; repeated keys are kept.
    pub fn add_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.add(QueryParam::new(key, value));
    }

    /// Queued query parameters, empty by default.
    #[must_use]
    pub const fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Stages a header, replacing any with the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Staged headers, empty by default.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Records the parsed response document; `None` clears it.
    pub fn set_json(&mut self, json: Option<Value>) {
        self.json = json;
    }

    /// Parsed JSON of the last response.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] if no JSON body was received.
    pub fn json(&self) -> Result<&Value, ContextError> {
        self.json
            .as_ref()
            .ok_or(ContextError::Missing(ContextKey::JsonNode))
    }

    /// Stores an ad hoc value under `key`.
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.extensions.insert(
            key.into(),
            Extension {
                type_name: type_name::<T>(),
                value: Box::new(value),
            },
        );
    }

    /// Reads an ad hoc value.
    ///
    /// # Errors
    /// - [`ContextError::MissingExtension`] if nothing is stored under `key`
    /// - [`ContextError::TypeMismatch`] if the stored value is not a `T`
    pub fn extension<T: Any + Send + Sync>(&self, key: &str) -> Result<&T, ContextError> {
        let entry = self
            .extensions
            .get(key)
            .ok_or_else(|| ContextError::MissingExtension(key.to_string()))?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| ContextError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                actual: entry.type_name,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let context = ScenarioContext::new();
        assert!(context.query().is_empty());
        assert!(context.headers().is_empty());
        assert_eq!(context.request_body(), None);
        assert_eq!(context.user_id(), None);
        assert_eq!(context.utc_now(), None);
    }

    #[test]
    fn test_unset_values_are_missing() {
        let context = ScenarioContext::new();
        assert_eq!(
            context.client().err(),
            Some(ContextError::Missing(ContextKey::HttpClient))
        );
        assert_eq!(
            context.services().err(),
            Some(ContextError::Missing(ContextKey::ServiceProvider))
        );
        assert_eq!(
            context.status_code(),
            Err(ContextError::Missing(ContextKey::HttpStatusCode))
        );
        assert_eq!(
            context.response_body(),
            Err(ContextError::Missing(ContextKey::HttpResponseBody))
        );
        assert_eq!(
            context.json(),
            Err(ContextError::Missing(ContextKey::JsonNode))
        );
    }

    #[test]
    fn test_query_keeps_duplicates_in_order() {
        let mut context = ScenarioContext::new();
        context.add_query("filters", "a");
        context.add_query("filters", "b");
        context.add_query("page", "1");

        let keys: Vec<_> = context
            .query()
            .all()
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(keys, vec![("filters", "a"), ("filters", "b"), ("page", "1")]);
    }

    #[test]
    fn test_headers_replace_case_insensitively() {
        let mut context = ScenarioContext::new();
        context.add_header("X-Trace", "1");
        context.add_header("x-trace", "2");
        assert_eq!(context.headers().len(), 1);
        assert_eq!(context.headers().get("X-TRACE"), Some("2"));
    }

    #[test]
    fn test_response_values_round_trip() {
        let mut context = ScenarioContext::new();
        context.set_status_code(StatusCode::new(201));
        context.set_response_body(r#"{"id":"1"}"#);
        context.set_json(Some(json!({"id": "1"})));

        assert_eq!(context.status_code().unwrap().as_u16(), 201);
        assert_eq!(context.response_body().unwrap(), r#"{"id":"1"}"#);
        assert_eq!(context.json().unwrap()["id"], "1");
    }

    #[test]
    fn test_extension_type_checks() {
        let mut context = ScenarioContext::new();
        context.insert_extension("firm_id", 42_i64);

        assert_eq!(*context.extension::<i64>("firm_id").unwrap(), 42);
        assert!(matches!(
            context.extension::<String>("firm_id"),
            Err(ContextError::TypeMismatch { expected, actual, .. })
                if expected == type_name::<String>() && actual == "i64"
        ));
        assert_eq!(
            context.extension::<i64>("other").err(),
            Some(ContextError::MissingExtension("other".to_string()))
        );
    }
}
