//! Request specification type

use serde::{Deserialize, Serialize};

use super::{DEFAULT_MEDIA_TYPE, HeaderMap, HttpMethod, QueryParams, RequestBody, encode_path};

/// Complete specification for an HTTP request sent to the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Encoded target (path and query), relative to the client's base URL
    pub target: String,
    /// Headers to send, `content-type` excluded
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Request body, if one was staged
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    /// Assembles a request from staged scenario inputs.
    ///
    /// The URL path is encoded segment by segment, every query parameter is
    /// appended in order, and a `content-type` header only selects the body
    /// media type. A blank body is dropped.
    #[must_use]
    pub fn assemble(
        method: HttpMethod,
        url: &str,
        query: &QueryParams,
        headers: &HeaderMap,
        body: Option<&str>,
    ) -> Self {
        let target = query.append_to(&encode_path(url));
        let media_type = headers.content_type().unwrap_or(DEFAULT_MEDIA_TYPE);

        let body = body
            .map(|content| RequestBody::new(media_type, content))
            .filter(|body| !body.is_blank());

        Self {
            method,
            target,
            headers: headers
                .without_content_type()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body,
        }
    }

    /// Creates a bodiless request with no extra headers.
    #[must_use]
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::QueryParam;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_routes_content_type_to_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "yao");
        headers.insert("Content-Type", "application/merge-patch+json");

        let request = RequestSpec::assemble(
            HttpMethod::Patch,
            "/api/v1/members/1",
            &QueryParams::new(),
            &headers,
            Some(r#"{"name":"Yao"}"#),
        );

        assert_eq!(request.headers, vec![("x-user-id".to_string(), "yao".to_string())]);
        let body = request.body.unwrap_or_else(|| RequestBody::json(""));
        assert_eq!(body.media_type, "application/merge-patch+json");
    }

    #[test]
    fn test_assemble_defaults_to_json() {
        let request = RequestSpec::assemble(
            HttpMethod::Post,
            "/api/v1/members",
            &QueryParams::new(),
            &HeaderMap::new(),
            Some("{}"),
        );
        assert_eq!(
            request.body.map(|b| b.content_type()),
            Some("application/json; charset=utf-8".to_string())
        );
    }

    #[test]
    fn test_assemble_drops_blank_body() {
        let request = RequestSpec::assemble(
            HttpMethod::Post,
            "/api/v1/members",
            &QueryParams::new(),
            &HeaderMap::new(),
            Some("   "),
        );
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_assemble_encodes_path_and_appends_query() {
        let query: QueryParams = [QueryParam::new("id", "1"), QueryParam::new("id", "2")]
            .into_iter()
            .collect();
        let request = RequestSpec::assemble(
            HttpMethod::Get,
            "/api/v1/members/a b",
            &query,
            &HeaderMap::new(),
            None,
        );
        assert_eq!(request.target, "/api/v1/members/a%20b?id=1&id=2");
    }
}
