//! reqwest-backed client for the downstream external API.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use memberdesk_application::ports::ExternalApi;
use memberdesk_application::{ApplicationError, ApplicationResult};
use memberdesk_domain::{ResponseSpec, generate_id};
use reqwest::{Client, Url};

/// Header carrying the per-call trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Calls the external API at a fixed base URL.
#[derive(Debug, Clone)]
pub struct ReqwestExternalApi {
    client: Client,
    base: Url,
}

impl ReqwestExternalApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> ApplicationResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ApplicationError::Http(format!("invalid external API URL {base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn target(&self, path: &str, query: Option<&str>) -> ApplicationResult<Url> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApplicationError::Http(format!("invalid external path {path}: {e}")))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl ExternalApi for ReqwestExternalApi {
    async fn get(&self, path: &str, query: Option<&str>) -> ApplicationResult<ResponseSpec> {
        let url = self.target(path, query)?;
        let trace_id = generate_id();
        tracing::debug!(%url, %trace_id, "calling external API");

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(TRACE_ID_HEADER, &trace_id)
            .send()
            .await
            .map_err(|e| ApplicationError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApplicationError::Http(format!("failed to read external body: {e}")))?;

        tracing::debug!(status, elapsed = ?start.elapsed(), "external API answered");
        Ok(ResponseSpec::new(status, headers, body.to_vec()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_target_joins_under_base_path() {
        let api = ReqwestExternalApi::new("http://127.0.0.1:9000/upstream").unwrap();
        let url = api.target("/ext/ping", Some("a=1&a=2")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/upstream/ext/ping?a=1&a=2");
    }

    #[test]
    fn test_target_without_query() {
        let api = ReqwestExternalApi::new("http://127.0.0.1:9000").unwrap();
        let url = api.target("ext/ping", Some("")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/ext/ping");
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            ReqwestExternalApi::new("::"),
            Err(ApplicationError::Http(_))
        ));
    }
}
