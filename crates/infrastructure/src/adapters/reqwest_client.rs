//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Relative request targets are resolved against an optional base URL, which
//! is how the test host hands out a client bound to its own address. Requests
//! carry no client-side timeout; a step waits for the server to answer.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use memberdesk_application::ports::{HttpClient, HttpClientError};
use memberdesk_domain::{
    request::{HttpMethod, RequestSpec},
    response::ResponseSpec,
};
use reqwest::{Client, Method, Url};

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Option<Url>,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: none
    /// - Redirects: not followed
    /// - User-Agent: "MemberDesk/0.1.0"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("MemberDesk/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Creates a client that resolves relative targets against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the client
    /// cannot be created.
    pub fn with_base_url(base_url: &str) -> Result<Self, HttpClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base_url}")))?;
        Ok(Self {
            base_url: Some(base),
            ..Self::new()?
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Resolves a request target into an absolute URL.
    fn resolve(&self, target: &str) -> Result<Url, HttpClientError> {
        let resolved = match &self.base_url {
            Some(base) if !is_absolute(target) => base.join(target),
            _ => Url::parse(target),
        };
        resolved.map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {target}")))
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error) -> HttpClientError {
        if error.is_connect() {
            let message = error.to_string();
            if message.to_lowercase().contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(|u| u.host_str().map(str::to_string))
                        .unwrap_or_else(|| "unknown".to_string()),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_body() {
            return HttpClientError::InvalidBody(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

fn is_absolute(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + '_>> {
        let method = request.method;
        let target = request.target.clone();
        let headers = request.headers.clone();
        let body = request.body.clone();

        Box::pin(async move {
            let url = self.resolve(&target)?;
            tracing::debug!(%method, %url, "sending request");

            let start = Instant::now();

            let mut builder = self.client.request(Self::to_reqwest_method(method), url);

            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            if let Some(body) = body {
                builder = builder
                    .header(reqwest::header::CONTENT_TYPE, body.content_type())
                    .body(body.content.into_bytes());
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e))?;

            let status = response.status().as_u16();

            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            let duration = start.elapsed();
            tracing::debug!(status, ?duration, "response received");

            Ok(ResponseSpec::new(
                status,
                response_headers,
                body_bytes,
            ))
        })
    }
}
