//! Registers mock endpoints over the mock server's control API.

use async_trait::async_trait;
use memberdesk_application::ports::MockRegistrar;
use memberdesk_application::{ApplicationError, ApplicationResult};
use memberdesk_domain::MockEndpoint;
use reqwest::{Client, Response, Url};

use crate::mock_server::CONTROL_PATH;

/// [`MockRegistrar`] that talks to a running mock server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMockRegistrar {
    client: Client,
    control: Url,
}

impl HttpMockRegistrar {
    /// Creates a registrar for the mock server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> ApplicationResult<Self> {
        let control = Url::parse(base_url)
            .and_then(|base| base.join(CONTROL_PATH))
            .map_err(|e| ApplicationError::Http(format!("invalid mock server URL {base_url}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            control,
        })
    }
}

async fn ensure_success(response: Response, action: &str) -> ApplicationResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApplicationError::Http(format!(
        "mock server rejected {action}: {status} {body}"
    )))
}

#[async_trait]
impl MockRegistrar for HttpMockRegistrar {
    async fn put_endpoint(&self, endpoint: &MockEndpoint) -> ApplicationResult<()> {
        tracing::debug!(method = %endpoint.method, path = %endpoint.path, "registering mock endpoint");
        let response = self
            .client
            .put(self.control.clone())
            .json(endpoint)
            .send()
            .await
            .map_err(|e| ApplicationError::Http(e.to_string()))?;
        ensure_success(response, "endpoint").await
    }

    async fn reset(&self) -> ApplicationResult<()> {
        let response = self
            .client
            .delete(self.control.clone())
            .send()
            .await
            .map_err(|e| ApplicationError::Http(e.to_string()))?;
        ensure_success(response, "reset").await
    }
}
