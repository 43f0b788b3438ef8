//! External API port

use async_trait::async_trait;
use memberdesk_domain::ResponseSpec;

use crate::ApplicationResult;

/// Downstream HTTP API the member service proxies to.
#[async_trait]
pub trait ExternalApi: Send + Sync {
    /// Issues `GET {base}/{path}` with the optional raw query string.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Http` if the upstream cannot be reached.
    async fn get(&self, path: &str, query: Option<&str>) -> ApplicationResult<ResponseSpec>;
}
