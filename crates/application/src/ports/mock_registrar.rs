//! Mock endpoint registration port

use async_trait::async_trait;
use memberdesk_domain::MockEndpoint;

use crate::ApplicationResult;

/// Installs canned responses on the mock external API.
#[async_trait]
pub trait MockRegistrar: Send + Sync {
    /// Installs or replaces the rule for the endpoint's method and path.
    ///
    /// # Errors
    ///
    /// Returns an error if the mock server rejects the rule or cannot be reached.
    async fn put_endpoint(&self, endpoint: &MockEndpoint) -> ApplicationResult<()>;

    /// Removes every rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the mock server cannot be reached.
    async fn reset(&self) -> ApplicationResult<()>;
}
