//! Run-scoped backing services.
//!
//! One temporary directory holds the SQLite database and one in-process mock
//! server stands in for the external API. Both go away when the
//! [`ProvisionedEnvironment`] is dropped.

use std::path::PathBuf;

use memberdesk_infrastructure::{MockServerHandle, Settings};
use tempfile::TempDir;
use tracing::info;

use crate::error::{HarnessError, HarnessResult};

const DATABASE_FILE: &str = "memberdesk-test.db";

/// Backing services for one test run.
pub struct ProvisionedEnvironment {
    dir: TempDir,
    mock_server: MockServerHandle,
    settings: Settings,
}

impl ProvisionedEnvironment {
    /// Creates the database directory and starts the mock external API.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Setup`] if either resource cannot be created.
    pub async fn provision() -> HarnessResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("memberdesk-")
            .tempdir()
            .map_err(|e| HarnessError::Setup(format!("temporary directory: {e}")))?;
        let mock_server = MockServerHandle::start()
            .await
            .map_err(|e| HarnessError::Setup(format!("mock server: {e}")))?;

        let settings = Settings {
            database_url: format!("sqlite://{}", dir.path().join(DATABASE_FILE).display()),
            external_api_url: mock_server.base_url(),
            listen_addr: "127.0.0.1:0".to_string(),
            ..Settings::default()
        };

        info!(
            database = %settings.database_url,
            external_api = %settings.external_api_url,
            "test environment provisioned"
        );
        Ok(Self {
            dir,
            mock_server,
            settings,
        })
    }

    /// Settings pointing at the provisioned services.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The mock external API.
    #[must_use]
    pub const fn mock_server(&self) -> &MockServerHandle {
        &self.mock_server
    }

    /// Location of the database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join(DATABASE_FILE)
    }
}
