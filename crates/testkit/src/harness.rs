//! Run-scoped test harness.

use chrono::{DateTime, Utc};
use memberdesk_application::ports::{MockRegistrar, SessionFactory};
use memberdesk_infrastructure::{HttpMockRegistrar, Settings, SqliteSessionFactory};
use tracing::info;

use crate::error::{HarnessError, HarnessResult};
use crate::host::TestHost;
use crate::provisioner::ProvisionedEnvironment;

/// Everything provisioned once per run and shared by all scenarios.
pub struct TestHarness {
    environment: ProvisionedEnvironment,
    sessions: SqliteSessionFactory,
    registrar: HttpMockRegistrar,
}

impl TestHarness {
    /// Provisions backing services and creates the database schema.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Setup`] if any of it fails; the run must stop.
    pub async fn start() -> HarnessResult<Self> {
        let environment = ProvisionedEnvironment::provision().await?;
        let settings = environment.settings();

        let sessions = SqliteSessionFactory::new(&settings.database_url);
        sessions
            .create_session()
            .map_err(|e| HarnessError::Setup(e.to_string()))?
            .initialize()
            .await
            .map_err(|e| HarnessError::Setup(format!("schema: {e}")))?;

        let registrar = HttpMockRegistrar::new(&settings.external_api_url)
            .map_err(|e| HarnessError::Setup(e.to_string()))?;

        info!("test harness ready");
        Ok(Self {
            environment,
            sessions,
            registrar,
        })
    }

    /// Settings pointing at the provisioned services.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        self.environment.settings()
    }

    /// Sessions on the run's database.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionFactory {
        &self.sessions
    }

    /// Registrar for the mock external API.
    #[must_use]
    pub fn registrar(&self) -> &dyn MockRegistrar {
        &self.registrar
    }

    /// Clears members and mock rules left by the previous scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be cleared.
    pub async fn reset(&self) -> HarnessResult<()> {
        self.sessions.create_session()?.clear().await?;
        self.registrar.reset().await?;
        Ok(())
    }

    /// Starts a test host against the run's services.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot start.
    pub async fn start_host(
        &self,
        now: Option<DateTime<Utc>>,
        user_id: Option<String>,
    ) -> HarnessResult<TestHost> {
        TestHost::start(self.settings(), now, user_id).await
    }
}
