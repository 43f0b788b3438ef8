//! In-process server hosting the Member API for one scenario.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use memberdesk::Services;
use memberdesk_application::ports::Clock;
use memberdesk_infrastructure::{FixedClock, ReqwestHttpClient, Settings, SystemClock};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};

/// A running Member API bound to an ephemeral local port.
///
/// The server stops when the host is dropped.
pub struct TestHost {
    base_url: String,
    client: ReqwestHttpClient,
    services: Services,
    task: JoinHandle<()>,
}

impl TestHost {
    /// Starts the API with a clock frozen at `now` (system time when `None`)
    /// and `user_id` as the default caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the router cannot be composed or the port bound.
    pub async fn start(
        settings: &Settings,
        now: Option<DateTime<Utc>>,
        user_id: Option<String>,
    ) -> HarnessResult<Self> {
        let clock: Arc<dyn Clock> = match now {
            Some(now) => Arc::new(FixedClock::new(now)),
            None => Arc::new(SystemClock::new()),
        };
        let settings = Settings {
            default_user: user_id,
            ..settings.clone()
        };

        let (app, services) = memberdesk::compose(&settings, clock)
            .map_err(|e| HarnessError::Setup(e.to_string()))?;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| HarnessError::Setup(format!("bind test host: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| HarnessError::Setup(e.to_string()))?;
        let base_url = format!("http://{addr}");
        let client = ReqwestHttpClient::with_base_url(&base_url)?;

        let task = tokio::spawn(async move {
            if let Err(e) = memberdesk::serve(listener, app).await {
                warn!(error = %e, "test host stopped");
            }
        });

        debug!(%base_url, ?now, "test host started");
        Ok(Self {
            base_url,
            client,
            services,
            task,
        })
    }

    /// Client whose relative targets resolve against this host.
    #[must_use]
    pub const fn client(&self) -> &ReqwestHttpClient {
        &self.client
    }

    /// Services behind the API.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.task.abort();
    }
}
