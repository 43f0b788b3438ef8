//! MemberDesk - composition root
//!
//! Wires settings, adapters and use cases into the web router. The binary
//! and the test host share this wiring.

use std::sync::Arc;

use axum::Router;
use memberdesk_application::ports::{Clock, SessionFactory};
use memberdesk_application::use_cases::MemberService;
use memberdesk_application::{ApplicationError, ApplicationResult};
use memberdesk_infrastructure::{ConfigError, ReqwestExternalApi, Settings, SqliteSessionFactory};
use memberdesk_web::AppState;
use thiserror::Error;
use tokio::net::TcpListener;

/// Failures while starting the server.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An adapter could not be created or the schema could not be initialized.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The listener could not be bound or the server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Services behind the router, exposed for tests and startup tasks.
#[derive(Clone)]
pub struct Services {
    /// Opens member store sessions.
    pub sessions: Arc<dyn SessionFactory>,
    /// Clock stamping audit fields.
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Factory for member store sessions.
    #[must_use]
    pub fn session_factory(&self) -> &dyn SessionFactory {
        self.sessions.as_ref()
    }

    /// Creates the member schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or written.
    pub async fn initialize_schema(&self) -> ApplicationResult<()> {
        self.sessions.create_session()?.initialize().await
    }
}

/// Builds the router for `settings`, stamping times from `clock`.
///
/// # Errors
///
/// Returns an error if the external API URL is invalid.
pub fn compose(settings: &Settings, clock: Arc<dyn Clock>) -> Result<(Router, Services), StartupError> {
    let sessions: Arc<dyn SessionFactory> =
        Arc::new(SqliteSessionFactory::new(&settings.database_url));
    let external = Arc::new(ReqwestExternalApi::new(&settings.external_api_url)?);

    let members = MemberService::new(Arc::clone(&sessions), Arc::clone(&clock));
    let state = AppState::new(members, external, settings.default_user.clone());

    Ok((memberdesk_web::router(state), Services { sessions, clock }))
}

/// Serves `app` on `listener` until the task is cancelled or fails.
///
/// # Errors
///
/// Returns an error if accepting connections fails.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}
