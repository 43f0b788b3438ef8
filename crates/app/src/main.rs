//! MemberDesk - Main Entry Point
//!
//! Loads settings from `MEMBERDESK_*` variables, prepares the database and
//! serves the Member API.

use std::sync::Arc;

use memberdesk_infrastructure::{Settings, SystemClock, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_tracing(&settings.log_filter)?;

    let (app, services) = memberdesk::compose(&settings, Arc::new(SystemClock::new()))?;
    services.initialize_schema().await?;

    let listener = TcpListener::bind(&settings.listen_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        database = %settings.database_url,
        "Starting MemberDesk v{}",
        env!("CARGO_PKG_VERSION")
    );

    memberdesk::serve(listener, app).await?;
    Ok(())
}
