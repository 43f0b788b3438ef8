//! MemberDesk Web - the Member HTTP API
//!
//! Routes:
//! - `GET /health`
//! - `GET|POST /api/v1/members`
//! - `GET|PUT|DELETE /api/v1/members/{id}`
//! - `GET /api/v1/external/{*path}`, proxied to the external API

mod error;
mod routes;
mod state;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, USER_ID_HEADER};

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/api/v1/members",
            get(routes::members::list).post(routes::members::create),
        )
        .route(
            "/api/v1/members/{id}",
            get(routes::members::get)
                .put(routes::members::update)
                .delete(routes::members::delete),
        )
        .route("/api/v1/external/{*path}", get(routes::external::proxy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
