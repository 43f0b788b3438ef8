//! In-process mock of the external API.
//!
//! Rules are installed over `PUT /__mock/endpoints` and cleared with
//! `DELETE /__mock/endpoints`. Every other request is answered from the rule
//! matching its method and path, or with a JSON 404.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::put,
};
use memberdesk_domain::{HttpMethod, MockEndpoint, mock::normalize_path};
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Path of the rule control endpoint.
pub const CONTROL_PATH: &str = "/__mock/endpoints";

type Rules = HashMap<(HttpMethod, String), MockEndpoint>;

/// Shared rule table.
#[derive(Clone, Default)]
pub struct MockState {
    rules: Arc<RwLock<Rules>>,
}

impl MockState {
    /// Installs or replaces a rule.
    pub fn install(&self, endpoint: MockEndpoint) {
        self.rules.write().insert(endpoint.key(), endpoint);
    }

    /// Removes every rule.
    pub fn clear(&self) {
        self.rules.write().clear();
    }

    /// Looks up the rule for a method and path.
    #[must_use]
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Option<MockEndpoint> {
        self.rules.read().get(&(method, path.to_string())).cloned()
    }

    /// Number of installed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Returns `true` if no rules are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

/// Builds the mock server router over `state`.
pub fn router(state: MockState) -> Router {
    Router::new()
        .route(CONTROL_PATH, put(install_endpoint).delete(clear_endpoints))
        .fallback(serve_endpoint)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({ "code": code, "message": message })),
    )
        .into_response()
}

async fn install_endpoint(
    State(state): State<MockState>,
    Json(mut endpoint): Json<MockEndpoint>,
) -> Response {
    if StatusCode::from_u16(endpoint.status_code).is_err() {
        return error_body(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            format!("status code {} is not valid", endpoint.status_code),
        );
    }
    endpoint.path = match normalize_path(&endpoint.path) {
        Ok(path) => path,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, "invalid_path", e.to_string()),
    };

    debug!(method = %endpoint.method, path = %endpoint.path, status = endpoint.status_code, "mock rule installed");
    state.install(endpoint);
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_endpoints(State(state): State<MockState>) -> StatusCode {
    state.clear();
    debug!("mock rules cleared");
    StatusCode::NO_CONTENT
}

async fn serve_endpoint(State(state): State<MockState>, method: Method, uri: Uri) -> Response {
    let path = normalize_path(uri.path()).unwrap_or_else(|_| uri.path().to_string());
    let path = path.as_str();
    let rule = method
        .as_str()
        .parse::<HttpMethod>()
        .ok()
        .and_then(|m| state.lookup(m, path));

    let Some(rule) = rule else {
        warn!(%method, path, "no mock rule matched");
        return error_body(
            StatusCode::NOT_FOUND,
            "mock_not_found",
            format!("no mock endpoint for {method} {path}"),
        );
    };

    let status = StatusCode::from_u16(rule.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = if rule.is_json() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    (status, [(header::CONTENT_TYPE, content_type)], rule.body).into_response()
}

/// A mock server running on a background task.
///
/// The server stops when the handle is dropped.
pub struct MockServerHandle {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockServerHandle {
    /// Binds an ephemeral port on 127.0.0.1 and starts serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = MockState::default();
        let app = router(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "mock server stopped");
            }
        });

        info!(%addr, "mock external API listening");
        Ok(Self { addr, state, task })
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Direct access to the rule table.
    #[must_use]
    pub const fn state(&self) -> &MockState {
        &self.state
    }
}

impl Drop for MockServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
