//! Shared handler state.

use std::sync::Arc;

use axum::http::HeaderMap;
use memberdesk_application::ports::ExternalApi;
use memberdesk_application::use_cases::MemberService;

/// Header naming the calling user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Member use cases.
    pub members: MemberService,
    /// Downstream API behind `/api/v1/external`.
    pub external: Arc<dyn ExternalApi>,
    /// Caller used when a request names none.
    pub default_user: Option<String>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(
        members: MemberService,
        external: Arc<dyn ExternalApi>,
        default_user: Option<String>,
    ) -> Self {
        Self {
            members,
            external,
            default_user,
        }
    }

    /// The caller named by `x-user-id`, else the default user.
    pub(crate) fn caller(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_user.clone())
    }
}
