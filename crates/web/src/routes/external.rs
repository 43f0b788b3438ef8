//! `/api/v1/external` proxy.

use axum::{
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{ApiError, AppState};

/// Forwards `GET` to the external API and relays its status and body.
pub async fn proxy(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let upstream = state.external.get(&path, query.as_deref()).await?;

    let status = StatusCode::from_u16(upstream.status.as_u16())
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;
    let content_type = upstream
        .header("content-type")
        .unwrap_or("application/json")
        .to_string();

    tracing::debug!(%path, status = status.as_u16(), "external call relayed");
    Ok((status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response())
}
