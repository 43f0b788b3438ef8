//! `/api/v1/members` handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use memberdesk_application::use_cases::{CreateMemberInput, UpdateMemberInput};
use memberdesk_domain::{Member, MemberUpdate, NewMember};

use crate::{ApiError, AppState};

/// Every `id` value of the query string, in order.
fn requested_ids(query: Option<&str>) -> Vec<String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key == "id")
                .map(|(_, value)| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Member>>, ApiError> {
    let ids = requested_ids(query.as_deref());
    Ok(Json(state.members.list(&ids).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Member>, ApiError> {
    Ok(Json(state.members.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let Json(member) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state
        .members
        .create(CreateMemberInput {
            member,
            caller: state.caller(&headers),
        })
        .await?;
    tracing::info!(id = %created.id, "member created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<MemberUpdate>, JsonRejection>,
) -> Result<Json<Member>, ApiError> {
    let Json(changes) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let updated = state
        .members
        .update(UpdateMemberInput {
            id,
            changes,
            caller: state.caller(&headers),
        })
        .await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.members.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
