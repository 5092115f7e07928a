//! User Profile Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::{PointsSummary, ReservationDetail, User};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::booking::service;
use crate::core::ServerState;
use crate::db::repository::{RepoError, points, reservation, user};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_body};
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    /// Newest first
    pub reservations: Vec<ReservationDetail>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = MAX_NAME_LEN))]
    pub name: Option<String>,
    #[validate(length(max = MAX_SHORT_TEXT_LEN))]
    pub phone: Option<String>,
}

async fn load_user(state: &ServerState, id: i64) -> AppResult<User> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
}

/// GET /api/user/profile
pub async fn get_profile(
    State(state): State<ServerState>,
    caller: CurrentUser,
) -> AppResult<Json<ProfileResponse>> {
    let account = load_user(&state, caller.id).await?;
    let own = reservation::list_by_user(&state.pool, caller.id).await?;
    let reservations = service::load_details(&state.pool, own).await?;
    Ok(Json(ProfileResponse {
        user: account,
        reservations,
    }))
}

/// PUT /api/user/profile
pub async fn update_profile(
    State(state): State<ServerState>,
    caller: CurrentUser,
    JsonBody(req): JsonBody<ProfileUpdateRequest>,
) -> AppResult<Json<User>> {
    validate_body(&req)?;
    let name = req.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(AppError::validation("name must not be empty"));
    }

    let updated = user::update_profile(&state.pool, caller.id, name, req.phone.as_deref())
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
            other => other.into(),
        })?;
    tracing::info!(user_id = caller.id, "Profile updated");
    Ok(Json(updated))
}

/// GET /api/user/points
pub async fn get_points(
    State(state): State<ServerState>,
    caller: CurrentUser,
) -> AppResult<Json<PointsSummary>> {
    let account = load_user(&state, caller.id).await?;
    let transactions = points::list_for_user(&state.pool, caller.id).await?;
    Ok(Json(PointsSummary {
        user_id: account.id,
        earned_points: account.earned_points,
        transactions,
    }))
}
