//! Admin User and Points Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{PointsSummary, User};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, points, user};
use crate::security_log;
use crate::utils::validation::{MAX_NOTE_LEN, validate_body};
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFlagUpdate {
    pub is_admin: bool,
}

/// Points change; `points` is a signed delta
#[derive(Debug, Deserialize, Validate)]
pub struct PointsAdjustment {
    pub points: i64,
    #[validate(length(max = MAX_NOTE_LEN))]
    pub reason: Option<String>,
}

fn user_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
}

fn user_error(id: i64, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => user_not_found(id),
        other => other.into(),
    }
}

/// GET /api/admin/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(user::find_all(&state.pool).await?))
}

/// PUT /api/admin/users/{id}/admin
pub async fn set_admin(
    State(state): State<ServerState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<AdminFlagUpdate>,
) -> AppResult<Json<User>> {
    if id == caller.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "You cannot change your own admin status",
        ));
    }
    let updated = user::set_admin(&state.pool, id, req.is_admin)
        .await
        .map_err(|e| user_error(id, e))?;
    security_log!(
        "INFO",
        "admin_flag_changed",
        target_user = id,
        is_admin = req.is_admin,
        by = caller.id
    );
    Ok(Json(updated))
}

/// DELETE /api/admin/users/{id} - removes reservations and ledger too
pub async fn delete(
    State(state): State<ServerState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == caller.id {
        return Err(AppError::with_message(
            ErrorCode::CannotDeleteSelf,
            "You cannot delete your own account",
        ));
    }
    if !user::delete(&state.pool, id).await? {
        return Err(user_not_found(id));
    }
    security_log!("INFO", "user_deleted", target_user = id, by = caller.id);
    Ok(Json(true))
}

async fn summary(state: &ServerState, id: i64) -> AppResult<PointsSummary> {
    let account = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let transactions = points::list_for_user(&state.pool, id).await?;
    Ok(PointsSummary {
        user_id: id,
        earned_points: account.earned_points,
        transactions,
    })
}

/// GET /api/admin/users/{id}/points
pub async fn get_points(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PointsSummary>> {
    Ok(Json(summary(&state, id).await?))
}

/// PUT /api/admin/users/{id}/points
pub async fn adjust_points(
    State(state): State<ServerState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<PointsAdjustment>,
) -> AppResult<Json<PointsSummary>> {
    validate_body(&req)?;
    if req.points == 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "points must not be zero",
        ));
    }

    let entry = points::adjust(&state.pool, id, req.points, req.reason.as_deref(), Some(caller.id))
        .await
        .map_err(|e| match e {
            RepoError::Validation(msg) => AppError::with_message(ErrorCode::InsufficientPoints, msg),
            other => user_error(id, other),
        })?;
    tracing::info!(
        user_id = id,
        delta = entry.delta,
        balance = entry.balance_after,
        by = caller.id,
        "Points adjusted"
    );
    Ok(Json(summary(&state, id).await?))
}
