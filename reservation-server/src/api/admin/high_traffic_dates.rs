//! Admin High-Traffic Date Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::HighTrafficDate;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::{RepoError, high_traffic_date};
use crate::utils::time::parse_date;
use crate::utils::validation::{MAX_NOTE_LEN, validate_body};
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

#[derive(Debug, Deserialize, Validate)]
pub struct HighTrafficDateCreate {
    pub date: String,
    #[validate(length(max = MAX_NOTE_LEN))]
    pub description: Option<String>,
}

/// GET /api/admin/high-traffic-dates
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<HighTrafficDate>>> {
    Ok(Json(high_traffic_date::find_all(&state.pool).await?))
}

/// POST /api/admin/high-traffic-dates
pub async fn create(
    State(state): State<ServerState>,
    JsonBody(req): JsonBody<HighTrafficDateCreate>,
) -> AppResult<Json<HighTrafficDate>> {
    validate_body(&req)?;
    let date = parse_date(&req.date)?;
    let created = high_traffic_date::create(&state.pool, date, req.description.as_deref())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::HighTrafficDateExists,
                format!("{date} is already a high-traffic date"),
            ),
            other => other.into(),
        })?;
    tracing::info!(date = %date, "High-traffic date added");
    Ok(Json(created))
}

/// DELETE /api/admin/high-traffic-dates/{id}
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if !high_traffic_date::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::HighTrafficDateNotFound));
    }
    tracing::info!(id, "High-traffic date removed");
    Ok(Json(true))
}
