//! Admin Reservation Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{ReservationDetail, ReservationStatus};

use crate::booking::service;
use crate::core::ServerState;
use crate::db::repository::reservation::{self, ReservationFilter};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ReservationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesUpdate {
    pub table_ids: Vec<i64>,
}

/// GET /api/admin/reservations?date=YYYY-MM-DD&status=PENDING
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ReservationDetail>>> {
    let date = query
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(parse_date)
        .transpose()?;
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(ReservationStatus::parse(&s.to_ascii_uppercase()).ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Unknown status: {s}"))
        })?),
        None => None,
    };

    let rows = reservation::list(&state.pool, &ReservationFilter { date, status }).await?;
    Ok(Json(service::load_details(&state.pool, rows).await?))
}

/// PUT /api/admin/reservations/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<StatusUpdate>,
) -> AppResult<Json<ReservationDetail>> {
    Ok(Json(service::change_status(&state.pool, id, req.status).await?))
}

/// PUT /api/admin/reservations/{id}/tables
pub async fn update_tables(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<TablesUpdate>,
) -> AppResult<Json<ReservationDetail>> {
    Ok(Json(service::reassign_tables(&state.pool, id, &req.table_ids).await?))
}

/// DELETE /api/admin/reservations/{id}
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    service::delete_reservation(&state.pool, id).await?;
    Ok(Json(true))
}
