//! Admin Dining Table Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, dining_table};
use crate::utils::time::today;
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

fn table_error(id: Option<i64>, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => AppError::with_message(
            ErrorCode::TableNotFound,
            format!("Table {} not found", id.unwrap_or_default()),
        ),
        RepoError::Duplicate(_) => AppError::new(ErrorCode::TableNumberExists),
        other => other.into(),
    }
}

/// GET /api/admin/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(dining_table::find_all(&state.pool).await?))
}

/// POST /api/admin/tables
pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::create(&state.pool, &payload)
        .await
        .map_err(|e| table_error(None, e))?;
    tracing::info!(table_id = table.id, number = table.table_number, capacity = table.capacity, "Dining table created");
    Ok(Json(table))
}

/// PUT /api/admin/tables/{id} - number and availability only
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::update(&state.pool, id, &payload)
        .await
        .map_err(|e| table_error(Some(id), e))?;
    tracing::info!(table_id = id, "Dining table updated");
    Ok(Json(table))
}

/// DELETE /api/admin/tables/{id}
///
/// Refused while an active reservation holds the table today or later.
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    if dining_table::find_by_id(&state.pool, id).await?.is_none() {
        return Err(table_error(Some(id), RepoError::NotFound(String::new())));
    }
    if dining_table::has_active_reservations(&state.pool, id, today()).await? {
        return Err(AppError::with_message(
            ErrorCode::TableHasReservations,
            "Table has active reservations from today onwards",
        ));
    }
    let deleted = dining_table::delete(&state.pool, id).await?;
    tracing::info!(table_id = id, "Dining table deleted");
    Ok(Json(deleted))
}
