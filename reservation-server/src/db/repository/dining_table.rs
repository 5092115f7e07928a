//! Dining Table Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, table_number, capacity, is_available, created_at, updated_at";

pub async fn find_all<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<Vec<DiningTable>> {
    let rows = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables ORDER BY table_number"
    ))
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let row = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dining_tables")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &SqlitePool, data: &DiningTableCreate) -> RepoResult<DiningTable> {
    if data.table_number <= 0 || data.capacity <= 0 {
        return Err(RepoError::Validation(
            "table number and capacity must be positive".into(),
        ));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO dining_tables (id, table_number, capacity, is_available, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(data.table_number)
    .bind(data.capacity)
    .bind(data.is_available.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

/// Capacity is immutable, so only number and availability are touched.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &DiningTableUpdate,
) -> RepoResult<DiningTable> {
    if data.table_number.is_some_and(|n| n <= 0) {
        return Err(RepoError::Validation("table number must be positive".into()));
    }

    let result = sqlx::query(
        "UPDATE dining_tables SET table_number = COALESCE(?1, table_number), is_available = COALESCE(?2, is_available), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.table_number)
    .bind(data.is_available)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dining table {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dining table {id} not found")))
}

/// Whether a non-cancelled reservation holds this table on `from` or later.
/// Stale holds on past dates do not count.
pub async fn has_active_reservations(
    pool: &SqlitePool,
    id: i64,
    from: NaiveDate,
) -> RepoResult<bool> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reservation_tables WHERE table_id = ? AND released = 0 AND service_date >= ?",
    )
    .bind(id)
    .bind(from)
    .fetch_one(pool)
    .await?;
    Ok(n > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM dining_tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
