//! Reservation Repository
//!
//! Table assignments live in `reservation_tables`. A partial unique index on
//! `(table_id, service_date) WHERE released = 0` makes a second active
//! assignment of the same table on the same date fail with
//! [`RepoError::Duplicate`].

use super::{RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime};
use shared::models::{
    DiningTable, HoldingFeeStatus, Reservation, ReservationStatus, TableAssignment,
};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, user_id, starts_at, service_date, party_size, status, holding_fee_status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: i64,
    pub starts_at: NaiveDateTime,
    pub party_size: i32,
    pub holding_fee_status: HoldingFeeStatus,
}

/// Admin listing filter
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

pub async fn find_by_id<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn list(pool: &SqlitePool, filter: &ReservationFilter) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE (?1 IS NULL OR service_date = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY starts_at, created_at"
    ))
    .bind(filter.date)
    .bind(filter.status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE user_id = ? ORDER BY starts_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active table assignments on a service date
pub async fn find_assignments_for_date<'e>(
    ex: impl SqliteExecutor<'e>,
    date: NaiveDate,
) -> RepoResult<Vec<TableAssignment>> {
    let rows = sqlx::query_as::<_, TableAssignment>(
        "SELECT rt.reservation_id, rt.table_id, rt.service_date, r.status FROM reservation_tables rt JOIN reservations r ON r.id = rt.reservation_id WHERE rt.service_date = ? AND rt.released = 0",
    )
    .bind(date)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn tables_for<'e>(
    ex: impl SqliteExecutor<'e>,
    reservation_id: i64,
) -> RepoResult<Vec<DiningTable>> {
    let rows = sqlx::query_as::<_, DiningTable>(
        "SELECT t.id, t.table_number, t.capacity, t.is_available, t.created_at, t.updated_at FROM reservation_tables rt JOIN dining_tables t ON t.id = rt.table_id WHERE rt.reservation_id = ? ORDER BY t.table_number",
    )
    .bind(reservation_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewReservation) -> RepoResult<Reservation> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO reservations (id, user_id, starts_at, service_date, party_size, status, holding_fee_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(data.starts_at)
    .bind(data.starts_at.date())
    .bind(data.party_size)
    .bind(ReservationStatus::Pending)
    .bind(data.holding_fee_status)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

/// Hold tables for a reservation. Fails with `Duplicate` when one of them
/// is already held on that date.
pub async fn assign_tables(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    service_date: NaiveDate,
    table_ids: &[i64],
) -> RepoResult<()> {
    for table_id in table_ids {
        sqlx::query(
            "INSERT INTO reservation_tables (reservation_id, table_id, service_date, released) VALUES (?1, ?2, ?3, 0)",
        )
        .bind(reservation_id)
        .bind(table_id)
        .bind(service_date)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn clear_tables(conn: &mut SqliteConnection, reservation_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM reservation_tables WHERE reservation_id = ?")
        .bind(reservation_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Set the status; cancelling also releases the held tables.
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: ReservationStatus,
) -> RepoResult<Reservation> {
    let result = sqlx::query("UPDATE reservations SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {id} not found")));
    }

    if !status.is_active() {
        sqlx::query("UPDATE reservation_tables SET released = 1 WHERE reservation_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

pub async fn touch(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE reservations SET updated_at = ?1 WHERE id = ?2")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{insert_table, insert_user, test_pool};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    async fn book(pool: &SqlitePool, user_id: i64, starts_at: NaiveDateTime, tables: &[i64]) -> RepoResult<Reservation> {
        let mut tx = pool.begin().await?;
        let reservation = insert(
            &mut tx,
            &NewReservation {
                user_id,
                starts_at,
                party_size: 2,
                holding_fee_status: HoldingFeeStatus::NotRequired,
            },
        )
        .await?;
        assign_tables(&mut tx, reservation.id, starts_at.date(), tables).await?;
        tx.commit().await?;
        Ok(reservation)
    }

    #[tokio::test]
    async fn test_insert_and_assignments() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com").await;
        let t1 = insert_table(&pool, 1, 2).await;
        let t2 = insert_table(&pool, 2, 2).await;

        let r = book(&pool, user.id, at("2030-05-01", "19:30"), &[t1.id, t2.id])
            .await
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.service_date, NaiveDate::from_ymd_opt(2030, 5, 1).unwrap());

        let date = r.service_date;
        let assignments = find_assignments_for_date(&pool, date).await.unwrap();
        assert_eq!(assignments.len(), 2);
        assert!(assignments.iter().all(|a| a.reservation_id == r.id));

        let tables = tables_for(&pool, r.id).await.unwrap();
        assert_eq!(tables.iter().map(|t| t.table_number).collect::<Vec<_>>(), vec![1, 2]);

        let other_day = NaiveDate::from_ymd_opt(2030, 5, 2).unwrap();
        assert!(find_assignments_for_date(&pool, other_day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_table_same_date_conflicts() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com").await;
        let t1 = insert_table(&pool, 1, 2).await;

        book(&pool, user.id, at("2030-05-01", "12:00"), &[t1.id]).await.unwrap();
        let err = book(&pool, user.id, at("2030-05-01", "20:00"), &[t1.id])
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Rolled back: only the first reservation exists
        let all = list(&pool, &ReservationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        // Different date is fine
        book(&pool, user.id, at("2030-05-02", "12:00"), &[t1.id]).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_releases_tables() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com").await;
        let t1 = insert_table(&pool, 1, 2).await;

        let r = book(&pool, user.id, at("2030-05-01", "12:00"), &[t1.id]).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let cancelled = update_status(&mut conn, r.id, ReservationStatus::Cancelled)
            .await
            .unwrap();
        drop(conn);
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(find_assignments_for_date(&pool, r.service_date).await.unwrap().is_empty());

        // Table can be booked again on that date
        book(&pool, user.id, at("2030-05-01", "20:00"), &[t1.id]).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com").await;
        let t1 = insert_table(&pool, 1, 2).await;
        let t2 = insert_table(&pool, 2, 2).await;

        let r1 = book(&pool, user.id, at("2030-05-01", "12:00"), &[t1.id]).await.unwrap();
        book(&pool, user.id, at("2030-05-02", "12:00"), &[t2.id]).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        update_status(&mut conn, r1.id, ReservationStatus::Confirmed).await.unwrap();
        drop(conn);

        let by_date = list(
            &pool,
            &ReservationFilter {
                date: Some(r1.service_date),
                status: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(by_date.len(), 1);

        let pending = list(
            &pool,
            &ReservationFilter {
                date: None,
                status: Some(ReservationStatus::Pending),
            },
        )
        .await
        .unwrap();
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].id, r1.id);

        assert_eq!(list_by_user(&pool, user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_assignments() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "a@example.com").await;
        let t1 = insert_table(&pool, 1, 2).await;
        let r = book(&pool, user.id, at("2030-05-01", "12:00"), &[t1.id]).await.unwrap();

        assert!(delete(&pool, r.id).await.unwrap());
        assert!(find_by_id(&pool, r.id).await.unwrap().is_none());
        assert!(find_assignments_for_date(&pool, r.service_date).await.unwrap().is_empty());
    }
}
