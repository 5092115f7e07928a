//! High-Traffic Date Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::HighTrafficDate;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, date, description, created_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<HighTrafficDate>> {
    let rows = sqlx::query_as::<_, HighTrafficDate>(&format!(
        "SELECT {COLUMNS} FROM high_traffic_dates ORDER BY date"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<HighTrafficDate>> {
    let row = sqlx::query_as::<_, HighTrafficDate>(&format!(
        "SELECT {COLUMNS} FROM high_traffic_dates WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn is_high_traffic<'e>(ex: impl SqliteExecutor<'e>, date: NaiveDate) -> RepoResult<bool> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM high_traffic_dates WHERE date = ?")
        .bind(date)
        .fetch_one(ex)
        .await?;
    Ok(n > 0)
}

pub async fn create(
    pool: &SqlitePool,
    date: NaiveDate,
    description: Option<&str>,
) -> RepoResult<HighTrafficDate> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO high_traffic_dates (id, date, description, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(id)
    .bind(date)
    .bind(description)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create high-traffic date".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM high_traffic_dates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_create_lookup_delete() {
        let pool = test_pool().await;
        let htd = create(&pool, day("2030-12-31"), Some("New Year's Eve"))
            .await
            .unwrap();
        assert_eq!(htd.description.as_deref(), Some("New Year's Eve"));

        assert!(is_high_traffic(&pool, day("2030-12-31")).await.unwrap());
        assert!(!is_high_traffic(&pool, day("2030-12-30")).await.unwrap());

        assert!(delete(&pool, htd.id).await.unwrap());
        assert!(!is_high_traffic(&pool, day("2030-12-31")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_date_rejected_and_sorted() {
        let pool = test_pool().await;
        create(&pool, day("2030-02-14"), None).await.unwrap();
        create(&pool, day("2030-01-01"), None).await.unwrap();
        let err = create(&pool, day("2030-02-14"), None).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let dates: Vec<_> = find_all(&pool).await.unwrap().into_iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day("2030-01-01"), day("2030-02-14")]);
    }
}
