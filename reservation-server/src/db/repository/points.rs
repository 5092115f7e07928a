//! Loyalty Points Ledger Repository
//!
//! `users.earned_points` is the running balance; every change also appends a
//! row to `points_transactions` in the same transaction.

use super::{RepoError, RepoResult};
use shared::models::PointsTransaction;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, user_id, delta, balance_after, reason, created_by, created_at";

/// Apply `delta` to the user's balance and record it.
///
/// Fails with `Validation` when the balance would drop below zero and with
/// `NotFound` for an unknown user. Nothing is written in either case.
pub async fn adjust(
    pool: &SqlitePool,
    user_id: i64,
    delta: i64,
    reason: Option<&str>,
    created_by: Option<i64>,
) -> RepoResult<PointsTransaction> {
    let mut tx = pool.begin().await?;

    let balance: Option<(i64,)> = sqlx::query_as("SELECT earned_points FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let (balance,) = balance.ok_or_else(|| RepoError::NotFound(format!("User {user_id} not found")))?;

    let balance_after = balance
        .checked_add(delta)
        .ok_or_else(|| RepoError::Validation("points value out of range".into()))?;
    if balance_after < 0 {
        return Err(RepoError::Validation(format!(
            "insufficient points: balance {balance}, change {delta}"
        )));
    }

    let now = shared::util::now_millis();
    sqlx::query("UPDATE users SET earned_points = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(balance_after)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO points_transactions (id, user_id, delta, balance_after, reason, created_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(user_id)
    .bind(delta)
    .bind(balance_after)
    .bind(reason)
    .bind(created_by)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(PointsTransaction {
        id,
        user_id,
        delta,
        balance_after,
        reason: reason.map(str::to_string),
        created_by,
        created_at: now,
    })
}

/// Ledger entries, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<PointsTransaction>> {
    let rows = sqlx::query_as::<_, PointsTransaction>(&format!(
        "SELECT {COLUMNS} FROM points_transactions WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{insert_user, test_pool};
    use crate::db::repository::user;

    #[tokio::test]
    async fn test_adjust_updates_balance_and_ledger() {
        let pool = test_pool().await;
        let u = insert_user(&pool, "p@example.com").await;

        let tx = adjust(&pool, u.id, 50, Some("welcome"), None).await.unwrap();
        assert_eq!(tx.balance_after, 50);
        let tx = adjust(&pool, u.id, -20, None, Some(42)).await.unwrap();
        assert_eq!(tx.balance_after, 30);
        assert_eq!(tx.created_by, Some(42));

        let reloaded = user::find_by_id(&pool, u.id).await.unwrap().unwrap();
        assert_eq!(reloaded.earned_points, 30);

        let ledger = list_for_user(&pool, u.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.iter().map(|t| t.delta).sum::<i64>(), 30);
    }

    #[tokio::test]
    async fn test_negative_balance_rejected() {
        let pool = test_pool().await;
        let u = insert_user(&pool, "p@example.com").await;
        adjust(&pool, u.id, 10, None, None).await.unwrap();

        let err = adjust(&pool, u.id, -11, None, None).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let reloaded = user::find_by_id(&pool, u.id).await.unwrap().unwrap();
        assert_eq!(reloaded.earned_points, 10);
        assert_eq!(list_for_user(&pool, u.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let pool = test_pool().await;
        let err = adjust(&pool, 12345, 5, None, None).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
