//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{ReservationContact, User};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteExecutor;

const COLUMNS: &str = "id, email, name, phone, password_hash, is_guest, is_admin, earned_points, created_at, updated_at";

/// Insert payload; `email` must already be normalized
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub is_guest: bool,
    pub is_admin: bool,
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_by_email<'e>(
    ex: impl SqliteExecutor<'e>,
    email: &str,
) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users ORDER BY name"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_contact<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<ReservationContact>> {
    let row = sqlx::query_as::<_, ReservationContact>(
        "SELECT name, email, phone, is_guest FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn create(conn: &mut sqlx::SqliteConnection, data: &NewUser) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, email, name, phone, password_hash, is_guest, is_admin, earned_points, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.password_hash)
    .bind(data.is_guest)
    .bind(data.is_admin)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Turn a guest into a registered account, keeping its reservations
pub async fn upgrade_guest(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    phone: Option<&str>,
    password_hash: &str,
) -> RepoResult<User> {
    sqlx::query(
        "UPDATE users SET name = ?1, phone = COALESCE(?2, phone), password_hash = ?3, is_guest = 0, updated_at = ?4 WHERE id = ?5 AND is_guest = 1",
    )
    .bind(name)
    .bind(phone)
    .bind(password_hash)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    phone: Option<&str>,
) -> RepoResult<User> {
    let result = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), updated_at = ?3 WHERE id = ?4",
    )
    .bind(name)
    .bind(phone)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn set_admin(pool: &SqlitePool, id: i64, is_admin: bool) -> RepoResult<User> {
    let result = sqlx::query("UPDATE users SET is_admin = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_admin)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Deletes the user together with reservations and ledger (cascade)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{insert_user, test_pool};

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "guest@example.com").await;
        assert!(user.is_guest);
        assert_eq!(user.earned_points, 0);

        let found = find_by_email(&pool, "guest@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(find_by_email(&pool, "nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        insert_user(&pool, "dup@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let err = create(
            &mut conn,
            &NewUser {
                email: "dup@example.com".into(),
                name: "Again".into(),
                phone: None,
                password_hash: None,
                is_guest: false,
                is_admin: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_upgrade_guest() {
        let pool = test_pool().await;
        let guest = insert_user(&pool, "g@example.com").await;

        let user = upgrade_guest(&pool, guest.id, "Real Name", None, "$argon2id$hash")
            .await
            .unwrap();
        assert!(!user.is_guest);
        assert_eq!(user.name, "Real Name");
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.password_hash.as_deref(), Some("$argon2id$hash"));
    }

    #[tokio::test]
    async fn test_update_profile_and_admin_flag() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "p@example.com").await;

        let updated = update_profile(&pool, user.id, None, Some("555-0199"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Test User");
        assert_eq!(updated.phone.as_deref(), Some("555-0199"));

        let admin = set_admin(&pool, user.id, true).await.unwrap();
        assert!(admin.is_admin);

        assert!(matches!(
            set_admin(&pool, 1, true).await.unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "d@example.com").await;
        assert!(delete(&pool, user.id).await.unwrap());
        assert!(!delete(&pool, user.id).await.unwrap());
        assert!(find_contact(&pool, user.id).await.unwrap().is_none());
    }
}
