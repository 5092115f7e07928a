//! Startup seeding: default floor plan and bootstrap administrator

use shared::models::DiningTableCreate;
use shared::{AppError, AppResult};
use sqlx::SqlitePool;

use super::repository::{dining_table, user};
use crate::auth::hash_password;
use crate::core::Config;

/// Capacities of the default floor plan, numbered from 1
pub const DEFAULT_TABLE_CAPACITIES: [i32; 8] = [2, 2, 4, 4, 6, 6, 8, 8];

pub async fn run(pool: &SqlitePool, config: &Config) -> AppResult<()> {
    if config.seed_default_tables {
        seed_tables(pool).await?;
    }
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        ensure_admin(pool, email, password).await?;
    }
    Ok(())
}

/// Insert the default tables into an empty database. Returns the number created.
pub async fn seed_tables(pool: &SqlitePool) -> AppResult<usize> {
    if dining_table::count(pool).await? > 0 {
        return Ok(0);
    }

    for (i, capacity) in DEFAULT_TABLE_CAPACITIES.iter().enumerate() {
        dining_table::create(
            pool,
            &DiningTableCreate {
                table_number: i as i32 + 1,
                capacity: *capacity,
                is_available: Some(true),
            },
        )
        .await?;
    }

    tracing::info!(count = DEFAULT_TABLE_CAPACITIES.len(), "Seeded default dining tables");
    Ok(DEFAULT_TABLE_CAPACITIES.len())
}

/// Create the administrator account, or promote an existing user with that email
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password: &str) -> AppResult<()> {
    let email = shared::util::normalize_email(email);

    if let Some(existing) = user::find_by_email(pool, &email).await? {
        if !existing.is_admin {
            user::set_admin(pool, existing.id, true).await?;
            tracing::info!(email = %email, "Promoted existing user to administrator");
        }
        return Ok(());
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;
    let mut conn = pool.acquire().await.map_err(super::repository::RepoError::from)?;
    user::create(
        &mut conn,
        &user::NewUser {
            email: email.clone(),
            name: "Administrator".into(),
            phone: None,
            password_hash: Some(password_hash),
            is_guest: false,
            is_admin: true,
        },
    )
    .await?;

    tracing::info!(email = %email, "Created bootstrap administrator");
    Ok(())
}
