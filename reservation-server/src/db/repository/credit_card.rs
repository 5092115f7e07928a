//! Credit Card Hold Repository

use super::{RepoError, RepoResult};
use shared::models::CreditCardHold;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, reservation_id, last_four_digits, expiry_month, expiry_year, created_at";

#[derive(Debug, Clone)]
pub struct NewCardHold {
    pub last_four_digits: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
}

pub async fn find_by_reservation<'e>(
    ex: impl SqliteExecutor<'e>,
    reservation_id: i64,
) -> RepoResult<Option<CreditCardHold>> {
    let row = sqlx::query_as::<_, CreditCardHold>(&format!(
        "SELECT {COLUMNS} FROM credit_card_holds WHERE reservation_id = ?"
    ))
    .bind(reservation_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    hold: &NewCardHold,
) -> RepoResult<CreditCardHold> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO credit_card_holds (id, reservation_id, last_four_digits, expiry_month, expiry_year, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(reservation_id)
    .bind(&hold.last_four_digits)
    .bind(hold.expiry_month)
    .bind(hold.expiry_year)
    .bind(shared::util::now_millis())
    .execute(&mut *conn)
    .await?;

    find_by_reservation(&mut *conn, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to store card hold".into()))
}
