//! Credit Card Hold Model
//!
//! Only hold metadata is kept. Full card numbers and CVV are never stored.

use serde::{Deserialize, Serialize};

/// Card hold attached to a high-traffic reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CreditCardHold {
    pub id: i64,
    pub reservation_id: i64,
    pub last_four_digits: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub created_at: i64,
}
