//! High-Traffic Date Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date on which reservations require a card hold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HighTrafficDate {
    pub id: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: i64,
}
