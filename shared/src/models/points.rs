//! Loyalty Points Ledger Model

use serde::{Deserialize, Serialize};

/// One balance change on a user's points account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PointsTransaction {
    pub id: i64,
    pub user_id: i64,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: Option<String>,
    /// Admin who made the change
    pub created_by: Option<i64>,
    pub created_at: i64,
}

/// Balance plus ledger history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSummary {
    pub user_id: i64,
    pub earned_points: i64,
    pub transactions: Vec<PointsTransaction>,
}
