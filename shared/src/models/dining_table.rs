//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// `capacity` is fixed at creation; only `table_number` and
/// `is_available` can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i32,
    pub capacity: i32,
    pub is_available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub table_number: i32,
    pub capacity: i32,
    pub is_available: Option<bool>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub table_number: Option<i32>,
    pub is_available: Option<bool>,
}

/// One or two tables proposed for a single party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCombination {
    /// Member tables ordered by table number
    pub tables: Vec<DiningTable>,
    pub total_capacity: i32,
}

impl TableCombination {
    pub fn table_ids(&self) -> Vec<i64> {
        self.tables.iter().map(|t| t.id).collect()
    }

    pub fn table_numbers(&self) -> Vec<i32> {
        self.tables.iter().map(|t| t.table_number).collect()
    }
}
