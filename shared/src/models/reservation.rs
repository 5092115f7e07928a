//! Reservation Model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{CreditCardHold, DiningTable};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse the wire/database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the reservation still holds its tables
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// PENDING may move to CONFIRMED or CANCELLED. Re-applying the current
    /// status is allowed and changes nothing.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        *self == next || matches!((self, next), (Self::Pending, Self::Confirmed | Self::Cancelled))
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a card hold is attached to the reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum HoldingFeeStatus {
    Required,
    NotRequired,
}

impl HoldingFeeStatus {
    pub fn for_high_traffic(is_high_traffic: bool) -> Self {
        if is_high_traffic {
            Self::Required
        } else {
            Self::NotRequired
        }
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub starts_at: NaiveDateTime,
    pub service_date: NaiveDate,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub holding_fee_status: HoldingFeeStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One table held by one reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableAssignment {
    pub reservation_id: i64,
    pub table_id: i64,
    pub service_date: NaiveDate,
    pub status: ReservationStatus,
}

/// Contact info of the reservation owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_guest: bool,
}

/// Reservation with tables, owner and card hold (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub tables: Vec<DiningTable>,
    pub user: ReservationContact,
    pub credit_card: Option<CreditCardHold>,
}
