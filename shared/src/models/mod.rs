//! Data models
//!
//! Shared between the reservation server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, timestamps are epoch millis.

pub mod credit_card;
pub mod dining_table;
pub mod high_traffic_date;
pub mod points;
pub mod reservation;
pub mod user;

// Re-exports
pub use credit_card::*;
pub use dining_table::*;
pub use high_traffic_date::*;
pub use points::*;
pub use reservation::*;
pub use user::*;
