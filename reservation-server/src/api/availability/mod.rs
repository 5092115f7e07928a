//! Table Availability Route (public)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::AvailabilityRequest;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/tables/available", post(handler::check))
}
