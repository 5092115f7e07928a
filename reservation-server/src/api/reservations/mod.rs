//! Reservation Routes
//!
//! Creation is public; a bearer token, when sent, links the reservation to
//! the caller.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::CreateReservationRequest;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reservations", post(handler::create))
}
