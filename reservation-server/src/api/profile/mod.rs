//! User Profile Routes (authenticated)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub use handler::{ProfileResponse, ProfileUpdateRequest};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/user", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/profile", get(handler::get_profile).put(handler::update_profile))
        .route("/points", get(handler::get_points))
}
