//! Authentication Routes
//!
//! All four routes are public; `/me` reads an optional bearer token.
//! Login and registration are rate limited per client IP.

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{login_rate_limit, register_rate_limit};
use crate::core::ServerState;

pub use handler::{AuthResponse, LoginRequest, RegisterRequest};

pub fn router(state: ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let register = Router::new()
        .route("/api/auth/register", post(handler::register))
        .route_layer(middleware::from_fn_with_state(state, register_rate_limit));

    Router::new()
        .merge(login)
        .merge(register)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/forgot-password", post(handler::forgot_password))
}
