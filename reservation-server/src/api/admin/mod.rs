//! Admin Routes
//!
//! Every route requires a token with the admin role.
//!
//! | Path | Method |
//! |------|--------|
//! | /api/admin/check | GET |
//! | /api/admin/reservations | GET |
//! | /api/admin/reservations/{id} | DELETE |
//! | /api/admin/reservations/{id}/status | PUT |
//! | /api/admin/reservations/{id}/tables | PUT |
//! | /api/admin/tables | GET, POST |
//! | /api/admin/tables/{id} | PUT, DELETE |
//! | /api/admin/users | GET |
//! | /api/admin/users/{id} | DELETE |
//! | /api/admin/users/{id}/admin | PUT |
//! | /api/admin/users/{id}/points | GET, PUT |
//! | /api/admin/high-traffic-dates | GET, POST |
//! | /api/admin/high-traffic-dates/{id} | DELETE |

mod high_traffic_dates;
mod reservations;
mod tables;
mod users;

use axum::{
    Json, Router, middleware,
    routing::{delete, get, put},
};
use serde_json::{Value, json};

use crate::auth::{CurrentUser, require_admin};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/check", get(check))
        .route("/reservations", get(reservations::list))
        .route("/reservations/{id}", delete(reservations::delete))
        .route("/reservations/{id}/status", put(reservations::update_status))
        .route("/reservations/{id}/tables", put(reservations::update_tables))
        .route("/tables", get(tables::list).post(tables::create))
        .route("/tables/{id}", put(tables::update).delete(tables::delete))
        .route("/users", get(users::list))
        .route("/users/{id}", delete(users::delete))
        .route("/users/{id}/admin", put(users::set_admin))
        .route("/users/{id}/points", get(users::get_points).put(users::adjust_points))
        .route(
            "/high-traffic-dates",
            get(high_traffic_dates::list).post(high_traffic_dates::create),
        )
        .route("/high-traffic-dates/{id}", delete(high_traffic_dates::delete))
        .route_layer(middleware::from_fn(require_admin))
}

/// GET /api/admin/check
async fn check(caller: CurrentUser) -> Json<Value> {
    Json(json!({
        "isAdmin": caller.is_admin(),
        "userId": caller.id,
        "email": caller.email,
    }))
}
