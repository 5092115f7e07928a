//! Table Availability Handler

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::booking::service::{self, Availability, BookingPolicy};
use crate::core::ServerState;
use crate::utils::time::parse_date;
use crate::utils::{AppResult, JsonBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// Calendar date; a time part is accepted and ignored
    pub date: String,
    pub number_of_guests: i32,
}

/// POST /api/tables/available
///
/// An empty `combinations` list means nothing fits; it is not an error.
pub async fn check(
    State(state): State<ServerState>,
    JsonBody(req): JsonBody<AvailabilityRequest>,
) -> AppResult<Json<Availability>> {
    let date = parse_date(&req.date)?;
    let availability = service::check_availability(
        &state.pool,
        BookingPolicy::from(&state.config),
        date,
        req.number_of_guests,
    )
    .await?;

    tracing::debug!(
        date = %date,
        party_size = req.number_of_guests,
        options = availability.combinations.len(),
        "Availability checked"
    );
    Ok(Json(availability))
}
