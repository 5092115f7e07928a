//! Reservation Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::ReservationDetail;
use validator::Validate;

use crate::auth::MaybeUser;
use crate::booking::service::{self, BookingPolicy, BookingRequest};
use crate::booking::CreditCardInput;
use crate::core::ServerState;
use crate::utils::time::{parse_date_time, today};
use crate::utils::validation::{MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_body};
use crate::utils::{AppResult, JsonBody};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, max = MAX_NAME_LEN))]
    pub name: String,
    #[validate(email, length(max = MAX_EMAIL_LEN))]
    pub email: String,
    #[validate(length(min = 1, max = MAX_SHORT_TEXT_LEN))]
    pub phone: String,
    /// Start of the reservation (RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`)
    pub date: String,
    pub number_of_guests: i32,
    /// Explicit seating; omitted lets the server pick
    pub table_ids: Option<Vec<i64>>,
    pub credit_card: Option<CreditCardInput>,
}

/// POST /api/reservations
pub async fn create(
    State(state): State<ServerState>,
    MaybeUser(caller): MaybeUser,
    JsonBody(req): JsonBody<CreateReservationRequest>,
) -> AppResult<Json<ReservationDetail>> {
    validate_body(&req)?;
    let request = BookingRequest {
        name: req.name,
        email: req.email,
        phone: Some(req.phone.trim().to_string()),
        starts_at: parse_date_time(&req.date)?,
        party_size: req.number_of_guests,
        table_ids: req.table_ids,
        credit_card: req.credit_card,
    };

    let detail = service::create_reservation(
        &state.pool,
        BookingPolicy::from(&state.config),
        caller.as_ref(),
        &request,
        today(),
    )
    .await?;
    Ok(Json(detail))
}
