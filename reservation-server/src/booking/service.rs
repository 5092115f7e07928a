//! Booking workflow
//!
//! Loads the floor plan and the date's assignments, resolves a seating and
//! persists the reservation inside one transaction. The partial unique index
//! on `reservation_tables` rejects a concurrent writer that picked the same
//! table; server-picked seatings are re-resolved and retried.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use shared::models::{
    DiningTable, Reservation, ReservationDetail, ReservationStatus, TableCombination, User,
};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::{SqliteConnection, SqlitePool};

use super::holding_fee::{CreditCardInput, HoldingFee, card_hold_for};
use super::resolver;
use crate::auth::CurrentUser;
use crate::core::Config;
use crate::db::repository::reservation::NewReservation;
use crate::db::repository::{
    RepoError, credit_card, dining_table, high_traffic_date, reservation, user,
};

/// Attempts for server-picked seatings before the conflict is surfaced
pub const MAX_BOOKING_ATTEMPTS: usize = 3;

/// Limits applied to booking requests
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    pub max_party_size: i32,
    pub holding_fee_cents: i64,
}

impl From<&Config> for BookingPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_party_size: config.max_party_size,
            holding_fee_cents: config.holding_fee_cents,
        }
    }
}

impl BookingPolicy {
    pub fn check_party_size(&self, party_size: i32) -> AppResult<()> {
        if party_size < 1 || party_size > self.max_party_size {
            return Err(AppError::with_message(
                ErrorCode::PartySizeOutOfRange,
                format!("Party size must be between 1 and {}", self.max_party_size),
            )
            .with_detail("maxPartySize", self.max_party_size));
        }
        Ok(())
    }
}

/// Result of an availability query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub date: NaiveDate,
    pub number_of_guests: i32,
    /// Bookable tables on the date
    pub tables: Vec<DiningTable>,
    pub combinations: Vec<TableCombination>,
    pub recommended: Option<TableCombination>,
    #[serde(flatten)]
    pub holding_fee: HoldingFee,
}

/// A validated reservation request
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub starts_at: NaiveDateTime,
    pub party_size: i32,
    /// Explicit seating; `None` lets the server pick
    pub table_ids: Option<Vec<i64>>,
    pub credit_card: Option<CreditCardInput>,
}

pub async fn check_availability(
    pool: &SqlitePool,
    policy: BookingPolicy,
    date: NaiveDate,
    party_size: i32,
) -> AppResult<Availability> {
    policy.check_party_size(party_size)?;

    let tables = dining_table::find_all(pool).await?;
    let assignments = reservation::find_assignments_for_date(pool, date).await?;
    let is_high_traffic = high_traffic_date::is_high_traffic(pool, date).await?;

    let combinations = resolver::resolve(date, party_size, &tables, &assignments);
    let bookable = resolver::bookable_tables(date, &tables, &assignments)
        .into_iter()
        .cloned()
        .collect();

    Ok(Availability {
        date,
        number_of_guests: party_size,
        tables: bookable,
        recommended: combinations.first().cloned(),
        combinations,
        holding_fee: HoldingFee::for_date(is_high_traffic, policy.holding_fee_cents),
    })
}

/// Create a reservation for the caller, or for the email's owner when
/// anonymous. Unknown emails get a guest account.
pub async fn create_reservation(
    pool: &SqlitePool,
    policy: BookingPolicy,
    caller: Option<&CurrentUser>,
    request: &BookingRequest,
    today: NaiveDate,
) -> AppResult<ReservationDetail> {
    policy.check_party_size(request.party_size)?;
    let service_date = request.starts_at.date();
    if service_date < today {
        return Err(AppError::with_message(
            ErrorCode::ReservationDateInPast,
            format!("Cannot book {service_date}, today is {today}"),
        ));
    }

    let is_high_traffic = high_traffic_date::is_high_traffic(pool, service_date).await?;
    let fee = HoldingFee::for_date(is_high_traffic, policy.holding_fee_cents);
    let card_hold = card_hold_for(&fee, request.credit_card.as_ref(), today)?;

    let attempts = if request.table_ids.is_some() {
        1
    } else {
        MAX_BOOKING_ATTEMPTS
    };

    let mut attempt = 0;
    let reservation_id = loop {
        attempt += 1;
        match try_book(pool, caller, request, &fee, card_hold.as_ref()).await {
            Ok(id) => break id,
            Err(BookError::Conflict) if attempt < attempts => {
                tracing::debug!(attempt, date = %service_date, "Seating taken concurrently, re-resolving");
            }
            Err(BookError::Conflict) => {
                tracing::info!(date = %service_date, attempt, "Reservation lost table conflict");
                return Err(AppError::with_message(
                    ErrorCode::TableAlreadyBooked,
                    "The selected table was booked by someone else, please check availability again",
                ));
            }
            Err(BookError::App(e)) => return Err(e),
        }
    };

    tracing::info!(
        reservation_id,
        date = %service_date,
        party_size = request.party_size,
        high_traffic = is_high_traffic,
        "Reservation created"
    );
    load_detail(pool, reservation_id).await
}

enum BookError {
    Conflict,
    App(AppError),
}

impl From<RepoError> for BookError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(_) | RepoError::Busy(_) => BookError::Conflict,
            other => BookError::App(other.into()),
        }
    }
}

impl From<AppError> for BookError {
    fn from(err: AppError) -> Self {
        BookError::App(err)
    }
}

impl From<sqlx::Error> for BookError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::from(err).into()
    }
}

async fn try_book(
    pool: &SqlitePool,
    caller: Option<&CurrentUser>,
    request: &BookingRequest,
    fee: &HoldingFee,
    card_hold: Option<&credit_card::NewCardHold>,
) -> Result<i64, BookError> {
    let service_date = request.starts_at.date();
    let mut tx = pool.begin().await?;

    let tables = dining_table::find_all(&mut *tx).await?;
    let assignments = reservation::find_assignments_for_date(&mut *tx, service_date).await?;

    let seating = match &request.table_ids {
        Some(ids) => select_tables(service_date, request.party_size, ids, &tables, &assignments)?,
        None => resolver::resolve(service_date, request.party_size, &tables, &assignments)
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::NoTablesAvailable,
                    format!(
                        "No tables available for {} guests on {service_date}",
                        request.party_size
                    ),
                )
            })?,
    };

    let owner = owner_for(&mut tx, caller, request).await?;

    let created = reservation::insert(
        &mut tx,
        &NewReservation {
            user_id: owner.id,
            starts_at: request.starts_at,
            party_size: request.party_size,
            holding_fee_status: fee.holding_fee_status,
        },
    )
    .await?;
    reservation::assign_tables(&mut tx, created.id, service_date, &seating.table_ids()).await?;
    if let Some(hold) = card_hold {
        credit_card::insert(&mut tx, created.id, hold).await?;
    }

    tx.commit().await?;
    Ok(created.id)
}

/// The signed-in caller, or the account owning the request email (created
/// as a guest when missing)
async fn owner_for(
    conn: &mut SqliteConnection,
    caller: Option<&CurrentUser>,
    request: &BookingRequest,
) -> Result<User, BookError> {
    if let Some(caller) = caller {
        return user::find_by_id(&mut *conn, caller.id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into());
    }

    let email = shared::util::normalize_email(&request.email);
    if let Some(existing) = user::find_by_email(&mut *conn, &email).await? {
        return Ok(existing);
    }

    let guest = user::create(
        &mut *conn,
        &user::NewUser {
            email,
            name: request.name.trim().to_string(),
            phone: request.phone.clone(),
            password_hash: None,
            is_guest: true,
            is_admin: false,
        },
    )
    .await?;
    tracing::info!(user_id = guest.id, "Created guest user for reservation");
    Ok(guest)
}

/// Check an explicit seating: one or two distinct existing tables, switched
/// on, seating the party. A table already held on the date is a conflict.
fn select_tables(
    date: NaiveDate,
    party_size: i32,
    table_ids: &[i64],
    tables: &[DiningTable],
    assignments: &[shared::models::TableAssignment],
) -> Result<TableCombination, BookError> {
    let mut ids = table_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() || ids.len() > 2 || ids.len() != table_ids.len() {
        return Err(invalid_selection("select one or two distinct tables").into());
    }

    let reserved = resolver::reserved_table_ids(date, assignments);
    let mut chosen = Vec::with_capacity(ids.len());
    for id in &ids {
        let table = tables
            .iter()
            .find(|t| t.id == *id)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
            })?;
        if !table.is_available {
            return Err(invalid_selection(&format!("table {} is not available", table.table_number)).into());
        }
        if reserved.contains(id) {
            return Err(BookError::Conflict);
        }
        chosen.push(table.clone());
    }
    chosen.sort_by_key(|t| t.table_number);

    let total_capacity = chosen.iter().map(|t| t.capacity).sum();
    if total_capacity < party_size {
        return Err(invalid_selection(&format!(
            "selected tables seat {total_capacity}, party is {party_size}"
        ))
        .into());
    }

    Ok(TableCombination {
        tables: chosen,
        total_capacity,
    })
}

fn invalid_selection(reason: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidTableSelection,
        format!("Invalid table selection: {reason}"),
    )
}

/// Apply a status change. Re-applying the current status changes nothing.
pub async fn change_status(
    pool: &SqlitePool,
    id: i64,
    next: ReservationStatus,
) -> AppResult<ReservationDetail> {
    let mut tx = pool.begin().await.map_err(RepoError::from)?;
    let current = find_reservation(&mut tx, id).await?;

    if !current.status.can_transition_to(next) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot change reservation from {} to {next}", current.status),
        ));
    }
    if current.status != next {
        reservation::update_status(&mut tx, id, next).await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    if current.status != next {
        tracing::info!(reservation_id = id, from = %current.status, to = %next, "Reservation status changed");
    }
    load_detail(pool, id).await
}

/// Move an active reservation to another seating
pub async fn reassign_tables(
    pool: &SqlitePool,
    id: i64,
    table_ids: &[i64],
) -> AppResult<ReservationDetail> {
    let result = try_reassign(pool, id, table_ids).await;
    match result {
        Ok(()) => {
            tracing::info!(reservation_id = id, tables = ?table_ids, "Reservation tables reassigned");
            load_detail(pool, id).await
        }
        Err(BookError::Conflict) => Err(AppError::with_message(
            ErrorCode::TableAlreadyBooked,
            "One of the selected tables is already booked on that date",
        )),
        Err(BookError::App(e)) => Err(e),
    }
}

async fn try_reassign(pool: &SqlitePool, id: i64, table_ids: &[i64]) -> Result<(), BookError> {
    let mut tx = pool.begin().await?;
    let current = find_reservation(&mut tx, id).await?;
    if !current.status.is_active() {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Cancelled reservations cannot be reassigned",
        )
        .into());
    }

    // Own tables are released first so the reservation may keep one of them
    reservation::clear_tables(&mut tx, id).await?;
    let tables = dining_table::find_all(&mut *tx).await?;
    let assignments = reservation::find_assignments_for_date(&mut *tx, current.service_date).await?;
    let seating = select_tables(
        current.service_date,
        current.party_size,
        table_ids,
        &tables,
        &assignments,
    )?;
    reservation::assign_tables(&mut tx, id, current.service_date, &seating.table_ids()).await?;
    reservation::touch(&mut tx, id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_reservation(pool: &SqlitePool, id: i64) -> AppResult<()> {
    if !reservation::delete(pool, id).await? {
        return Err(reservation_not_found(id));
    }
    tracing::info!(reservation_id = id, "Reservation deleted");
    Ok(())
}

async fn find_reservation(conn: &mut SqliteConnection, id: i64) -> AppResult<Reservation> {
    reservation::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| reservation_not_found(id))
}

fn reservation_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ReservationNotFound,
        format!("Reservation {id} not found"),
    )
}

/// Reservation with its tables, owner contact and card hold
pub async fn load_detail(pool: &SqlitePool, id: i64) -> AppResult<ReservationDetail> {
    let reservation = reservation::find_by_id(pool, id)
        .await?
        .ok_or_else(|| reservation_not_found(id))?;
    into_detail(pool, reservation).await
}

pub async fn load_details(
    pool: &SqlitePool,
    reservations: Vec<Reservation>,
) -> AppResult<Vec<ReservationDetail>> {
    let mut details = Vec::with_capacity(reservations.len());
    for r in reservations {
        details.push(into_detail(pool, r).await?);
    }
    Ok(details)
}

async fn into_detail(pool: &SqlitePool, reservation: Reservation) -> AppResult<ReservationDetail> {
    let tables = reservation::tables_for(pool, reservation.id).await?;
    let user = user::find_contact(pool, reservation.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let credit_card = credit_card::find_by_reservation(pool, reservation.id).await?;
    Ok(ReservationDetail {
        reservation,
        tables,
        user,
        credit_card,
    })
}
