//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shared::models::User;
use validator::Validate;

use crate::auth::{MIN_PASSWORD_LEN, MaybeUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::security_log;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, validate_body,
};
use crate::utils::{AppError, AppResult, ErrorCode, JsonBody};

/// Fixed delay before answering a login, so timing does not reveal whether
/// the email exists
const AUTH_FIXED_DELAY_MS: u64 = 250;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email, length(max = MAX_EMAIL_LEN))]
    pub email: String,
    #[validate(length(max = MAX_PASSWORD_LEN))]
    pub password: String,
    #[validate(length(min = 1, max = MAX_NAME_LEN))]
    pub name: String,
    #[validate(length(max = MAX_SHORT_TEXT_LEN))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = MAX_EMAIL_LEN))]
    pub email: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LEN))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
///
/// A guest account with the same email (created by an earlier anonymous
/// booking) is upgraded in place and keeps its reservations.
pub async fn register(
    State(state): State<ServerState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_body(&req)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    let email = shared::util::normalize_email(&req.email);
    let name = req.name.trim();
    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let existing = user::find_by_email(&state.pool, &email).await?;
    let account = match existing {
        Some(u) if !u.is_guest => {
            return Err(AppError::with_message(
                ErrorCode::EmailAlreadyRegistered,
                "An account with this email already exists",
            ));
        }
        Some(guest) => {
            let upgraded =
                user::upgrade_guest(&state.pool, guest.id, name, req.phone.as_deref(), &password_hash)
                    .await?;
            tracing::info!(user_id = upgraded.id, "Guest account upgraded on registration");
            upgraded
        }
        None => {
            let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
            user::create(
                &mut conn,
                &user::NewUser {
                    email,
                    name: name.to_string(),
                    phone: req.phone.clone(),
                    password_hash: Some(password_hash),
                    is_guest: false,
                    is_admin: false,
                },
            )
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailAlreadyRegistered),
                other => other.into(),
            })?
        }
    };

    tracing::info!(user_id = account.id, "User registered");
    issue_token(&state, account)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_body(&req)?;
    let email = shared::util::normalize_email(&req.email);
    let account = user::find_by_email(&state.pool, &email).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Guests have no password and cannot log in
    let account = match account {
        Some(u) if u
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&req.password, hash)) =>
        {
            u
        }
        _ => {
            security_log!("WARN", "login_failed", email = email.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    tracing::info!(user_id = account.id, role = account.role().as_str(), "User logged in");
    issue_token(&state, account)
}

fn issue_token(state: &ServerState, account: User) -> AppResult<Json<AuthResponse>> {
    let token = state
        .jwt_service
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(Json(AuthResponse {
        token,
        user: account,
    }))
}

/// GET /api/auth/me - `{ "user": null }` without a token
pub async fn me(
    State(state): State<ServerState>,
    MaybeUser(caller): MaybeUser,
) -> AppResult<Json<Value>> {
    let account = match caller {
        Some(caller) => user::find_by_id(&state.pool, caller.id).await?,
        None => None,
    };
    Ok(Json(json!({ "user": account })))
}

/// POST /api/auth/forgot-password
///
/// Always answers success so the endpoint cannot be used to check for
/// registered emails.
pub async fn forgot_password(
    State(state): State<ServerState>,
    JsonBody(req): JsonBody<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    let email = shared::util::normalize_email(&req.email);
    match user::find_by_email(&state.pool, &email).await {
        Ok(Some(u)) if !u.is_guest => {
            tracing::info!(user_id = u.id, "Password reset requested");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Password reset lookup failed"),
    }
    Ok(Json(json!({ "success": true })))
}
