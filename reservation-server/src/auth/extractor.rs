//! JWT Extractors
//!
//! [`CurrentUser`] rejects unauthenticated requests, [`MaybeUser`] lets
//! them through as anonymous.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::auth::middleware::authenticate;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    match parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => JwtService::extract_from_header(header)
            .map(Some)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => Ok(None),
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already extracted by the middleware
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = bearer_token(parts)? else {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
            return Err(AppError::not_authenticated());
        };

        let user = authenticate(&state.jwt_service, token, &format!("{:?}", parts.uri))?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Optional caller: `None` when no token was sent
///
/// A token that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<ServerState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Self(Some(user.clone())));
        }

        match bearer_token(parts)? {
            Some(token) => {
                let user = authenticate(&state.jwt_service, token, &format!("{:?}", parts.uri))?;
                parts.extensions.insert(user.clone());
                Ok(Self(Some(user)))
            }
            None => Ok(Self(None)),
        }
    }
}
