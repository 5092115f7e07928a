//! Reservation Server - restaurant table reservation service
//!
//! # Module layout
//!
//! ```text
//! reservation-server/src/
//! ├── core/       # config, state, server
//! ├── auth/       # JWT, Argon2, middleware, rate limits
//! ├── booking/    # availability resolver, holding fee, booking workflow
//! ├── api/        # HTTP routes and handlers
//! ├── db/         # SQLite pool, migrations, repositories, seed
//! └── utils/      # logging, time parsing, validation
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Startup error: config, `.env`, bind and serve failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// Security event logging, target "security"
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and start logging. Call once before reading the config.
pub fn setup_environment() -> Result<(), BoxError> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(format!("Failed to load .env: {e}").into());
    }

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty());
    let json = std::env::var("LOG_JSON").is_ok_and(|v| v == "true" || v == "1");
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mirrors the startup chain in main: every step must convert with `?`
    async fn start(config: &Config) -> Result<ServerState, BoxError> {
        let state = ServerState::initialize(config).await?;
        Ok(state)
    }

    #[tokio::test]
    async fn test_startup_chain_shares_one_error_type() {
        let state = start(&Config::default()).await.unwrap();
        assert_eq!(state.config.database_path, ":memory:");

        let err: BoxError = AppError::database("disk full").into();
        assert!(err.to_string().contains("disk full"));

        // Errors cross task boundaries on the way out of main
        let handle = tokio::spawn(async { Err::<(), BoxError>("bind failed".into()) });
        assert_eq!(handle.await.unwrap().unwrap_err().to_string(), "bind failed");
    }
}
