use std::sync::Arc;

use shared::AppResult;
use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::Config;
use crate::db::{DbService, seed};

/// Server state - shared references to every service
///
/// Cloning is cheap: the pool and the JWT service are reference counted.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Configuration (immutable) |
/// | pool | SqlitePool | Process-wide database pool |
/// | jwt_service | Arc<JwtService> | Token issuing / validation |
/// | rate_limiter | RateLimiter | Login / register limits |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
}

impl ServerState {
    /// Build state around an already opened pool
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// Initialize server state
    ///
    /// In order:
    /// 1. Open the database and apply migrations
    /// 2. Seed the default floor plan and bootstrap admin
    /// 3. Build the services
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        seed::run(&db.pool, config).await?;
        Ok(Self::new(config.clone(), db.pool))
    }
}
