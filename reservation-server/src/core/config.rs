use crate::BoxError;
use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_PATH | data/reservations.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | JWT_SECRET | (dev fallback) | HS256 signing secret, required outside development |
/// | JWT_EXPIRATION_MINUTES | 1440 | Access token lifetime |
/// | JWT_ISSUER | reservation-server | Token issuer |
/// | JWT_AUDIENCE | reservation-clients | Token audience |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | TRUST_PROXY | false | Take the client IP from X-Forwarded-For (behind a reverse proxy) |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Daily rolling log directory |
/// | LOG_JSON | false | JSON log lines instead of text |
/// | MAX_PARTY_SIZE | 16 | Largest accepted party |
/// | HOLDING_FEE_CENTS | 1000 | Hold amount on high-traffic days |
/// | SEED_DEFAULT_TABLES | true | Seed the default floor plan into an empty database |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | (unset) | Bootstrap administrator |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/tmp/r.db HTTP_PORT=8080 cargo run -p reservation-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub request_timeout_ms: u64,
    /// Rate limits key on X-Forwarded-For instead of the peer address
    pub trust_proxy: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub max_party_size: i32,
    pub holding_fee_cents: i64,
    pub seed_default_tables: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let secret = Self::require_secret("JWT_SECRET", &environment)?;
        if environment != "development" && secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".into());
        }

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/reservations.db".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            jwt: JwtConfig {
                secret,
                expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 1440),
                issuer: std::env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| "reservation-server".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "reservation-clients".into()),
            },
            environment,
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            trust_proxy: env_parse("TRUST_PROXY", false),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            max_party_size: env_parse("MAX_PARTY_SIZE", 16),
            holding_fee_cents: env_parse("HOLDING_FEE_CENTS", 1000),
            seed_default_tables: env_parse("SEED_DEFAULT_TABLES", true),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Development defaults, used by tests
impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 3000,
            environment: "development".into(),
            jwt: JwtConfig::default(),
            request_timeout_ms: 30_000,
            trust_proxy: false,
            log_level: "info".into(),
            log_dir: None,
            max_party_size: 16,
            holding_fee_cents: 1000,
            seed_default_tables: false,
            admin_email: None,
            admin_password: None,
        }
    }
}
