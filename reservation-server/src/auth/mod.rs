//! Authentication and authorization
//!
//! - [`JwtService`] - JWT token service
//! - [`CurrentUser`] / [`MaybeUser`] - caller context extractors
//! - [`require_auth`] / [`require_admin`] - middleware
//! - [`RateLimiter`] - per-IP limits on login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;

pub use extractor::MaybeUser;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
pub use password::{MIN_PASSWORD_LEN, hash_password, verify_password};
pub use rate_limit::{RateLimit, RateLimiter, login_rate_limit, register_rate_limit};
