//! Per-client limits on the login and registration routes
//!
//! Each [`RateLimit`] is a fixed window counted per client IP. With
//! `TRUST_PROXY` the client is the first `X-Forwarded-For` entry, otherwise
//! the socket peer.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::AppError;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;

/// Request budget for one route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub route: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const LOGIN_LIMIT: RateLimit = RateLimit {
    route: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

pub const REGISTER_LIMIT: RateLimit = RateLimit {
    route: "register",
    max_requests: 3,
    window: Duration::from_secs(60),
};

/// Windows untouched for this long are dropped by [`RateLimiter::prune`]
pub const IDLE_WINDOW: Duration = Duration::from_secs(300);

struct Window {
    hits: u32,
    opened_at: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request from `client`. `Err` carries the time left in the
    /// window once the budget is spent; rejected requests are not counted.
    pub async fn hit(&self, limit: RateLimit, client: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((limit.route, client.to_owned()))
            .or_insert(Window { hits: 0, opened_at: now });

        let elapsed = now.duration_since(window.opened_at);
        if elapsed >= limit.window {
            window.hits = 0;
            window.opened_at = now;
        } else if window.hits >= limit.max_requests {
            return Err(limit.window - elapsed);
        }
        window.hits += 1;
        Ok(())
    }

    pub async fn prune(&self, idle: Duration) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, window| now.duration_since(window.opened_at) < idle);
    }
}

/// Client address used as the limiter key
pub fn client_ip(request: &Request, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

async fn enforce(
    state: &ServerState,
    limit: RateLimit,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_ip(&request, state.config.trust_proxy)
        .map_or_else(|| "unknown".to_owned(), |ip| ip.to_string());

    if let Err(retry_after) = state.rate_limiter.hit(limit, &client).await {
        let retry_after_secs = retry_after.as_secs().max(1);
        security_log!(
            "WARN",
            "rate_limited",
            route = limit.route,
            ip = client,
            retry_after_secs = retry_after_secs
        );
        return Err(AppError::too_many_requests().with_detail("retryAfterSeconds", retry_after_secs));
    }
    Ok(next.run(request).await)
}

pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, LOGIN_LIMIT, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, REGISTER_LIMIT, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_per_route_and_client() {
        let limiter = RateLimiter::new();
        for _ in 0..REGISTER_LIMIT.max_requests {
            assert!(limiter.hit(REGISTER_LIMIT, "10.0.0.1").await.is_ok());
        }
        let wait = limiter.hit(REGISTER_LIMIT, "10.0.0.1").await.unwrap_err();
        assert_eq!(wait, REGISTER_LIMIT.window);

        assert!(limiter.hit(REGISTER_LIMIT, "10.0.0.2").await.is_ok());
        assert!(limiter.hit(LOGIN_LIMIT, "10.0.0.1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_reopens_after_expiry() {
        let limiter = RateLimiter::new();
        for _ in 0..LOGIN_LIMIT.max_requests {
            limiter.hit(LOGIN_LIMIT, "ip").await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(
            limiter.hit(LOGIN_LIMIT, "ip").await.unwrap_err(),
            Duration::from_secs(15)
        );

        tokio::time::advance(Duration::from_secs(15)).await;
        assert!(limiter.hit(LOGIN_LIMIT, "ip").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_drops_idle_windows() {
        let limiter = RateLimiter::new();
        limiter.hit(LOGIN_LIMIT, "old").await.unwrap();
        tokio::time::advance(IDLE_WINDOW).await;
        limiter.hit(LOGIN_LIMIT, "fresh").await.unwrap();

        limiter.prune(IDLE_WINDOW).await;
        let windows = limiter.windows.lock().await;
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&("login", "fresh".to_owned())));
    }

    fn request(forwarded: Option<&str>, peer: Option<&str>) -> Request {
        let mut builder = Request::builder();
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        }
        request
    }

    #[test]
    fn test_forwarded_header_only_behind_trusted_proxy() {
        let req = request(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.1:5000"));
        assert_eq!(client_ip(&req, true), Some("203.0.113.7".parse().unwrap()));
        assert_eq!(client_ip(&req, false), Some("10.0.0.1".parse().unwrap()));

        // Garbage in the header falls back to the peer
        let req = request(Some("not-an-ip"), Some("192.0.2.4:443"));
        assert_eq!(client_ip(&req, true), Some("192.0.2.4".parse().unwrap()));

        assert_eq!(client_ip(&request(None, None), true), None);
    }
}
