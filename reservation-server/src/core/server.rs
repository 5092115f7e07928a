//! Server Implementation
//!
//! Router assembly and HTTP server lifecycle

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::BoxError;
use crate::auth::rate_limit::IDLE_WINDOW;
use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Requests still running after `timeout_ms` are answered with 408
fn request_timeout(timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        http::StatusCode::REQUEST_TIMEOUT,
        Duration::from_millis(timeout_ms),
    )
}

/// Build the full application router with state and middleware stack
pub fn build_app(state: ServerState) -> Router {
    let timeout = request_timeout(state.config.request_timeout_ms);

    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router(state.clone()))
        .merge(crate::api::profile::router())
        .merge(crate::api::availability::router())
        .merge(crate::api::reservations::router())
        .merge(crate::api::admin::router())
        // require_auth skips the public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(timeout)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request))
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(&self) -> Result<(), BoxError> {
        let rate_limiter = self.state.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(IDLE_WINDOW);
            loop {
                interval.tick().await;
                rate_limiter.prune(IDLE_WINDOW).await;
            }
        });

        let app = build_app(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Reservation server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        self.state.pool.close().await;
        tracing::info!("Database pool closed");

        Ok(())
    }
}
