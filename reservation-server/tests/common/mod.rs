#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use reservation_server::db::{DbService, seed};
use reservation_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Seeded floor plan: tables 1..=8 with capacities 2,2,4,4,6,6,8,8
pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

static NEXT_IP: AtomicU32 = AtomicU32::new(1);

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        seed::seed_tables(&db.pool).await.unwrap();
        seed::ensure_admin(&db.pool, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        // Requests carry a per-test X-Forwarded-For client address
        let config = Config {
            trust_proxy: true,
            ..Config::default()
        };
        let state = ServerState::new(config, db.pool);
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    /// Send a JSON request from a fresh client IP
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let n = NEXT_IP.fetch_add(1, Ordering::Relaxed);
        let ip = format!("10.{}.{}.{}", (n >> 16) & 0xff, (n >> 8) & 0xff, n & 0xff);
        self.request_from(&ip, method, uri, token, body).await
    }

    pub async fn request_from(
        &self,
        ip: &str,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", ip);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a user and return its token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": password, "name": "Member", "phone": "555-0110" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.post("/api/reservations", token, body).await
    }
}

pub fn booking(email: &str, date: &str, guests: i32) -> Value {
    json!({
        "name": "Guest Person",
        "email": email,
        "phone": "555-0101",
        "date": date,
        "numberOfGuests": guests,
    })
}

pub fn table_numbers(reservation: &Value) -> Vec<i64> {
    reservation["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tableNumber"].as_i64().unwrap())
        .collect()
}

pub fn error_code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap()
}
