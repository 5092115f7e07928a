mod common;

use common::{TestApp, booking, error_code};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "New@Example.com", "password": "long-enough", "name": "New User", "phone": "555-0142" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["isGuest"], false);
    assert!(body["user"].get("passwordHash").is_none());

    let token = app.login("new@example.com", "long-enough").await;
    let (status, me) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["name"], "New User");

    let (status, anonymous) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(anonymous["user"].is_null());
}

#[tokio::test]
async fn test_register_rejections() {
    let app = TestApp::new().await;
    app.register("taken@example.com", "long-enough").await;

    let (status, err) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "TAKEN@example.com", "password": "long-enough", "name": "Again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&err), 8002);

    let (status, err) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "short@example.com", "password": "short", "name": "Short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&err), 1008);
}

#[tokio::test]
async fn test_guest_upgrade_keeps_reservations() {
    let app = TestApp::new().await;
    let (status, reservation) = app
        .book(None, booking("guest@example.com", "2031-03-10T19:00", 2))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Guests have no password
    let (status, err) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "guest@example.com", "password": "anything-at-all" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&err), 1002);

    let token = app.register("guest@example.com", "now-registered").await;
    let (_, profile) = app.get("/api/user/profile", Some(&token)).await;
    assert_eq!(profile["user"]["isGuest"], false);
    assert_eq!(profile["user"]["name"], "Member");
    assert_eq!(profile["reservations"][0]["id"], reservation["id"]);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;
    app.register("user@example.com", "right-password").await;

    let (status, err) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "user@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&err), 1002);

    let (status, err) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "right-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&err), 1002);
}

#[tokio::test]
async fn test_login_rate_limited_per_ip() {
    let app = TestApp::new().await;
    let body = json!({ "email": "nobody@example.com", "password": "whatever-pass" });

    for _ in 0..5 {
        let (status, _) = app
            .request_from("192.0.2.7", Method::POST, "/api/auth/login", None, Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, err) = app
        .request_from("192.0.2.7", Method::POST, "/api/auth/login", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&err), 9006);
    let retry_after = err["details"]["retryAfterSeconds"].as_u64().unwrap();
    assert!((1..=60).contains(&retry_after));

    // Another client is unaffected
    let (status, _) = app
        .request_from("192.0.2.8", Method::POST, "/api/auth/login", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_token_and_updates() {
    let app = TestApp::new().await;
    let (status, err) = app.get("/api/user/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&err), 1001);

    let token = app.register("p@example.com", "long-enough").await;
    let (status, updated) = app
        .put(
            "/api/user/profile",
            Some(&token),
            json!({ "name": "Renamed", "phone": "555-0199" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["phone"], "555-0199");
    assert_eq!(updated["email"], "p@example.com");

    let (status, _) = app
        .put("/api/user/profile", Some(&token), json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_never_reveals_accounts() {
    let app = TestApp::new().await;
    app.register("known@example.com", "long-enough").await;

    for email in ["known@example.com", "unknown@example.com"] {
        let (status, body) = app
            .post("/api/auth/forgot-password", None, json!({ "email": email }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }
}
