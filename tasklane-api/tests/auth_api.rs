/// Account endpoint tests: registration, login, password reset, profile

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({"name": "Ada", "email": "ada@example.com", "password": PASSWORD})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["active"], true);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new();
    ctx.register("Ada").await;

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({"name": "Other", "email": "ADA@example.com", "password": PASSWORD})),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({"name": "Ada", "email": "not-an-email", "password": "short"})),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let ctx = TestContext::new();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    use tower::ServiceExt;
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login() {
    let ctx = TestContext::new();
    let ada = ctx.register("Ada").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let (status, me) = ctx.get("/v1/users/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], ada.id);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = TestContext::new();
    let ada = ctx.register("Ada").await;

    let wrong_password = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": "wrong password"})),
        )
        .await;
    let unknown_email = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": PASSWORD})),
        )
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_inactive_user_is_locked_out() {
    let ctx = TestContext::new();
    let ada = ctx.register("Ada").await;

    assert!(ctx.store.set_user_active(ada.id, false).await);

    let (status, _) = ctx.get("/v1/users/me", &ada.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_password_emails_new_password() {
    let ctx = TestContext::new();
    let ada = ctx.register("Ada").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/reset-password",
            None,
            Some(json!({"email": ada.email})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let messages = ctx.outbox.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipients, vec![ada.email.clone()]);

    let new_password = messages[0].params["password"].as_str().unwrap().to_string();
    assert_eq!(new_password.len(), 16);
    assert!(messages[0].html.contains(&new_password));

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": new_password})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_unknown_email_is_silent() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/reset-password",
            None,
            Some(json!({"email": "ghost@example.com"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
    assert!(ctx.outbox.messages().await.is_empty());
}

#[tokio::test]
async fn test_reset_password_queue_failure_keeps_password() {
    let ctx = TestContext::with_failing_queue();
    let ada = ctx.register("Ada").await;

    let mut answers = Vec::new();
    for email in [ada.email.as_str(), "ghost@example.com"] {
        let answer = ctx
            .request(
                Method::POST,
                "/v1/auth/reset-password",
                None,
                Some(json!({ "email": email })),
            )
            .await;
        answers.push(answer);
    }
    let (known, unknown) = (&answers[0], &answers[1]);

    assert_eq!(*known, (StatusCode::OK, json!({})));
    assert_eq!(known, unknown);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Tokens issued before the attempt stay valid
    let (status, _) = ctx.get("/v1/users/me", &ada.token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_dropped_email_keeps_password() {
    let ctx = TestContext::with_failing_mail();
    let ada = ctx.register("Ada").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/reset-password",
            None,
            Some(json!({"email": ada.email})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({"email": ada.email, "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_set_avatar() {
    let ctx = TestContext::new();
    let ada = ctx.register("Ada").await;

    let (_, me) = ctx.get("/v1/users/me", &ada.token).await;
    assert!(me["avatar"].is_null());

    let (status, me) = ctx
        .put(
            "/v1/users/me/avatar",
            &ada.token,
            json!({"name": "me.png", "key": "avatars/ada/me.png"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["avatar"]["key"], "avatars/ada/me.png");
    assert_eq!(me["avatar_id"], me["avatar"]["id"]);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
