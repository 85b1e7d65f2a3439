//! End-to-end tests against the full router (in-memory store)

use auth::{AuthConfig, MemoryAuthRepository, app_router};
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// `name=value` part of the Set-Cookie header
    fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

fn app() -> Router {
    app_router(MemoryAuthRepository::new(), AuthConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

fn post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

const CREDENTIALS: &str = r#"{"email":"user@example.org","password":"password"}"#;

async fn sign_up_and_in(app: &Router) -> String {
    let res = send(app, post("/users", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = send(app, post("/session", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::OK);
    res.session_cookie().unwrap()
}

#[tokio::test]
async fn full_registration_and_login_flow() {
    let app = app();

    let res = send(&app, post("/users", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json(), json!({ "id": 1, "email": "user@example.org" }));

    let res = send(&app, post("/session", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.is_empty());
    let set_cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("session_id="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    let cookie = res.session_cookie().unwrap();

    let res = send(&app, request(Method::GET, "/private/whoami", Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "id": 1, "email": "user@example.org" }));

    let res = send(&app, request(Method::GET, "/private/whoami", None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({ "error": "not authenticated" }));

    let res = send(&app, post("/users", r#""invalid""#, None)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());

    let res = send(&app, post("/users", r#"{"email":"invalid"}"#, None)).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = res.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("email"));
    assert!(error.contains("password"));
}

#[tokio::test]
async fn duplicate_email_is_unprocessable() {
    let app = app();

    let res = send(&app, post("/users", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let upper = r#"{"email":"USER@example.org","password":"another1"}"#;
    let res = send(&app, post("/users", upper, None)).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({ "error": "email has already been taken" }));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let app = app();
    send(&app, post("/users", CREDENTIALS, None)).await;

    let wrong = r#"{"email":"user@example.org","password":"wrong-password"}"#;
    let res = send(&app, post("/session", wrong, None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({ "error": "incorrect email or password" }));
    assert!(res.session_cookie().is_none());

    let unknown = r#"{"email":"nobody@example.org","password":"password"}"#;
    let res = send(&app, post("/session", unknown, None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({ "error": "incorrect email or password" }));
}

#[tokio::test]
async fn malformed_sign_in_body_is_bad_request() {
    let app = app();

    let res = send(&app, post("/session", "{", None)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, post("/session", "", None)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tampered_cookie_is_rejected() {
    let app = app();
    let cookie = sign_up_and_in(&app).await;

    let tampered = format!("{cookie}x");
    let res = send(&app, request(Method::GET, "/private/whoami", Some(&tampered))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        request(Method::GET, "/private/whoami", Some("session_id=forged")),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rotates_token() {
    let app = app();
    let first = sign_up_and_in(&app).await;

    let res = send(&app, post("/session", CREDENTIALS, Some(&first))).await;
    assert_eq!(res.status, StatusCode::OK);
    let second = res.session_cookie().unwrap();
    assert_ne!(first, second);

    let res = send(&app, request(Method::GET, "/me", Some(&first))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, request(Method::GET, "/me", Some(&second))).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_destroys_session() {
    let app = app();
    let cookie = sign_up_and_in(&app).await;

    let res = send(&app, request(Method::DELETE, "/session", Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let set_cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    let res = send(&app, request(Method::GET, "/private/whoami", Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Idempotent without a session
    let res = send(&app, request(Method::DELETE, "/session", None)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn plural_session_route_and_me_alias() {
    let app = app();
    send(&app, post("/users", CREDENTIALS, None)).await;

    let res = send(&app, post("/sessions", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.session_cookie().unwrap();

    let res = send(&app, request(Method::GET, "/me", Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["email"], "user@example.org");

    let res = send(&app, request(Method::DELETE, "/sessions", Some(&cookie))).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn preflight_short_circuits_with_cors_headers() {
    let app = app();

    let res = send(&app, request(Method::OPTIONS, "/private/whoami", None)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        res.headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        res.headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
    assert!(res.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn every_response_has_request_id_and_cors() {
    let app = app();

    let a = send(&app, request(Method::GET, "/private/whoami", None)).await;
    let b = send(&app, post("/users", "{", None)).await;

    for res in [&a, &b] {
        assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let id = res.headers["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }
    assert_ne!(a.headers["x-request-id"], b.headers["x-request-id"]);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app();

    let res = send(&app, request(Method::GET, "/nope", None)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({ "error": "not found" }));
    assert!(res.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn sign_up_does_not_start_a_session() {
    let app = app();

    let res = send(&app, post("/users", CREDENTIALS, None)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.session_cookie().is_none());
}

#[tokio::test]
async fn wrong_method_is_method_not_allowed() {
    let app = app();

    let res = send(&app, request(Method::GET, "/users", None)).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.json(), json!({ "error": "method not allowed" }));
    assert!(res.headers.contains_key("x-request-id"));
    assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let res = send(&app, post("/private/whoami", "{}", None)).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.json(), json!({ "error": "method not allowed" }));
}

#[tokio::test]
async fn null_fields_reach_validation() {
    let app = app();

    let res = send(
        &app,
        post("/users", r#"{"email":"a@b.io","password":null}"#, None),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({ "error": "password: cannot be blank." }));
}
