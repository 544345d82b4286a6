//! Shared fixtures for handler tests: an in-memory database, the real router
//! and a hooks implementation that counts invocations.

use crate::server::{create_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use lib_core::dto::UserRead;
use lib_core::model::manager::UserHooks;
use lib_core::model::store::{User, UserForUpdate, UserRepository};
use lib_core::{create_db_and_tables, Config, DbPool};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "handler-test-secret-at-least-32-chars!";
pub const PASSWORD: &str = "TestPassword123!";

// region: --- Hooks

#[derive(Default)]
pub struct RecordingHooks {
    pub registered: AtomicUsize,
    pub forgot: AtomicUsize,
    pub verify_requested: AtomicUsize,
    pub last_token: Mutex<Option<String>>,
}

impl RecordingHooks {
    /// (register, forgot-password, request-verify)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.registered.load(Ordering::SeqCst),
            self.forgot.load(Ordering::SeqCst),
            self.verify_requested.load(Ordering::SeqCst),
        )
    }

    pub fn last_token(&self) -> String {
        self.last_token
            .lock()
            .unwrap()
            .clone()
            .expect("A token should have been issued")
    }
}

#[async_trait]
impl UserHooks for RecordingHooks {
    async fn on_after_register(&self, _user: &User) {
        self.registered.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_after_forgot_password(&self, _user: &User, token: &str) {
        self.forgot.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
    }

    async fn on_after_request_verify(&self, _user: &User, token: &str) {
        self.verify_requested.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
    }
}

// endregion: --- Hooks

// region: --- App

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub hooks: Arc<RecordingHooks>,
}

/// Setup test database with schema
pub async fn setup_test_db() -> DbPool {
    let options = "sqlite::memory:"
        .parse::<SqliteConnectOptions>()
        .expect("Valid in-memory URL")
        .foreign_keys(true);

    // One connection: each connection to `sqlite::memory:` is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect_with(options)
        .await
        .expect("Failed to create test database");

    create_db_and_tables(&pool)
        .await
        .expect("Failed to create tables");

    pool
}

pub fn test_config(cookie_secure: bool) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        auth_secret: TEST_SECRET.to_string(),
        cookie_secure,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with_config(test_config(false)).await
}

pub async fn test_app_with_config(config: Config) -> TestApp {
    let pool = setup_test_db().await;
    let hooks = Arc::new(RecordingHooks::default());
    let state = AppState::new(pool.clone(), config, hooks.clone());

    TestApp {
        router: create_router(state, vec!["http://localhost:3000".to_string()]),
        pool,
        hooks,
    }
}

// endregion: --- App

// region: --- Requests

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let request = with_cookie(Request::builder().method("GET").uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let request = with_cookie(Request::builder().method("DELETE").uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.json_request("POST", uri, body, token).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.json_request("PATCH", uri, body, token).await
    }

    async fn json_request(&self, method: &str, uri: &str, body: Value, token: Option<&str>) -> Response {
        let request = with_cookie(Request::builder().method(method).uri(uri), token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, form: &[(&str, &str)]) -> Response {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<&str>) -> Response {
        let request = with_cookie(Request::builder().method("POST").uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    // region: --- Flows

    pub async fn register(&self, email: &str) -> UserRead {
        let response = self
            .post_json(
                "/auth/register",
                serde_json::json!({ "email": email, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        serde_json::from_value(body_json(response).await).unwrap()
    }

    /// Log in and return the session token from `Set-Cookie`.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form("/auth/cookie/login", &[("username", email), ("password", password)])
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        session_cookie(&response).expect("Login should set the session cookie")
    }

    pub async fn register_and_login(&self, email: &str) -> (UserRead, String) {
        let user = self.register(email).await;
        let token = self.login(email, PASSWORD).await;
        (user, token)
    }

    pub async fn update_user(&self, id: Uuid, update: UserForUpdate) -> User {
        UserRepository::update(&self.pool, id, update).await.unwrap()
    }

    // endregion: --- Flows
}

fn with_cookie(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("userauth={}", token)),
        None => builder,
    }
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

// endregion: --- Requests

// region: --- Responses

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Raw `Set-Cookie` header for the session cookie.
pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("userauth="))
        .map(str::to_string)
}

/// Value of the session cookie set by the response.
pub fn session_cookie(response: &Response) -> Option<String> {
    let header = set_cookie_header(response)?;
    let pair = header.split(';').next()?;
    pair.strip_prefix("userauth=").map(str::to_string)
}

pub async fn assert_error(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["code"], code);
}

// endregion: --- Responses
