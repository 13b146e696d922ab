//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cinereview_accounts::domain::user::User;
use cinereview_accounts::security::password::Argon2PasswordHasher;
use cinereview_api::bootstrap::ensure_admin;
use cinereview_api::build_app;
use cinereview_api::config::AppConfig;
use cinereview_api::state::AppState;
use cinereview_core::clock::{Clock, SystemClock};
use cinereview_reviews::application::event_channel::review_event_channel;
use cinereview_reviews::application::event_consumer::ReviewEventConsumer;
use cinereview_store::pg_audit_repository::PgAuditLogRepository;
use cinereview_store::pg_movie_repository::PgMovieRepository;
use cinereview_store::pg_user_repository::PgUserRepository;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "integration-admin";

/// The production router over a real pool, with its event consumer running.
pub struct TestServer {
    pub app: Router,
    shutdown: watch::Sender<bool>,
    consumer: JoinHandle<()>,
}

impl TestServer {
    /// Signals the consumer and waits for it to exit.
    pub async fn stop(self) {
        self.shutdown.send(true).unwrap();
        self.consumer.await.unwrap();
    }
}

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_owned()),
        "JWT_SECRET" => Some("integration-test-secret".to_owned()),
        _ => None,
    })
    .unwrap()
}

/// Wires the app the way `main.rs` does.
pub fn spawn_app(pool: PgPool) -> TestServer {
    let config = test_config();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (events, receiver) = review_event_channel(config.review_event_capacity);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let consumer = ReviewEventConsumer::new(
        receiver,
        Arc::new(PgMovieRepository::new(pool.clone())),
        Some(Arc::new(PgAuditLogRepository::new(pool.clone()))),
        shutdown_rx,
    )
    .spawn();

    TestServer {
        app: build_app(AppState::postgres(&pool, &config, events, clock)),
        shutdown,
        consumer,
    }
}

/// Creates the administrator account directly in the database.
pub async fn seed_admin(pool: &PgPool) -> User {
    let users = PgUserRepository::new(pool.clone());
    let (user, _) = ensure_admin(
        &users,
        &Argon2PasswordHasher,
        ADMIN_EMAIL,
        "root",
        ADMIN_PASSWORD,
    )
    .await
    .unwrap();
    user
}

/// Logs in and returns an `Authorization` header value.
pub async fn bearer(app: &Router, email: &str, password: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    format!("Bearer {}", json["token"].as_str().unwrap())
}

/// Sends one request and returns status plus the JSON body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", bearer);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

/// Polls `uri` as `bearer` until `done` accepts the body or two seconds
/// pass; returns the last body seen.
pub async fn eventually(
    app: &Router,
    uri: &str,
    bearer: &str,
    done: impl Fn(&Value) -> bool,
) -> Value {
    let mut last = Value::Null;
    for _ in 0..40 {
        let (_, json) = send(app, "GET", uri, Some(bearer), None).await;
        if done(&json) {
            return json;
        }
        last = json;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    last
}
