//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use cinereview_accounts::application::auth_service::AuthSession;
use cinereview_accounts::domain::commands::{LoginUser, RegisterUser};
use tracing::instrument;

use crate::error::ApiError;
use crate::rate_limit::AuthRateLimit;
use crate::state::AppState;

/// POST /auth/register
#[instrument(skip_all, fields(username = %request.username))]
async fn register(
    _limit: AuthRateLimit,
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    let session = state.auth.register(&request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /auth/login
#[instrument(skip_all)]
async fn login(
    _limit: AuthRateLimit,
    State(state): State<AppState>,
    Json(request): Json<LoginUser>,
) -> Result<Json<AuthSession>, ApiError> {
    Ok(Json(state.auth.login(&request).await?))
}

/// Returns the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;

    use cinereview_accounts::domain::user::Role;
    use serde_json::json;

    use crate::routes::test_helpers::send;
    use crate::state::testing::TestApp;

    #[tokio::test]
    async fn test_register_returns_201_with_user_and_token() {
        // Arrange
        let t = TestApp::new();
        let app = router().with_state(t.state.clone());
        let body = json!({ "email": "new@example.com", "username": "newbie", "password": "hunter22" });

        // Act
        let (status, json) = send(app, "POST", "/auth/register", None, Some(body)).await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["user"]["username"], "newbie");
        assert_eq!(json["user"]["role"], "user");
        assert!(json["user"].get("password_hash").is_none());
        let token = json["token"].as_str().unwrap();
        assert!(t.state.tokens.verify(token).is_ok());
    }

    #[tokio::test]
    async fn test_register_with_bad_email_returns_400() {
        let t = TestApp::new();
        let app = router().with_state(t.state);
        let body = json!({ "email": "nope", "username": "newbie", "password": "hunter22" });

        let (status, json) = send(app, "POST", "/auth/register", None, Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_returns_401() {
        let t = TestApp::new();
        t.users.seed("a@example.com", "alice", "right", Role::User);
        let app = router().with_state(t.state);
        let body = json!({ "email": "a@example.com", "password": "wrong" });

        let (status, json) = send(app, "POST", "/auth/login", None, Some(body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_auth_routes_are_rate_limited_per_client() {
        // Arrange
        let t = TestApp::with_auth_limit(2);
        let body = json!({ "email": "a@example.com", "password": "whatever" });

        // Act
        let mut statuses = Vec::new();
        for _ in 0..3 {
            let app = router().with_state(t.state.clone());
            let (status, _) = send(app, "POST", "/auth/login", None, Some(body.clone())).await;
            statuses.push(status);
        }

        // Assert
        assert_eq!(
            statuses,
            vec![
                StatusCode::UNAUTHORIZED,
                StatusCode::UNAUTHORIZED,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }
}
