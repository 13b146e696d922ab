//! Profile routes for the signed-in user and account administration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::put};
use cinereview_accounts::domain::commands::{ChangePassword, UpdateUser};
use cinereview_accounts::domain::stats::{FavoriteGenre, UserStats};
use cinereview_accounts::domain::user::{Role, User, UserFilters};
use cinereview_core::pagination::Paginated;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::page_request;
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /me. The counters are best effort and fall back to
/// zero when the statistics queries fail.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: User,
    pub reviews_count: i64,
    pub average_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_genre: Option<FavoriteGenre>,
}

/// Query string for GET /users.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    /// Email or username substring.
    pub search: Option<String>,
}

/// Body of PUT /users/{id}/role.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

/// GET /me
async fn me(user: AuthUser, State(state): State<AppState>) -> Result<Json<Profile>, ApiError> {
    let account = state.users.get(user.id).await?;

    let reviews_count = state
        .reviews
        .count_by_user(user.id)
        .await
        .unwrap_or_else(|e| {
            warn!(user_id = %user.id, error = %e, "review count unavailable");
            0
        });
    let stats = state.users.stats(user.id).await.unwrap_or_else(|e| {
        warn!(user_id = %user.id, error = %e, "user stats unavailable");
        UserStats::default()
    });

    Ok(Json(Profile {
        user: account,
        reviews_count,
        average_rating: stats.average_rating,
        favorite_genre: stats.favorite_genre,
    }))
}

/// PUT /me
#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update_profile(user.id, &request).await?))
}

/// PUT /me/password
#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_my_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<ChangePassword>,
) -> Result<StatusCode, ApiError> {
    state.users.update_password(user.id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users
async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let role = query
        .role
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(str::parse::<Role>)
        .transpose()?;
    let filters = UserFilters {
        role,
        search: query.search.filter(|s| !s.is_empty()),
    };
    Ok(Json(
        state
            .users
            .list(&filters, page_request(query.page, query.limit))
            .await?,
    ))
}

/// GET /users/{id}
async fn get_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get(id).await?))
}

/// PUT /users/{id}
#[instrument(skip_all, fields(user_id = %id, admin_id = %admin.0.id))]
async fn update_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    state.users.update(id, &request).await?;
    Ok(Json(state.users.get(id).await?))
}

/// PUT /users/{id}/role
#[instrument(skip_all, fields(user_id = %id, admin_id = %admin.0.id))]
async fn update_user_role(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleChange>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update_role(id, &request.role).await?))
}

/// DELETE /users/{id}
#[instrument(skip_all, fields(user_id = %id, admin_id = %admin.0.id))]
async fn delete_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id, admin.0.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(update_my_password))
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/role", put(update_user_role))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::routes::test_helpers::send;
    use crate::state::testing::TestApp;

    #[tokio::test]
    async fn test_me_returns_profile_with_counters() {
        // Arrange
        let t = TestApp::new();
        let (user, bearer) = t.sign_in("ripley", Role::User);

        // Act
        let (status, json) = send(
            router().with_state(t.state.clone()),
            "GET",
            "/me",
            Some(&bearer),
            None,
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["id"], user.id.to_string());
        assert_eq!(json["reviews_count"], 0);
        assert_eq!(json["average_rating"], 0.0);
        assert!(json.get("favorite_genre").is_none());
    }

    #[tokio::test]
    async fn test_me_without_token_returns_401() {
        let t = TestApp::new();

        let (status, _) = send(router().with_state(t.state), "GET", "/me", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_me_to_taken_username_returns_409() {
        let t = TestApp::new();
        let (_, bearer) = t.sign_in("ripley", Role::User);
        t.sign_in("dallas", Role::User);

        let (status, json) = send(
            router().with_state(t.state.clone()),
            "PUT",
            "/me",
            Some(&bearer),
            Some(json!({ "username": "dallas" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "user_already_exists");
    }

    #[tokio::test]
    async fn test_password_change_checks_current_password() {
        // Arrange
        let t = TestApp::new();
        let (user, bearer) = t.sign_in("ripley", Role::User);

        // Act
        let (wrong, _) = send(
            router().with_state(t.state.clone()),
            "PUT",
            "/me/password",
            Some(&bearer),
            Some(json!({ "current_password": "nope", "new_password": "nostromo" })),
        )
        .await;
        let (right, body) = send(
            router().with_state(t.state.clone()),
            "PUT",
            "/me/password",
            Some(&bearer),
            Some(json!({ "current_password": "password", "new_password": "nostromo" })),
        )
        .await;

        // Assert
        assert_eq!(wrong, StatusCode::UNAUTHORIZED);
        assert_eq!(right, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);
        assert_eq!(t.users.password_hash(user.id).as_deref(), Some("nostromo"));
    }

    #[tokio::test]
    async fn test_user_listing_is_admin_only_and_filters_by_role() {
        // Arrange
        let t = TestApp::new();
        let (_, admin) = t.sign_in("root", Role::Admin);
        let (_, user) = t.sign_in("ripley", Role::User);
        t.sign_in("dallas", Role::User);

        // Act
        let (forbidden, _) = send(
            router().with_state(t.state.clone()),
            "GET",
            "/users",
            Some(&user),
            None,
        )
        .await;
        let (status, json) = send(
            router().with_state(t.state.clone()),
            "GET",
            "/users?role=user",
            Some(&admin),
            None,
        )
        .await;

        // Assert
        assert_eq!(forbidden, StatusCode::FORBIDDEN);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 2);
        assert_eq!(json["limit"], 10);
    }

    #[tokio::test]
    async fn test_unknown_role_filter_returns_400() {
        let t = TestApp::new();
        let (_, admin) = t.sign_in("root", Role::Admin);

        let (status, json) = send(
            router().with_state(t.state.clone()),
            "GET",
            "/users?role=owner",
            Some(&admin),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_admin_promotes_user() {
        let t = TestApp::new();
        let (_, admin) = t.sign_in("root", Role::Admin);
        let (user, _) = t.sign_in("ripley", Role::User);

        let (status, json) = send(
            router().with_state(t.state.clone()),
            "PUT",
            &format!("/users/{}/role", user.id),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["role"], "admin");
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_themselves() {
        // Arrange
        let t = TestApp::new();
        let (root, admin) = t.sign_in("root", Role::Admin);
        let (user, _) = t.sign_in("ripley", Role::User);

        // Act
        let (self_delete, _) = send(
            router().with_state(t.state.clone()),
            "DELETE",
            &format!("/users/{}", root.id),
            Some(&admin),
            None,
        )
        .await;
        let (other_delete, _) = send(
            router().with_state(t.state.clone()),
            "DELETE",
            &format!("/users/{}", user.id),
            Some(&admin),
            None,
        )
        .await;

        // Assert
        assert_eq!(self_delete, StatusCode::FORBIDDEN);
        assert_eq!(other_delete, StatusCode::NO_CONTENT);
        let (status, _) = send(
            router().with_state(t.state.clone()),
            "GET",
            &format!("/users/{}", user.id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
