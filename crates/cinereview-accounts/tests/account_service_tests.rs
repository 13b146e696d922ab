//! Behaviour of the auth, user and admin services against in-memory
//! doubles.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use cinereview_accounts::application::admin_service::AdminService;
use cinereview_accounts::application::auth_service::AuthService;
use cinereview_accounts::application::user_service::UserService;
use cinereview_accounts::domain::commands::{ChangePassword, LoginUser, RegisterUser, UpdateUser};
use cinereview_accounts::domain::stats::{AdminStats, FavoriteGenre, UserStats};
use cinereview_accounts::domain::user::{Role, UserFilters};
use cinereview_accounts::security::token::TokenIssuer;
use cinereview_core::audit::{AuditLogFilters, AuditLogWriter, NewAuditLogEntry};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_test_support::{
    FixedClock, InMemoryAuditLog, InMemoryUserRepository, PlainTextPasswordHasher,
    StaticStatsReader,
};
use uuid::Uuid;

struct Fixture {
    auth: AuthService,
    users: UserService,
    repo: Arc<InMemoryUserRepository>,
    tokens: TokenIssuer,
}

fn fixture() -> Fixture {
    let repo = Arc::new(InMemoryUserRepository::new());
    let hasher = Arc::new(PlainTextPasswordHasher);
    let tokens = TokenIssuer::new(
        b"test-secret",
        Duration::hours(1),
        Arc::new(FixedClock::new(Utc::now())),
    );
    let stats = Arc::new(StaticStatsReader::new(
        UserStats {
            average_rating: 7.5,
            favorite_genre: Some(FavoriteGenre {
                id: Uuid::nil(),
                name: "Drama".to_owned(),
            }),
        },
        AdminStats::default(),
    ));
    Fixture {
        auth: AuthService::new(repo.clone(), hasher.clone(), tokens.clone()),
        users: UserService::new(repo.clone(), stats, hasher),
        repo,
        tokens,
    }
}

fn register(email: &str, username: &str) -> RegisterUser {
    RegisterUser {
        email: email.to_owned(),
        username: username.to_owned(),
        password: "hunter22".to_owned(),
    }
}

// --- auth ---

#[tokio::test]
async fn test_register_creates_user_role_and_valid_token() {
    let f = fixture();

    let session = f.auth.register(&register("a@x.io", "alice")).await.unwrap();

    assert_eq!(session.user.role, Role::User);
    let claims = f.tokens.verify(&session.token).unwrap();
    assert_eq!(claims.sub, session.user.id);
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn test_register_with_taken_email_is_rejected() {
    let f = fixture();
    f.auth.register(&register("a@x.io", "alice")).await.unwrap();

    let result = f.auth.register(&register("a@x.io", "alice2")).await;

    match result.unwrap_err() {
        DomainError::UserAlreadyExists(email) => assert_eq!(email, "a@x.io"),
        other => panic!("expected UserAlreadyExists, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_with_wrong_password_or_unknown_email_is_invalid_credentials() {
    let f = fixture();
    f.auth.register(&register("a@x.io", "alice")).await.unwrap();

    let wrong_password = f
        .auth
        .login(&LoginUser {
            email: "a@x.io".to_owned(),
            password: "nope".to_owned(),
        })
        .await;
    let unknown = f
        .auth
        .login(&LoginUser {
            email: "b@x.io".to_owned(),
            password: "hunter22".to_owned(),
        })
        .await;

    assert!(matches!(wrong_password, Err(DomainError::InvalidCredentials)));
    assert!(matches!(unknown, Err(DomainError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_returns_token_carrying_admin_role() {
    let f = fixture();
    let admin = f.repo.seed("root@x.io", "root", "hunter22", Role::Admin);

    let session = f
        .auth
        .login(&LoginUser {
            email: "root@x.io".to_owned(),
            password: "hunter22".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(session.user.id, admin.id);
    assert_eq!(f.tokens.verify(&session.token).unwrap().role, Role::Admin);
}

// --- users ---

#[tokio::test]
async fn test_update_role_rejects_unknown_role() {
    let f = fixture();
    let user = f.repo.seed("a@x.io", "alice", "pw", Role::User);

    let result = f.users.update_role(user.id, "owner").await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(f.users.get(user.id).await.unwrap().role, Role::User);
}

#[tokio::test]
async fn test_update_role_promotes_user() {
    let f = fixture();
    let user = f.repo.seed("a@x.io", "alice", "pw", Role::User);

    let updated = f.users.update_role(user.id, "admin").await.unwrap();

    assert_eq!(updated.role, Role::Admin);
}

#[tokio::test]
async fn test_update_profile_rejects_anothers_email() {
    let f = fixture();
    let alice = f.repo.seed("a@x.io", "alice", "pw", Role::User);
    f.repo.seed("b@x.io", "bob", "pw", Role::User);

    let result = f
        .users
        .update_profile(
            alice.id,
            &UpdateUser {
                email: Some("b@x.io".to_owned()),
                username: None,
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::UserAlreadyExists(_))));
}

#[tokio::test]
async fn test_update_profile_changes_only_supplied_fields() {
    let f = fixture();
    let alice = f.repo.seed("a@x.io", "alice", "pw", Role::User);

    let updated = f
        .users
        .update_profile(
            alice.id,
            &UpdateUser {
                email: Some(String::new()),
                username: Some("alicia".to_owned()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email, "a@x.io");
    assert_eq!(updated.username, "alicia");
}

#[tokio::test]
async fn test_update_password_requires_current_password() {
    // Arrange
    let f = fixture();
    let alice = f.repo.seed("a@x.io", "alice", "old-secret", Role::User);

    // Act
    let wrong = f
        .users
        .update_password(
            alice.id,
            &ChangePassword {
                current_password: "guess".to_owned(),
                new_password: "new-secret".to_owned(),
            },
        )
        .await;
    let right = f
        .users
        .update_password(
            alice.id,
            &ChangePassword {
                current_password: "old-secret".to_owned(),
                new_password: "new-secret".to_owned(),
            },
        )
        .await;

    // Assert
    assert!(matches!(wrong, Err(DomainError::InvalidCredentials)));
    right.unwrap();
    assert_eq!(f.repo.password_hash(alice.id).as_deref(), Some("new-secret"));
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let f = fixture();
    let admin = f.repo.seed("root@x.io", "root", "pw", Role::Admin);

    let result = f.users.delete(admin.id, admin.id).await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    assert!(f.users.get(admin.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let f = fixture();

    let result = f.users.delete(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(DomainError::UserNotFound(_))));
}

#[tokio::test]
async fn test_list_filters_by_role() {
    let f = fixture();
    f.repo.seed("a@x.io", "alice", "pw", Role::User);
    f.repo.seed("root@x.io", "root", "pw", Role::Admin);

    let page = f
        .users
        .list(
            &UserFilters {
                role: Some(Role::Admin),
                search: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].username, "root");
}

#[tokio::test]
async fn test_stats_come_from_the_stats_reader() {
    let f = fixture();

    let stats = f.users.stats(Uuid::new_v4()).await.unwrap();

    assert!((stats.average_rating - 7.5).abs() < f64::EPSILON);
    assert_eq!(stats.favorite_genre.unwrap().name, "Drama");
}

// --- admin ---

#[tokio::test]
async fn test_admin_stats_count_the_last_seven_days() {
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
    let stats = Arc::new(StaticStatsReader::new(
        UserStats::default(),
        AdminStats {
            total_users: 4,
            ..AdminStats::default()
        },
    ));
    let admin = AdminService::new(
        stats.clone(),
        Arc::new(InMemoryAuditLog::new()),
        Arc::new(FixedClock::new(now)),
    );

    let result = admin.stats().await.unwrap();

    assert_eq!(result.total_users, 4);
    assert_eq!(stats.admin_since_calls(), vec![now - Duration::days(7)]);
}

#[tokio::test]
async fn test_audit_logs_default_to_twenty_per_page_newest_first() {
    // Arrange
    let log = Arc::new(InMemoryAuditLog::new());
    for i in 0..25 {
        log.insert(&NewAuditLogEntry {
            user_id: None,
            movie_id: None,
            review_id: None,
            event: "review_created".to_owned(),
            details: format!("entry {i}"),
        })
        .await
        .unwrap();
    }
    let admin = AdminService::new(
        Arc::new(StaticStatsReader::default()),
        log,
        Arc::new(FixedClock::new(Utc::now())),
    );

    // Act
    let page = admin
        .audit_logs(&AuditLogFilters::default(), PageRequest::new(1, 0))
        .await
        .unwrap();

    // Assert
    assert_eq!(page.limit, 20);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data[0].details, "entry 24");
}
