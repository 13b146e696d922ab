//! Shared application state.

use std::sync::Arc;

use chrono::Duration;
use cinereview_accounts::application::admin_service::AdminService;
use cinereview_accounts::application::auth_service::AuthService;
use cinereview_accounts::application::user_service::UserService;
use cinereview_accounts::security::password::Argon2PasswordHasher;
use cinereview_accounts::security::token::TokenIssuer;
use cinereview_catalog::application::genre_service::GenreService;
use cinereview_catalog::application::movie_service::MovieService;
use cinereview_core::clock::SharedClock;
use cinereview_reviews::application::event_channel::ReviewEventSender;
use cinereview_reviews::application::review_service::ReviewService;
use cinereview_store::pg_audit_repository::PgAuditLogRepository;
use cinereview_store::pg_genre_repository::PgGenreRepository;
use cinereview_store::pg_movie_repository::PgMovieRepository;
use cinereview_store::pg_review_repository::PgReviewRepository;
use cinereview_store::pg_stats_repository::PgStatsRepository;
use cinereview_store::pg_user_repository::PgUserRepository;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub reviews: ReviewService,
    pub movies: MovieService,
    pub genres: GenreService,
    pub auth: AuthService,
    pub users: UserService,
    pub admin: AdminService,
    /// Verifies bearer tokens for the auth extractors.
    pub tokens: TokenIssuer,
    /// Guards `/auth/*`.
    pub auth_rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wires every service to its PostgreSQL repository. Review mutations
    /// publish to `events`.
    #[must_use]
    pub fn postgres(
        pool: &PgPool,
        config: &AppConfig,
        events: ReviewEventSender,
        clock: SharedClock,
    ) -> Self {
        let review_repo = Arc::new(PgReviewRepository::new(pool.clone()));
        let movie_repo = Arc::new(PgMovieRepository::new(pool.clone()));
        let genre_repo = Arc::new(PgGenreRepository::new(pool.clone()));
        let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
        let stats = Arc::new(PgStatsRepository::new(pool.clone()));
        let audit = Arc::new(PgAuditLogRepository::new(pool.clone()));
        let hasher = Arc::new(Argon2PasswordHasher);

        let tokens = TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
            clock.clone(),
        );

        Self {
            reviews: ReviewService::new(
                review_repo,
                movie_repo.clone(),
                movie_repo.clone(),
                clock.clone(),
            )
            .with_events(events),
            movies: MovieService::new(movie_repo, genre_repo.clone()),
            genres: GenreService::new(genre_repo),
            auth: AuthService::new(user_repo.clone(), hasher.clone(), tokens.clone()),
            users: UserService::new(user_repo, stats.clone(), hasher),
            admin: AdminService::new(stats, audit, clock.clone()),
            tokens,
            auth_rate_limiter: Arc::new(RateLimiter::per_minute(
                config.auth_rate_limit_per_minute,
                clock,
            )),
        }
    }
}
