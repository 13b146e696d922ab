//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use cinereview_accounts::domain::user::{NewUser, Role, User};
use cinereview_accounts::ports::UserRepository;
use cinereview_catalog::domain::genre::Genre;
use cinereview_catalog::domain::movie::{Movie, NewMovie};
use cinereview_catalog::ports::{GenreRepository, MovieRepository};
use cinereview_reviews::domain::review::{NewReview, Review};
use cinereview_reviews::ports::ReviewStore;
use cinereview_store::pg_genre_repository::PgGenreRepository;
use cinereview_store::pg_movie_repository::PgMovieRepository;
use cinereview_store::pg_review_repository::PgReviewRepository;
use cinereview_store::pg_user_repository::PgUserRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn seed_user(pool: &PgPool, username: &str) -> User {
    PgUserRepository::new(pool.clone())
        .create(&NewUser {
            email: format!("{username}@example.com"),
            username: username.to_owned(),
            password_hash: "hash".to_owned(),
            role: Role::User,
        })
        .await
        .unwrap()
}

pub async fn seed_genre(pool: &PgPool, name: &str) -> Genre {
    PgGenreRepository::new(pool.clone())
        .create(name)
        .await
        .unwrap()
}

pub async fn seed_movie(pool: &PgPool, title: &str, genre_ids: &[Uuid]) -> Movie {
    PgMovieRepository::new(pool.clone())
        .create(
            &NewMovie {
                title: title.to_owned(),
                description: format!("About {title}."),
                release_year: 1979,
                director: "Someone".to_owned(),
                duration_minutes: 117,
            },
            genre_ids,
        )
        .await
        .unwrap()
}

pub async fn seed_review(pool: &PgPool, movie_id: Uuid, user_id: Uuid, rating: i32) -> Review {
    PgReviewRepository::new(pool.clone())
        .create(&NewReview {
            movie_id,
            user_id,
            rating,
            title: format!("{rating} out of ten"),
            content: "Worth a watch.".to_owned(),
        })
        .await
        .unwrap()
}
