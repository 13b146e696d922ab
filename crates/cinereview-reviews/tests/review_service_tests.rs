//! Behaviour of the review service against in-memory doubles.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_reviews::application::event_channel::{ReviewEventReceiver, review_event_channel};
use cinereview_reviews::application::review_service::ReviewService;
use cinereview_reviews::domain::commands::{CreateReview, UpdateReview};
use cinereview_reviews::domain::events::ReviewEventKind;
use cinereview_reviews::domain::review::{ReviewFilters, ReviewSort};
use cinereview_reviews::ports::ReviewStore;
use cinereview_test_support::{
    FailingAggregateUpdater, FailingReviewStore, FixedClock, InMemoryMovieCatalog,
    InMemoryReviewStore,
};
use uuid::Uuid;

struct Fixture {
    service: ReviewService,
    store: Arc<InMemoryReviewStore>,
    catalog: Arc<InMemoryMovieCatalog>,
    events: ReviewEventReceiver,
    movie_id: Uuid,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryReviewStore::new());
    let catalog = Arc::new(InMemoryMovieCatalog::with_reviews(Arc::clone(&store)));
    let movie_id = catalog.add_movie("Stalker").id;
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
    ));
    let (tx, events) = review_event_channel(16);
    let service = ReviewService::new(
        store.clone(),
        catalog.clone(),
        catalog.clone(),
        clock,
    )
    .with_events(tx);

    Fixture {
        service,
        store,
        catalog,
        events,
        movie_id,
    }
}

fn create(rating: i32) -> CreateReview {
    CreateReview {
        rating,
        title: "A slow burn".to_owned(),
        content: "Three men walk into the Zone.".to_owned(),
    }
}

#[tokio::test]
async fn test_create_persists_review_recomputes_and_emits_created() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();

    // Act
    let review = f.service.create(f.movie_id, author, &create(9)).await.unwrap();

    // Assert
    assert_eq!(review.rating, 9);
    assert_eq!(review.movie_id, f.movie_id);
    assert_eq!(review.user_id, author);
    assert_eq!(f.store.reviews().len(), 1);
    assert_eq!(f.catalog.recompute_calls(), vec![f.movie_id]);
    assert!((f.catalog.average_rating(f.movie_id).unwrap() - 9.0).abs() < f64::EPSILON);

    let event = f.events.try_recv().unwrap();
    assert_eq!(event.kind, ReviewEventKind::Created);
    assert_eq!(event.review_id, review.id);
    assert_eq!(event.movie_id, f.movie_id);
    assert_eq!(event.user_id, author);
    assert_eq!(
        event.occurred_at,
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_second_review_by_same_author_is_rejected() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();
    f.service.create(f.movie_id, author, &create(9)).await.unwrap();
    f.events.try_recv().unwrap();

    // Act
    let result = f.service.create(f.movie_id, author, &create(4)).await;

    // Assert
    match result.unwrap_err() {
        DomainError::ReviewAlreadyExists { movie_id, user_id } => {
            assert_eq!(movie_id, f.movie_id);
            assert_eq!(user_id, author);
        }
        other => panic!("expected ReviewAlreadyExists, got {other:?}"),
    }
    assert_eq!(f.store.reviews().len(), 1);
    assert_eq!(f.store.reviews()[0].rating, 9);
    assert!(f.events.try_recv().is_none());
}

#[tokio::test]
async fn test_different_authors_may_review_the_same_movie() {
    let f = fixture();

    f.service.create(f.movie_id, Uuid::new_v4(), &create(9)).await.unwrap();
    f.service.create(f.movie_id, Uuid::new_v4(), &create(6)).await.unwrap();

    assert_eq!(f.store.reviews().len(), 2);
    assert!((f.catalog.average_rating(f.movie_id).unwrap() - 7.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_create_for_unknown_movie_persists_nothing() {
    // Arrange
    let mut f = fixture();
    let missing = Uuid::new_v4();

    // Act
    let result = f.service.create(missing, Uuid::new_v4(), &create(7)).await;

    // Assert
    match result.unwrap_err() {
        DomainError::MovieNotFound(id) => assert_eq!(id, missing),
        other => panic!("expected MovieNotFound, got {other:?}"),
    }
    assert!(f.store.reviews().is_empty());
    assert!(f.catalog.recompute_calls().is_empty());
    assert!(f.events.try_recv().is_none());
}

#[tokio::test]
async fn test_create_rejects_out_of_range_rating() {
    let f = fixture();

    let result = f.service.create(f.movie_id, Uuid::new_v4(), &create(11)).await;

    match result.unwrap_err() {
        DomainError::Validation(msg) => assert!(msg.contains("rating")),
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(f.store.reviews().is_empty());
}

#[tokio::test]
async fn test_update_by_author_changes_only_supplied_fields() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();
    let review = f.service.create(f.movie_id, author, &create(9)).await.unwrap();
    f.events.try_recv().unwrap();
    let command = UpdateReview {
        rating: Some(5),
        title: Some(String::new()),
        content: None,
    };

    // Act
    let updated = f.service.update(review.id, author, &command).await.unwrap();

    // Assert
    assert_eq!(updated.rating, 5);
    assert_eq!(updated.title, review.title);
    assert_eq!(updated.content, review.content);
    assert!((f.catalog.average_rating(f.movie_id).unwrap() - 5.0).abs() < f64::EPSILON);
    let event = f.events.try_recv().unwrap();
    assert_eq!(event.kind, ReviewEventKind::Updated);
    assert_eq!(event.review_id, review.id);
}

#[tokio::test]
async fn test_zero_value_update_leaves_review_unchanged() {
    let f = fixture();
    let author = Uuid::new_v4();
    let review = f.service.create(f.movie_id, author, &create(8)).await.unwrap();
    let command: UpdateReview =
        serde_json::from_str(r#"{"rating": 0, "title": "", "content": ""}"#).unwrap();

    let updated = f.service.update(review.id, author, &command).await.unwrap();

    assert_eq!(updated.rating, 8);
    assert_eq!(updated.title, review.title);
    assert_eq!(updated.content, review.content);
}

#[tokio::test]
async fn test_update_by_non_author_is_forbidden_and_changes_nothing() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();
    let review = f.service.create(f.movie_id, author, &create(9)).await.unwrap();
    f.events.try_recv().unwrap();
    let command = UpdateReview {
        rating: Some(1),
        ..UpdateReview::default()
    };

    // Act
    let result = f.service.update(review.id, Uuid::new_v4(), &command).await;

    // Assert
    match result.unwrap_err() {
        DomainError::Forbidden(_) => {}
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(f.store.get_by_id(review.id).await.unwrap(), Some(review));
    assert!(f.events.try_recv().is_none());
}

#[tokio::test]
async fn test_non_author_with_invalid_update_is_forbidden_before_validation() {
    let mut f = fixture();
    let review = f.service.create(f.movie_id, Uuid::new_v4(), &create(9)).await.unwrap();
    f.events.try_recv().unwrap();
    let command = UpdateReview {
        rating: Some(11),
        ..UpdateReview::default()
    };

    let result = f.service.update(review.id, Uuid::new_v4(), &command).await;

    match result.unwrap_err() {
        DomainError::Forbidden(_) => {}
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert!(f.events.try_recv().is_none());
}

#[tokio::test]
async fn test_update_missing_review_is_not_found() {
    let f = fixture();
    let missing = Uuid::new_v4();

    let result = f
        .service
        .update(missing, Uuid::new_v4(), &UpdateReview::default())
        .await;

    match result.unwrap_err() {
        DomainError::ReviewNotFound(id) => assert_eq!(id, missing),
        other => panic!("expected ReviewNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_by_author_removes_review_and_emits_deleted() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();
    let review = f.service.create(f.movie_id, author, &create(9)).await.unwrap();
    f.events.try_recv().unwrap();

    // Act
    f.service.delete(review.id, author, false).await.unwrap();

    // Assert
    assert!(f.store.reviews().is_empty());
    assert!(f.catalog.average_rating(f.movie_id).unwrap().abs() < f64::EPSILON);
    let event = f.events.try_recv().unwrap();
    assert_eq!(event.kind, ReviewEventKind::Deleted);
    assert_eq!(event.review_id, review.id);
    assert_eq!(event.user_id, author);
}

#[tokio::test]
async fn test_admin_may_delete_anothers_review() {
    // Arrange
    let mut f = fixture();
    let author = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let review = f.service.create(f.movie_id, author, &create(3)).await.unwrap();
    f.events.try_recv().unwrap();

    // Act
    f.service.delete(review.id, admin, true).await.unwrap();

    // Assert
    assert!(f.store.reviews().is_empty());
    let event = f.events.try_recv().unwrap();
    assert_eq!(event.kind, ReviewEventKind::Deleted);
    assert_eq!(event.user_id, author);
}

#[tokio::test]
async fn test_non_admin_stranger_cannot_delete() {
    let f = fixture();
    let review = f
        .service
        .create(f.movie_id, Uuid::new_v4(), &create(3))
        .await
        .unwrap();

    let result = f.service.delete(review.id, Uuid::new_v4(), false).await;

    match result.unwrap_err() {
        DomainError::Forbidden(_) => {}
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(f.store.reviews().len(), 1);
}

#[tokio::test]
async fn test_admin_cannot_update_anothers_review() {
    let f = fixture();
    let review = f
        .service
        .create(f.movie_id, Uuid::new_v4(), &create(3))
        .await
        .unwrap();

    let result = f
        .service
        .update(
            review.id,
            Uuid::new_v4(),
            &UpdateReview {
                rating: Some(10),
                ..UpdateReview::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn test_delete_missing_review_is_not_found_even_for_admin() {
    let f = fixture();

    let result = f.service.delete(Uuid::new_v4(), Uuid::new_v4(), true).await;

    assert!(matches!(result, Err(DomainError::ReviewNotFound(_))));
}

#[tokio::test]
async fn test_recompute_failure_does_not_fail_the_mutation() {
    // Arrange
    let store = Arc::new(InMemoryReviewStore::new());
    let catalog = Arc::new(InMemoryMovieCatalog::new());
    let movie_id = catalog.add_movie("Solaris").id;
    let aggregates = Arc::new(FailingAggregateUpdater::new());
    let (tx, mut rx) = review_event_channel(4);
    let service = ReviewService::new(
        store.clone(),
        catalog,
        aggregates.clone(),
        Arc::new(FixedClock::new(Utc::now())),
    )
    .with_events(tx);

    // Act
    let review = service
        .create(movie_id, Uuid::new_v4(), &create(7))
        .await
        .unwrap();

    // Assert
    assert_eq!(store.reviews(), vec![review]);
    assert_eq!(aggregates.calls(), vec![movie_id]);
    assert_eq!(rx.try_recv().unwrap().kind, ReviewEventKind::Created);
}

#[tokio::test]
async fn test_full_event_channel_does_not_fail_the_mutation() {
    // Arrange
    let store = Arc::new(InMemoryReviewStore::new());
    let catalog = Arc::new(InMemoryMovieCatalog::with_reviews(store.clone()));
    let movie_id = catalog.add_movie("Mirror").id;
    let (tx, mut rx) = review_event_channel(1);
    let service = ReviewService::new(
        store.clone(),
        catalog.clone(),
        catalog,
        Arc::new(FixedClock::new(Utc::now())),
    )
    .with_events(tx);

    // Act
    service.create(movie_id, Uuid::new_v4(), &create(7)).await.unwrap();
    service.create(movie_id, Uuid::new_v4(), &create(8)).await.unwrap();

    // Assert
    assert_eq!(store.reviews().len(), 2);
    assert!(rx.try_recv().is_some());
    assert!(rx.try_recv().is_none());
}

#[tokio::test]
async fn test_store_failure_surfaces_as_infrastructure_error() {
    let catalog = Arc::new(InMemoryMovieCatalog::new());
    let movie_id = catalog.add_movie("Nostalghia").id;
    let service = ReviewService::new(
        Arc::new(FailingReviewStore),
        catalog.clone(),
        catalog,
        Arc::new(FixedClock::new(Utc::now())),
    );

    let result = service.create(movie_id, Uuid::new_v4(), &create(7)).await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_list_by_movie_applies_filters_sort_and_paging() {
    // Arrange
    let f = fixture();
    for rating in [2, 9, 5, 7] {
        f.service
            .create(f.movie_id, Uuid::new_v4(), &create(rating))
            .await
            .unwrap();
    }
    let filters = ReviewFilters {
        min_rating: Some(5),
        max_rating: None,
        sort: ReviewSort::RatingDesc,
    };

    // Act
    let first = f
        .service
        .list_by_movie(f.movie_id, &filters, PageRequest::new(1, 2))
        .await
        .unwrap();
    let second = f
        .service
        .list_by_movie(f.movie_id, &filters, PageRequest::new(2, 2))
        .await
        .unwrap();

    // Assert
    let ratings: Vec<i32> = first.iter().chain(&second).map(|r| r.rating).collect();
    assert_eq!(ratings, vec![9, 7, 5]);
}

#[tokio::test]
async fn test_list_and_count_by_user() {
    let f = fixture();
    let author = Uuid::new_v4();
    let other_movie = f.catalog.add_movie("Ivan's Childhood").id;
    f.service.create(f.movie_id, author, &create(8)).await.unwrap();
    f.service.create(other_movie, author, &create(6)).await.unwrap();
    f.service.create(f.movie_id, Uuid::new_v4(), &create(1)).await.unwrap();

    let listed = f
        .service
        .list_by_user(author, &ReviewFilters::default(), PageRequest::new(0, 0))
        .await
        .unwrap();
    let count = f.service.count_by_user(author).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.user_id == author));
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    // Arrange
    let f = fixture();
    let author = Uuid::new_v4();
    f.service.create(f.movie_id, author, &create(7)).await.unwrap();

    // Act
    let by_movie = f
        .service
        .list_by_movie(f.movie_id, &ReviewFilters::default(), PageRequest::new(i64::MAX, 10))
        .await
        .unwrap();
    let by_user = f
        .service
        .list_by_user(
            author,
            &ReviewFilters::default(),
            PageRequest::new(i64::MAX, i64::MAX),
        )
        .await
        .unwrap();

    // Assert
    assert!(by_movie.is_empty());
    assert!(by_user.is_empty());
}
