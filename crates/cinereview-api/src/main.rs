//! CineReview API server entry point.

use std::sync::Arc;
use std::time::Duration;

use cinereview_api::config::AppConfig;
use cinereview_api::error::AppError;
use cinereview_api::state::AppState;
use cinereview_api::{build_app, telemetry};
use cinereview_core::clock::{SharedClock, SystemClock};
use cinereview_reviews::application::event_channel::review_event_channel;
use cinereview_reviews::application::event_consumer::ReviewEventConsumer;
use cinereview_store::pg_audit_repository::PgAuditLogRepository;
use cinereview_store::pg_movie_repository::PgMovieRepository;
use tokio::sync::watch;
use tracing::{error, info};

/// How often elapsed rate-limit windows are dropped.
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    info!(?config, "starting CineReview API server");

    let pool = cinereview_store::connect(&config.database_url, config.database_max_connections)
        .await?;
    if config.run_migrations {
        cinereview_store::MIGRATOR.run(&pool).await?;
        info!("migrations applied");
    }

    let clock: SharedClock = Arc::new(SystemClock);

    // Exactly one consumer drains the channel for the life of the process.
    let (events, receiver) = review_event_channel(config.review_event_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = ReviewEventConsumer::new(
        receiver,
        Arc::new(PgMovieRepository::new(pool.clone())),
        Some(Arc::new(PgAuditLogRepository::new(pool.clone()))),
        shutdown_rx,
    )
    .spawn();

    let state = AppState::postgres(&pool, &config, events, clock);

    let limiter = state.auth_rate_limiter.clone();
    let pruner = tokio::spawn(async move {
        let mut tick = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        loop {
            tick.tick().await;
            limiter.prune();
        }
    });

    let app = build_app(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pruner.abort();
    info!("stopping review event consumer");
    let _ = shutdown_tx.send(true);
    if let Err(e) = consumer.await {
        error!(error = %e, "review event consumer task failed");
    }

    pool.close().await;
    telemetry.shutdown();

    served.map_err(AppError::from)
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
