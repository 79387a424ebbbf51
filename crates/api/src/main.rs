use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mockdeck_api::config::ServerConfig;
use mockdeck_api::router;
use mockdeck_api::state::AppState;
use mockdeck_events::{DeliveryWorker, EventArchiver, ReviewEventBus};
use mockdeck_workflow::ApprovalEngine;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mockdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(bind_addr = %config.bind_addr, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mockdeck_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    mockdeck_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    mockdeck_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Review event bus and its workers ---
    let event_bus = Arc::new(ReviewEventBus::default());

    // Archiver: appends every review event to the review_events timeline.
    let _archiver_handle = tokio::spawn(
        EventArchiver::new(pool.clone()).run(event_bus.subscribe()),
    );

    // Delivery worker: pushes events out via email/Slack, best-effort.
    let delivery_cancel = tokio_util::sync::CancellationToken::new();
    let _delivery_handle = tokio::spawn(
        DeliveryWorker::from_env(pool.clone()).run(event_bus.subscribe(), delivery_cancel.clone()),
    );

    tracing::info!("Review event workers started (archiver, delivery)");

    // --- Approval engine ---
    let engine = ApprovalEngine::new(pool.clone(), Arc::clone(&event_bus));

    // --- App state and router ---
    let bind_addr = config.bind_addr;
    let state = AppState {
        pool,
        config: Arc::new(config),
        event_bus,
        engine,
    };
    let app = router::app(state);

    // --- Serve ---
    tracing::info!(%bind_addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .await
        .expect("Server error");

    delivery_cancel.cancel();
}
