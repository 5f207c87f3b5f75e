//! Siteship API Server

use siteship_api::config::Settings;
use siteship_api::{AppState, routes};
use siteship_db::{create_pool, run_migrations};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();

    // Create database pool
    info!("Connecting to database...");
    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;
    info!("Database connected");

    // Create app state
    let state = AppState::new(pool, &settings);

    // Start publish workers
    for i in 0..settings.worker_count {
        let worker = state.publish_worker(format!("publish-worker-{}", i));
        tokio::spawn(async move { worker.run().await });
    }
    info!(workers = settings.worker_count, "Publish workers started");

    // Build router
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    info!("Starting server on {}", settings.bind_addr);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
